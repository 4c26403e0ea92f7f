use log::trace;

use crate::{
    ast::ast::Node,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{is_conditional_keyword, Operator, TokenKind},
};

use super::parser::Parser;

pub type OperandHandler = fn(&mut Parser) -> Result<Node, Error>;

/// Parses a full expression: `Term { ('+' | '-') Term }`.
///
/// Every call counts as one nesting level, so parenthesized groups and
/// keyword-call arguments are bounded by the parser's depth limit.
pub fn parse_expr(parser: &mut Parser) -> Result<Node, Error> {
    trace!("parse_expr: next token = {:?}", parser.current_token_kind());

    parser.nested(|parser| parse_binary_level(parser, &[Operator::Add, Operator::Sub], parse_term))
}

/// `Power { ('*' | '/') Power }`
pub fn parse_term(parser: &mut Parser) -> Result<Node, Error> {
    parse_binary_level(parser, &[Operator::Mul, Operator::Div], parse_power)
}

/// `Primary { '^' Primary }`, folded to the left like the other levels.
pub fn parse_power(parser: &mut Parser) -> Result<Node, Error> {
    parse_binary_level(parser, &[Operator::Pow], parse_primary)
}

/// Parses `operand { op operand }` for the operators of one precedence
/// level, folding left: `a - b - c` is `(a - b) - c`.
fn parse_binary_level(
    parser: &mut Parser,
    operators: &[Operator],
    operand: OperandHandler,
) -> Result<Node, Error> {
    let mut left = operand(parser)?;

    while let TokenKind::Operator(op) = parser.current_token_kind() {
        if !operators.contains(&op) {
            break;
        }

        trace!("parse_binary_level: operator {}", op);
        parser.advance();

        let right = operand(parser)?;
        left = Node::operator(op, left, right);
    }

    Ok(left)
}

/// `'(' Expr ')' | Number | IdentifierOrKeywordForm`
pub fn parse_primary(parser: &mut Parser) -> Result<Node, Error> {
    trace!("parse_primary: next token = {:?}", parser.current_token());

    match parser.current_token_kind() {
        TokenKind::OpenParen => {
            parser.advance();
            let expr = parse_expr(parser)?;
            parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

            Ok(expr)
        }
        TokenKind::Number => {
            let token = parser.current_token();
            let value = token.value.parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.span.start.clone(),
                )
            })?;
            parser.advance();

            Ok(Node::number(value))
        }
        _ => parse_identifier(parser),
    }
}

/// Parses an identifier or a keyword form.
///
/// - an identifier becomes a `Variable`
/// - `if`/`while` become a bare `Keyword` head for the conditional rule
/// - any other keyword must be applied to a parenthesized expression and
///   becomes a `Call`
pub fn parse_identifier(parser: &mut Parser) -> Result<Node, Error> {
    trace!("parse_identifier: next token = {:?}", parser.current_token());

    let token = parser.current_token().clone();

    match token.kind {
        TokenKind::Identifier => {
            parser.advance();
            Ok(Node::variable(token.value))
        }
        TokenKind::Keyword if is_conditional_keyword(&token.value) => {
            parser.advance();
            Ok(Node::keyword(token.value))
        }
        TokenKind::Keyword => {
            parser.advance();

            if parser.current_token_kind() != TokenKind::OpenParen {
                return Err(Error::new(
                    ErrorImpl::InvalidKeywordUsage {
                        keyword: token.value,
                        message: String::from("must be followed by `(`"),
                    },
                    parser.get_position(),
                ));
            }
            parser.advance();

            let arg = parse_expr(parser)?;
            parser.expect_detailed(
                TokenKind::CloseParen,
                format!("expected `)` to close the `{}` call", token.value),
            )?;

            Ok(Node::call(token.value, arg))
        }
        _ => Err(Error::new(
            ErrorImpl::MalformedExpression { token: token.value },
            token.span.start,
        )),
    }
}
