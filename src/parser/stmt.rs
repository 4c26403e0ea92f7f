use log::{debug, trace};

use crate::{
    ast::ast::{Link, Node},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Operator, TokenKind},
    Position,
};

use super::{
    expr::{parse_expr, parse_identifier},
    parser::Parser,
};

/// Parses one command and settles the scope-close debt owed before it.
///
/// A keyword starts a conditional; anything else is an assignment ending in
/// `;`. Scopes that closed since the previous command are placed as a run of
/// `ScopeClose` links ahead of this command, otherwise it is wrapped in a
/// plain `Statement` link.
///
/// The debt is taken before a conditional is parsed, so the closes sit in
/// the enclosing chain ahead of the `if`/`while`. This deliberately moves
/// them out of the conditional's body, where the first body command used to
/// pay them.
pub fn parse_command(parser: &mut Parser) -> Result<Link, Error> {
    trace!("parse_command: next token = {:?}", parser.current_token());

    let owed = parser.take_debt();

    let command = if parser.current_token_kind() == TokenKind::Keyword {
        parse_conditional(parser)?
    } else {
        let assignment = parse_assignment(parser)?;
        parser.expect(TokenKind::Semicolon)?;
        assignment
    };

    if owed > 0 {
        debug!("parse_command: paying {} scope closes", owed);
    }

    Ok(Link::settle(owed, command))
}

/// Parses `('if' | 'while') '(' Expr ')' Body`.
///
/// The body is either a braced run of commands, chained as a plain sequence
/// (no `ScopeOpen` and no debt of its own), or exactly one command.
pub fn parse_conditional(parser: &mut Parser) -> Result<Node, Error> {
    parser.nested(|parser| {
        trace!("parse_conditional: next token = {:?}", parser.current_token());

        let head_position = parser.get_position();
        let keyword = match &parse_identifier(parser)? {
            Node::Keyword(keyword) => keyword.clone(),
            Node::Call { keyword, .. } | Node::Variable(keyword) => {
                return Err(invalid_head(keyword.clone(), head_position));
            }
            other => return Err(invalid_head(format!("{:?}", other.tag()), head_position)),
        };

        parser.expect_detailed(TokenKind::OpenParen, format!("expected `(` after `{}`", keyword))?;
        let cond = parse_expr(parser)?;
        parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the condition")?;

        let body = if parser.current_token_kind() == TokenKind::OpenCurly {
            parser.advance();

            let mut body = parse_command(parser)?;
            let mut tail = body.tail_mut();
            while parser.current_token_kind() != TokenKind::CloseCurly {
                tail = Link::attach(tail, parse_command(parser)?);
            }
            parser.advance();

            body
        } else {
            parse_command(parser)?
        };

        Ok(Node::conditional(keyword, cond, body))
    })
}

fn invalid_head(keyword: String, position: Position) -> Error {
    Error::new(
        ErrorImpl::InvalidKeywordUsage {
            keyword,
            message: String::from("cannot start a command, only `if` and `while` can"),
        },
        position,
    )
}

/// Parses `Identifier '=' Expr`, without the terminating `;`.
pub fn parse_assignment(parser: &mut Parser) -> Result<Node, Error> {
    trace!("parse_assignment: next token = {:?}", parser.current_token());

    if parser.current_token_kind() != TokenKind::Identifier {
        return Err(parser.unexpected("expected a variable to assign to"));
    }
    let target = parser.advance().value.clone();

    if !parser.current_token().is_operator(Operator::Assign) {
        return Err(parser.unexpected(format!("expected `=` after `{}`", target)));
    }
    parser.advance();

    let value = parse_expr(parser)?;

    Ok(Node::assignment(target, value))
}
