//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs:
//! - Expressions and operator precedence
//! - Keyword calls
//! - Assignments and conditionals
//! - Scopes and scope-close debt
//! - Error cases and the nesting limit

use crate::{
    ast::ast::{Link, Marker, Node},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::tokenize,
        tokens::{Operator, Token, TokenKind},
    },
};

use super::{
    expr::parse_expr,
    options::ParseOptions,
    parser::{parse, parse_with_options, Parser},
    scope::parse_scope,
    stmt::{parse_command, parse_conditional},
};

fn tokens(source: &str) -> Vec<Token> {
    tokenize(source, Some("test.sc".to_string())).unwrap()
}

fn parse_source(source: &str) -> Result<Link, Error> {
    let tokens = tokens(source);
    let (_, result) = parse(&tokens);
    result
}

fn parse_source_expr(source: &str) -> Node {
    let tokens = tokens(source);
    let mut parser = Parser::new(&tokens, ParseOptions::default());
    let expr = parse_expr(&mut parser).unwrap();
    assert_eq!(parser.current_token_kind(), TokenKind::EOF);
    expr
}

fn error_impl(source: &str) -> ErrorImpl {
    parse_source(source).unwrap_err().get_impl().clone()
}

fn num(value: f64) -> Node {
    Node::number(value)
}

fn var(name: &str) -> Node {
    Node::variable(name)
}

fn op(op: Operator, lhs: Node, rhs: Node) -> Node {
    Node::operator(op, lhs, rhs)
}

fn assign(name: &str, value: f64) -> Node {
    Node::assignment(name, num(value))
}

#[test]
fn test_parse_precedence() {
    assert_eq!(
        parse_source_expr("1+2*3"),
        op(Operator::Add, num(1.0), op(Operator::Mul, num(2.0), num(3.0)))
    );
    assert_eq!(
        parse_source_expr("(1+2)*3"),
        op(Operator::Mul, op(Operator::Add, num(1.0), num(2.0)), num(3.0))
    );
    assert_eq!(
        parse_source_expr("1-2*3^2"),
        op(
            Operator::Sub,
            num(1.0),
            op(Operator::Mul, num(2.0), op(Operator::Pow, num(3.0), num(2.0)))
        )
    );
}

#[test]
fn test_parse_left_associativity() {
    assert_eq!(
        parse_source_expr("8-3-2"),
        op(Operator::Sub, op(Operator::Sub, num(8.0), num(3.0)), num(2.0))
    );
    assert_eq!(
        parse_source_expr("8/4*2"),
        op(Operator::Mul, op(Operator::Div, num(8.0), num(4.0)), num(2.0))
    );
    // `^` folds left like every other level.
    assert_eq!(
        parse_source_expr("2^3^2"),
        op(Operator::Pow, op(Operator::Pow, num(2.0), num(3.0)), num(2.0))
    );
}

#[test]
fn test_parse_variables_and_calls() {
    assert_eq!(
        parse_source_expr("sqrt(x + 1) * y"),
        op(
            Operator::Mul,
            Node::call("sqrt", op(Operator::Add, var("x"), num(1.0))),
            var("y")
        )
    );
    assert_eq!(
        parse_source_expr("sin(cos(t))"),
        Node::call("sin", Node::call("cos", var("t")))
    );
    assert_eq!(parse_source_expr("2.5"), num(2.5));
}

#[test]
fn test_parse_bare_conditional_keyword_in_expression() {
    assert_eq!(parse_source_expr("while"), Node::keyword("while"));
}

#[test]
fn test_cursor_stops_after_expression() {
    let tokens = tokens("1 + 2 * 3 ; x");
    let mut parser = Parser::new(&tokens, ParseOptions::default());

    parse_expr(&mut parser).unwrap();

    assert_eq!(parser.position(), 5);
    assert_eq!(parser.current_token_kind(), TokenKind::Semicolon);
}

#[test]
fn test_cursor_after_failure() {
    let tokens = tokens("(1+2");
    let mut parser = Parser::new(&tokens, ParseOptions::default());

    let error = parse_expr(&mut parser).unwrap_err();

    assert!(matches!(error.get_impl(), ErrorImpl::UnexpectedTokenDetailed { .. }));
    // Everything before the missing `)` was consumed, nothing more.
    assert_eq!(parser.position(), 4);
}

#[test]
fn test_parse_assignment_statement() {
    assert_eq!(
        parse_source("a = 1 + b;").unwrap(),
        Link::statement(Node::assignment("a", op(Operator::Add, num(1.0), var("b"))), None)
    );
}

#[test]
fn test_parse_statement_chaining() {
    let root = parse_source("{ a = 1; b = 2; }").unwrap();

    assert_eq!(
        root,
        Link::scope_open(Some(assign("a", 1.0)), Some(Link::statement(assign("b", 2.0), None)))
    );
    let commands: Vec<_> = root.commands().cloned().collect();
    assert_eq!(commands, vec![assign("a", 1.0), assign("b", 2.0)]);
}

#[test]
fn test_parse_debt_paid_by_sibling_command() {
    let root = parse_source("{ { a = 1; } b = 2; }").unwrap();

    assert_eq!(
        root,
        Link::scope_open(
            None,
            Some(Link::scope_open(
                Some(assign("a", 1.0)),
                Some(Link::scope_close(Some(assign("b", 2.0)), None))
            ))
        )
    );
    let closes = root.iter().filter(|link| link.marker == Marker::ScopeClose).count();
    assert_eq!(closes, 1);
}

#[test]
fn test_parse_multiple_debt_paid_by_sibling_command() {
    let root = parse_source("{ { { a = 1; } } b = 2; }").unwrap();

    assert_eq!(
        root,
        Link::scope_open(
            None,
            Some(Link::scope_open(
                None,
                Some(Link::scope_open(
                    Some(assign("a", 1.0)),
                    Some(Link::scope_close(
                        None,
                        Some(Link::scope_close(Some(assign("b", 2.0)), None))
                    ))
                ))
            ))
        )
    );
}

#[test]
fn test_parse_nested_immediate_closes() {
    let tokens = tokens("{ { { a = 1; } } }");
    let (parser, result) = parse(&tokens);
    let root = result.unwrap();

    assert_eq!(
        root,
        Link::scope_open(
            None,
            Some(Link::scope_open(None, Some(Link::scope_open(Some(assign("a", 1.0)), None))))
        )
        .wrap_in_closes(2)
    );
    assert_eq!(root.marker, Marker::ScopeClose);
    assert_eq!(root.iter().nth(1).unwrap().marker, Marker::ScopeClose);
    assert_eq!(root.iter().nth(2).unwrap().marker, Marker::ScopeOpen);
    assert_eq!(parser.debt(), 0);
}

#[test]
fn test_scope_accumulates_debt() {
    let tokens = tokens("{ { { a = 1; } } }");
    let mut parser = Parser::new(&tokens, ParseOptions::default());

    parse_scope(&mut parser).unwrap();

    assert_eq!(parser.debt(), 3);
}

#[test]
fn test_scope_pays_inherited_debt() {
    let tokens = tokens("{ a = 1; }");
    let mut parser = Parser::new(&tokens, ParseOptions::default());
    parser.owe_scope_close();
    parser.owe_scope_close();

    let root = parse_scope(&mut parser).unwrap();

    assert_eq!(root, Link::scope_open(Some(assign("a", 1.0)), None).wrap_in_closes(2));
    // Only this scope's own close is left owed.
    assert_eq!(parser.debt(), 1);
}

#[test]
fn test_parse_debt_paid_by_sibling_scope() {
    let root = parse_source("{ { a = 1; } { b = 2; } }").unwrap();

    assert_eq!(
        root,
        Link::scope_open(
            None,
            Some(Link::scope_open(
                Some(assign("a", 1.0)),
                Some(Link::scope_close(None, Some(Link::scope_open(Some(assign("b", 2.0)), None))))
            ))
        )
        .wrap_in_closes(1)
    );
}

#[test]
fn test_command_pays_debt() {
    let tokens = tokens("a = 1;");
    let mut parser = Parser::new(&tokens, ParseOptions::default());
    parser.owe_scope_close();
    parser.owe_scope_close();

    let link = parse_command(&mut parser).unwrap();

    assert_eq!(link, Link::settle(2, assign("a", 1.0)));
    assert_eq!(parser.debt(), 0);
}

#[test]
fn test_parse_conditional_shape() {
    assert_eq!(
        parse_source("if (a) { b = 1; }").unwrap(),
        Link::statement(
            Node::conditional("if", var("a"), Link::statement(assign("b", 1.0), None)),
            None
        )
    );
}

#[test]
fn test_parse_conditional_single_command_body() {
    let tokens = tokens("while (i) i = i - 1;");
    let mut parser = Parser::new(&tokens, ParseOptions::default());

    assert_eq!(
        parse_conditional(&mut parser).unwrap(),
        Node::conditional(
            "while",
            var("i"),
            Link::statement(Node::assignment("i", op(Operator::Sub, var("i"), num(1.0))), None)
        )
    );
    assert_eq!(parser.current_token_kind(), TokenKind::EOF);
}

#[test]
fn test_parse_conditional_body_is_plain_sequence() {
    let root = parse_source("while (i) { i = i - 1; j = 2; if (j) k = 3; }").unwrap();

    let Some(Node::Conditional { keyword, body, .. }) = root.command.as_deref() else {
        panic!("expected a conditional, got {:?}", root);
    };
    assert_eq!(keyword, "while");
    assert!(body.iter().all(|link| link.marker == Marker::Statement));
    assert_eq!(body.iter().count(), 3);
    assert!(matches!(
        body.iter().nth(2).unwrap().command.as_deref(),
        Some(Node::Conditional { keyword, .. }) if keyword == "if"
    ));
}

#[test]
fn test_debt_lands_ahead_of_conditional() {
    let root = parse_source("{ { a = 1; } if (x) b = 2; }").unwrap();

    let inner = root.next.as_deref().unwrap();
    let after = inner.next.as_deref().unwrap();
    assert_eq!(after.marker, Marker::ScopeClose);
    match after.command.as_deref() {
        Some(Node::Conditional { body, .. }) => {
            assert_eq!(**body, Link::statement(assign("b", 2.0), None));
        }
        other => panic!("expected a conditional, got {:?}", other),
    }
}

#[test]
fn test_parse_unterminated_parenthesis() {
    let tokens = tokens("(1+2");
    let mut parser = Parser::new(&tokens, ParseOptions::default());

    assert!(parse_expr(&mut parser).is_err());
    assert!(matches!(
        error_impl("a = (1+2;"),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == ";"
    ));
}

#[test]
fn test_parse_missing_semicolon() {
    assert!(matches!(
        error_impl("a = 1"),
        ErrorImpl::UnexpectedToken { token } if token == "EOF"
    ));
    assert!(matches!(error_impl("a = 1 b = 2;"), ErrorImpl::UnexpectedToken { .. }));
}

#[test]
fn test_parse_missing_assignment_operator() {
    assert!(matches!(
        error_impl("a 1;"),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "1"
    ));
    assert!(matches!(error_impl("1 = a;"), ErrorImpl::UnexpectedTokenDetailed { .. }));
}

#[test]
fn test_parse_empty_primary() {
    assert!(matches!(
        error_impl("a = ;"),
        ErrorImpl::MalformedExpression { token } if token == ";"
    ));
    assert!(matches!(error_impl("a = 1 + );"), ErrorImpl::MalformedExpression { .. }));
    assert!(matches!(error_impl("a = (1 + 2) * ;"), ErrorImpl::MalformedExpression { .. }));
}

#[test]
fn test_parse_keyword_without_parenthesis() {
    assert!(matches!(
        error_impl("a = sqrt x;"),
        ErrorImpl::InvalidKeywordUsage { keyword, .. } if keyword == "sqrt"
    ));
}

#[test]
fn test_parse_keyword_call_as_command() {
    assert!(matches!(
        error_impl("print(x);"),
        ErrorImpl::InvalidKeywordUsage { keyword, .. } if keyword == "print"
    ));
}

#[test]
fn test_parse_conditional_missing_parenthesis() {
    assert!(matches!(error_impl("if a) b = 1;"), ErrorImpl::UnexpectedTokenDetailed { .. }));
    assert!(matches!(error_impl("if (a b = 1;"), ErrorImpl::UnexpectedTokenDetailed { .. }));
}

#[test]
fn test_parse_unterminated_scope() {
    assert!(matches!(
        error_impl("{ a = 1;"),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "EOF"
    ));
    assert!(matches!(
        error_impl("if (a) { b = 1;"),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "EOF"
    ));
}

#[test]
fn test_parse_empty_scope() {
    assert!(matches!(error_impl("{ }"), ErrorImpl::UnexpectedTokenDetailed { .. }));
}

#[test]
fn test_parse_trailing_input() {
    assert!(matches!(
        error_impl("a = 1; b = 2;"),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "b"
    ));
    assert!(matches!(error_impl("{ a = 1; } }"), ErrorImpl::UnexpectedTokenDetailed { .. }));
}

#[test]
fn test_parse_error_position() {
    let error = parse_source("a = 1;\nb = (2;").unwrap_err();

    // `b` starts at byte 7 and is rejected as trailing input.
    assert_eq!(error.get_position().0, 7);
    assert_eq!(error.get_position().1.as_str(), "test.sc");
}

#[test]
fn test_nesting_limit() {
    let tokens = tokens("a = (((1)));");
    let options = ParseOptions::default().with_max_depth(3);

    let (_, result) = parse_with_options(&tokens, options);
    assert!(matches!(
        result.unwrap_err().get_impl(),
        ErrorImpl::NestingTooDeep { limit: 3 }
    ));

    let (parser, result) = parse_with_options(&tokens, options.with_max_depth(4));
    assert!(result.is_ok());
    assert_eq!(parser.options().max_depth, 4);
}

#[test]
fn test_nesting_limit_on_scopes() {
    let tokens = tokens("{{{{ a = 1; }}}}");

    let (_, result) = parse_with_options(&tokens, ParseOptions::default().with_max_depth(4));
    assert!(matches!(
        result.unwrap_err().get_impl(),
        ErrorImpl::NestingTooDeep { limit: 4 }
    ));

    let (_, result) = parse_with_options(&tokens, ParseOptions::default().with_max_depth(5));
    assert!(result.is_ok());
}

#[test]
fn test_default_depth_handles_deep_parentheses() {
    let source = format!("a = {}1{};", "(".repeat(100), ")".repeat(100));

    assert_eq!(parse_source(&source).unwrap(), Link::statement(assign("a", 1.0), None));

    let source = format!("a = {}1{};", "(".repeat(1000), ")".repeat(1000));
    assert!(matches!(error_impl(&source), ErrorImpl::NestingTooDeep { .. }));
}

#[test]
fn test_parse_detached_tokens_without_eof() {
    let tokens = vec![
        Token::detached(TokenKind::Identifier, "a"),
        Token::detached(TokenKind::Operator(Operator::Assign), "="),
        Token::detached(TokenKind::Number, "4"),
        Token::detached(TokenKind::Operator(Operator::Pow), "^"),
        Token::detached(TokenKind::Number, "2"),
        Token::detached(TokenKind::Semicolon, ";"),
    ];
    let (parser, result) = parse(&tokens);

    assert_eq!(
        result.unwrap(),
        Link::statement(Node::assignment("a", op(Operator::Pow, num(4.0), num(2.0))), None)
    );
    assert_eq!(parser.position(), 6);
}

#[test]
fn test_parse_invalid_number_token() {
    let tokens = vec![
        Token::detached(TokenKind::Identifier, "a"),
        Token::detached(TokenKind::Operator(Operator::Assign), "="),
        Token::detached(TokenKind::Number, "1.2.3"),
        Token::detached(TokenKind::Semicolon, ";"),
    ];
    let (_, result) = parse(&tokens);

    assert!(matches!(
        result.unwrap_err().get_impl(),
        ErrorImpl::NumberParseError { token } if token == "1.2.3"
    ));
}

#[test]
fn test_parse_empty_input() {
    assert!(matches!(
        error_impl(""),
        ErrorImpl::UnexpectedTokenDetailed { token, .. } if token == "EOF"
    ));
}

#[test]
fn test_parse_long_operator_chain() {
    let source = format!("a = 1{};", "+1".repeat(200_000));
    let root = parse_source(&source).unwrap();

    let Some(Node::Assignment { value, .. }) = root.command.as_deref() else {
        panic!("expected an assignment, got {:?}", root.marker);
    };

    let mut operators = 0;
    let mut node: &Node = &**value;
    while let Node::Operator { op, lhs, rhs } = node {
        assert_eq!(*op, Operator::Add);
        assert_eq!(**rhs, num(1.0));
        operators += 1;
        node = &**lhs;
    }
    assert_eq!(operators, 200_000);
    assert_eq!(*node, num(1.0));
}

#[test]
fn test_parse_large_scope() {
    let statements = 50_000;
    let source = format!("{{ {} {{ b = 2; }} c = 3; }}", "a = 1; ".repeat(statements));
    let root = parse_source(&source).unwrap();

    let markers: Vec<_> = root.iter().map(|link| link.marker).collect();
    assert_eq!(markers.len(), statements + 2);
    assert_eq!(markers[0], Marker::ScopeOpen);
    assert!(markers[1..statements].iter().all(|marker| *marker == Marker::Statement));
    assert_eq!(markers[statements], Marker::ScopeOpen);
    assert_eq!(markers[statements + 1], Marker::ScopeClose);
    assert_eq!(root.iter().last().unwrap().command.as_deref(), Some(&assign("c", 3.0)));
}

#[test]
fn test_parse_large_conditional_body() {
    let statements = 50_000;
    let source = format!("while (x) {{ {} }}", "a = 1; ".repeat(statements));
    let root = parse_source(&source).unwrap();

    let Some(Node::Conditional { body, .. }) = root.command.as_deref() else {
        panic!("expected a conditional, got {:?}", root.marker);
    };
    assert_eq!(body.iter().count(), statements);
    assert!(body.iter().all(|link| link.marker == Marker::Statement));
}
