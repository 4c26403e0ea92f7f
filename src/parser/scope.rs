//! Scope encoding.
//!
//! A scope `{ ... }` becomes a statement chain whose root is tagged
//! `ScopeOpen`. Where a scope ends is not stored at the scope itself: closing
//! a scope adds one unit of debt to the parser, and that debt is paid by
//! whatever follows at the enclosing level.
//!
//! - the next command pays it as a run of `ScopeClose` links ahead of itself
//! - the next scope pays it as `ScopeClose` links prefixed above its own root
//!
//! Each scope starts with a clean counter and holds on to the debt it
//! inherited until its own closing brace has been handled.

use log::{debug, trace};

use crate::{
    ast::ast::{Link, Marker},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{parser::Parser, stmt::parse_command};

/// Parses a nested scope if the next token opens a brace, otherwise a command.
pub fn parse_element(parser: &mut Parser) -> Result<Link, Error> {
    if parser.current_token_kind() == TokenKind::OpenCurly {
        parse_scope(parser)
    } else {
        parse_command(parser)
    }
}

/// Parses `'{' Element { Element } '}'`.
pub fn parse_scope(parser: &mut Parser) -> Result<Link, Error> {
    parser.nested(|parser| {
        trace!("parse_scope: next token = {:?}", parser.current_token());

        parser.expect_detailed(TokenKind::OpenCurly, "expected `{` to open a scope")?;

        let inherited = parser.take_debt();
        if inherited > 0 {
            debug!("parse_scope: holding {} inherited scope closes", inherited);
        }

        let mut root = parse_element(parser)?;
        let mut tail = root.tail_mut();
        while parser.current_token_kind() != TokenKind::CloseCurly {
            let element = parse_element(parser)?;
            tail = Link::attach(tail, element);
        }
        parser.advance();

        parser.owe_scope_close();
        debug!("parse_scope: closed, debt now {}", parser.debt());

        // A root that already opens a scope belongs to the first nested
        // scope, so this scope gets a marker of its own.
        let root = if root.marker == Marker::ScopeOpen {
            Link::scope_open(None, Some(root))
        } else {
            root.marker = Marker::ScopeOpen;
            root
        };

        if inherited > 0 {
            debug!("parse_scope: paying {} inherited scope closes", inherited);
        }

        Ok(root.wrap_in_closes(inherited))
    })
}
