//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the program entry point.
//! The grammar rules live in `expr`, `stmt` and `scope` as free functions
//! over `&mut Parser`.
//!
//! Besides the token cursor the parser carries the scope-close debt: the
//! number of `ScopeClose` markers owed by scopes that have ended but have not
//! been placed into the tree yet.

use log::{debug, trace};

use crate::{
    ast::ast::Link,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{options::ParseOptions, scope::parse_element};

/// The main parser structure that maintains parsing state.
///
/// This struct borrows the token stream and tracks the current position in
/// it, the pending scope-close debt and the current nesting depth.
pub struct Parser<'a> {
    /// The list of tokens to parse
    tokens: &'a [Token],
    /// Current position in the token stream, only ever moves forward
    pos: usize,
    /// Scope-close markers owed but not yet placed in the tree
    debt: usize,
    /// Current nesting of scopes, conditionals and expressions
    depth: usize,
    options: ParseOptions,
    /// Stands in for every position past the end of `tokens`
    eof: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new Parser instance.
    ///
    /// `tokens` does not need to end with an `EOF` token; reading past the
    /// end of the slice yields one.
    pub fn new(tokens: &'a [Token], options: ParseOptions) -> Self {
        let eof_span = match tokens.last() {
            Some(last) => Span {
                start: last.span.end.clone(),
                end: last.span.end.clone(),
            },
            None => Span::null(),
        };

        Parser {
            tokens,
            pos: 0,
            debt: 0,
            depth: 0,
            options,
            eof: Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: eof_span,
            },
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> &Token {
        self.pos += 1;
        self.tokens.get(self.pos - 1).unwrap_or(&self.eof)
    }

    /// Expects a token of the specified kind, consuming it on success.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: self.current_token().value.clone(),
                },
                self.get_position(),
            ));
        }

        Ok(self.advance().clone())
    }

    /// Like [`Parser::expect`], reporting `message` when the token is missing.
    pub fn expect_detailed(
        &mut self,
        expected_kind: TokenKind,
        message: impl Into<String>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return Err(self.unexpected(message));
        }

        Ok(self.advance().clone())
    }

    /// An `UnexpectedTokenDetailed` error at the current token.
    pub fn unexpected(&self, message: impl Into<String>) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().value.clone(),
                message: message.into(),
            },
            self.get_position(),
        )
    }

    /// Runs `rule` one nesting level deeper, failing once the configured
    /// depth limit would be exceeded.
    pub fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.depth >= self.options.max_depth {
            return Err(Error::new(
                ErrorImpl::NestingTooDeep {
                    limit: self.options.max_depth,
                },
                self.get_position(),
            ));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Takes all pending scope-close debt, leaving none behind.
    pub fn take_debt(&mut self) -> usize {
        std::mem::take(&mut self.debt)
    }

    /// Records one more scope that closed without a marker placed for it.
    pub fn owe_scope_close(&mut self) {
        self.debt += 1;
    }

    /// Scope-close markers currently owed.
    pub fn debt(&self) -> usize {
        self.debt
    }

    /// Index of the current token in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Returns the source position of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }
}

/// Parses a token stream into a statement chain.
///
/// This is the main entry point for parsing. A program is a single element,
/// either a scope or one command, followed by the end of input.
///
/// # Returns
///
/// A tuple containing:
/// - The Parser instance (with state after parsing)
/// - Result containing either the root Link or the first Error hit
pub fn parse(tokens: &[Token]) -> (Parser<'_>, Result<Link, Error>) {
    parse_with_options(tokens, ParseOptions::default())
}

/// [`parse`] with explicit [`ParseOptions`].
pub fn parse_with_options(tokens: &[Token], options: ParseOptions) -> (Parser<'_>, Result<Link, Error>) {
    let mut parser = Parser::new(tokens, options);
    let result = parse_program(&mut parser);

    (parser, result)
}

fn parse_program(parser: &mut Parser) -> Result<Link, Error> {
    trace!("parse_program: next token = {:?}", parser.current_token_kind());

    let root = parse_element(parser)?;

    if parser.current_token_kind() != TokenKind::EOF {
        return Err(parser.unexpected("expected end of input"));
    }

    // End of input closes the outermost scope itself; every other scope
    // still owed is placed above the root.
    let trailing = parser.take_debt().saturating_sub(1);
    if trailing > 0 {
        debug!("parse_program: placing {} trailing scope closes", trailing);
    }

    Ok(root.wrap_in_closes(trailing))
}
