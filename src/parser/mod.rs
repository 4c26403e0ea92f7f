//! Parser module for building the Abstract Syntax Tree.
//!
//! This module contains the recursive-descent parser that turns a flat
//! token stream into statement chains. It handles:
//!
//! - Expressions with precedence climbing (`+ -` < `* /` < `^`, all left
//!   associative), parentheses, literals, variables and keyword calls
//! - Assignments and `if`/`while` conditionals
//! - Lexical scopes, encoded with `ScopeOpen`/`ScopeClose` marker links
//!
//! Errors are fail-fast: the first one aborts the parse.

pub mod expr;
pub mod options;
pub mod parser;
pub mod scope;
pub mod stmt;

#[cfg(test)]
mod tests;
