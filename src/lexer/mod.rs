//! Lexical analysis module.
//!
//! This module contains the tokenizer that produces the flat token stream
//! the parser consumes. It handles:
//!
//! - Tokenization of source code using anchored regex patterns
//! - Recognition of keywords, identifiers, numbers, operators and delimiters
//! - Token position tracking for error reporting
//! - Comments and whitespace handling

pub mod lexer;
pub mod tokens;
