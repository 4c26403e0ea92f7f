//! Error types and error handling for the parser.
//!
//! This module defines the error types shared by the tokenizer and the
//! parser. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for each failure the front-end can report
//! - Error naming and suggestion tips used when rendering diagnostics
//!
//! Parsing is fail-fast: the first error raised anywhere is the one returned.

pub mod errors;
