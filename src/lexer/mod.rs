//! Lexical analysis for Monkey
//!
//! Converts source text into a stream of tokens, one token per call.

mod scanner;
mod token;

pub use scanner::Lexer;
pub use token::{Token, TokenKind};
