//! Monkey parser module
//!
//! Turns the token stream into an AST with a Pratt (operator-precedence) parser.

mod ast;
mod pratt_parser;

pub use ast::{
    BinaryOp, BlockStatement, Expression, FunctionLiteral, Identifier, IndexExpression,
    Precedence, Program, Statement, UnaryOp,
};
pub use pratt_parser::{Parser, MAX_NESTING_DEPTH};

use crate::error::ParseError;
use crate::lexer::Lexer;

/// Parses source text in one go
///
/// The program is returned even when parsing failed, but it must not be
/// evaluated if an error is present.
pub fn parse(source: &str) -> (Program, Option<ParseError>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse();
    (program, parser.into_error())
}
