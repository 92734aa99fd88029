//! # Monkey - a small interpreted language
//!
//! A tree-walking interpreter for Monkey: a C-like expression language with
//! first-class functions and closures, arrays, hashes, Python-style slicing and
//! a small numeric tower of integers, floats and booleans.
//!
//! The pipeline is the classic one:
//!
//! - [`Lexer`] turns source text into [`Token`]s on demand
//! - [`Parser`] builds a [`Program`] with Pratt (operator-precedence) parsing
//! - [`Evaluator`] walks the program against an [`Environment`] and yields an
//!   [`Object`]
//!
//! ## Quick Start
//!
//! ```rust
//! use monkey::{Environment, Evaluator, Lexer, Object, Parser};
//!
//! let code = r#"
//!     let add = fn(x, y) { x + y };
//!     add(5 + 5, add(5, 5))
//! "#;
//!
//! // Parse
//! let mut parser = Parser::new(Lexer::new(code));
//! let program = parser.parse();
//! assert!(parser.error().is_none());
//!
//! // Execute
//! let evaluator = Evaluator::new();
//! let env = Environment::new();
//! assert_eq!(evaluator.eval(&program, &env), Object::Integer(20));
//! ```
//!
//! ### Closures
//!
//! Functions capture the environment they were defined in, not the caller's:
//!
//! ```rust
//! use monkey::{parse, Environment, Evaluator, Object};
//!
//! let (program, err) = parse("let one = fn() { let x = 1; fn() { x } }; one()()");
//! assert!(err.is_none());
//!
//! let result = Evaluator::new().eval(&program, &Environment::new());
//! assert_eq!(result, Object::Integer(1));
//! ```
//!
//! ### Slicing
//!
//! ```rust
//! # use monkey::{parse, Environment, Evaluator};
//! # fn run(code: &str) -> String {
//! #     let (program, _) = parse(code);
//! #     Evaluator::new().eval(&program, &Environment::new()).display()
//! # }
//! assert_eq!(run("[1, 2, 3, 4][::-1]"), "[4,3,2,1]");
//! assert_eq!(run("[1, 2, 3, 4][1:3]"), "[2,3]");
//! assert_eq!(run("\"hello\"[-3:]"), "llo");
//! ```
//!
//! ## Error Handling
//!
//! Runtime failures are ordinary values: evaluation stops at the first one and
//! hands back an [`Object::Error`]. Parse failures are collected into a
//! [`ParseError`] instead, and a program that failed to parse must not be run.
//!
//! ```rust
//! # use monkey::{parse, Environment, Evaluator, Object};
//! let (program, _) = parse("len(1)");
//! let result = Evaluator::new().eval(&program, &Environment::new());
//! assert_eq!(result.display(), "ERROR: argument to len not supported: got INT");
//!
//! let (_, err) = parse("let = 5");
//! assert!(err.is_some());
//! ```
//!
//! ## Logging
//!
//! The library logs through `tracing` at `debug`/`trace` level. The `monkey`
//! binary installs a subscriber controlled by the `MONKEY_LOG` variable.

/// Version of the Monkey interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builtins;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;

// Re-export main types
pub use builtins::{Builtin, BuiltinRegistry};
pub use error::{Diagnostic, Error, ParseError, Result};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, BinaryOp, Expression, Parser, Program, Statement, UnaryOp};
pub use runtime::{Environment, Evaluator, Node, Object, ObjectType};
