//! Error types for the Monkey interpreter

use std::fmt;

use thiserror::Error;

use crate::parser::{BinaryOp, UnaryOp};
use crate::runtime::ObjectType;

/// Runtime failures raised while evaluating a program
///
/// The evaluator threads these through `Result` internally; at the public
/// boundary they become [`crate::Object::Error`] values whose message is this
/// type's `Display` output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Reference to an identifier bound neither in scope nor as a builtin
    ///
    /// **Example:** `return NULL` (nothing named `NULL` exists)
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    /// Infix operator applied to an unsupported pair of operand types
    ///
    /// **Example:** `'Hello' - 'World'`, `1 + if (false) { 1 }`
    #[error("unknown operator: {left}{op}{right}")]
    UnknownInfixOperator {
        /// Left operand type
        left: ObjectType,
        /// Operator
        op: BinaryOp,
        /// Right operand type
        right: ObjectType,
    },

    /// Prefix operator applied to an unsupported operand type
    ///
    /// **Example:** `-if (false) { 10 }`
    #[error("unknown operator: {op}{right}")]
    UnknownPrefixOperator {
        /// Operator
        op: UnaryOp,
        /// Operand type
        right: ObjectType,
    },

    /// Integer division with a zero divisor
    #[error("division by zero")]
    DivisionByZero,

    /// Attempt to call a value that is neither a function nor a builtin
    #[error("not a function: {0}")]
    NotCallable(ObjectType),

    /// Call with the wrong number of arguments
    #[error("wrong number of arguments: got={got}, want={want}")]
    WrongArgumentCount {
        /// Number of arguments supplied
        got: usize,
        /// Number of arguments expected
        want: usize,
    },

    /// Argument of the wrong type passed to a builtin
    #[error("argument to {builtin} not supported: got {got}")]
    UnsupportedArgument {
        /// Builtin name
        builtin: String,
        /// Type that was supplied
        got: ObjectType,
    },

    /// First argument of a builtin has the wrong type
    #[error("first argument to `{builtin}` must be {expected}: got={got}")]
    InvalidFirstArgument {
        /// Builtin name
        builtin: String,
        /// Type the builtin requires
        expected: ObjectType,
        /// Type that was supplied
        got: ObjectType,
    },

    /// Scalar index or slice start outside the array
    ///
    /// **Example:** `[1, 2, 3, 4][4]`, `[1, 2][-3]`
    #[error("index {index} out of array with length {length}")]
    IndexOutOfArray {
        /// Requested index
        index: i64,
        /// Array length
        length: usize,
    },

    /// `target[]` with nothing between the brackets
    #[error("array-like indexing with empty expression")]
    EmptyIndex,

    /// Index, end or stride that is not an integer
    #[error("array-like indexing expecting INT, but got {0}")]
    IndexNotInteger(ObjectType),

    /// Slice with a stride of zero
    #[error("array-like indexing expecting non-zero stride")]
    ZeroStride,

    /// Indexing a value that does not support it
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    /// Hash key (in a literal or a lookup) of a type that cannot be hashed
    #[error("key type not hashable: {0}")]
    KeyNotHashable(ObjectType),
}

/// Result type for evaluation
pub type Result<T> = std::result::Result<T, Error>;

/// A single syntax problem reported by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Line number of the offending token (1-indexed)
    pub line: usize,
    /// Column number of the offending token (1-indexed)
    pub column: usize,
    /// Error description
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

/// Accumulated parse failures
///
/// Diagnostics are kept most recent first, so the rendered message reads like
/// a chain of wrapped errors: `newest: ...: oldest: parse error`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{}", render_chain(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Wraps the chain with a newer diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.insert(0, diagnostic);
    }

    /// All diagnostics, most recent first
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Messages of all diagnostics, most recent first
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.message.clone()).collect()
    }

    /// Number of recorded diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

fn render_chain(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push_str(&diagnostic.to_string());
        out.push_str(": ");
    }
    out.push_str("parse error");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_messages() {
        let err = Error::UnknownInfixOperator {
            left: ObjectType::String,
            op: BinaryOp::Sub,
            right: ObjectType::String,
        };
        assert_eq!(err.to_string(), "unknown operator: STRING-STRING");

        let err = Error::UnknownPrefixOperator {
            op: UnaryOp::Neg,
            right: ObjectType::Null,
        };
        assert_eq!(err.to_string(), "unknown operator: -NULL");

        let err = Error::InvalidFirstArgument {
            builtin: "append".to_string(),
            expected: ObjectType::Array,
            got: ObjectType::Integer,
        };
        assert_eq!(
            err.to_string(),
            "first argument to `append` must be ARRAY: got=INT"
        );
    }

    #[test]
    fn test_parse_error_chain_is_most_recent_first() {
        let mut err = ParseError::default();
        assert!(err.is_empty());
        err.push(Diagnostic {
            line: 1,
            column: 5,
            message: "first".to_string(),
        });
        err.push(Diagnostic {
            line: 2,
            column: 1,
            message: "second".to_string(),
        });

        assert_eq!(err.len(), 2);
        assert_eq!(err.messages(), vec!["second", "first"]);
        assert_eq!(
            err.to_string(),
            "second (line 2, column 1): first (line 1, column 5): parse error"
        );
    }
}
