//! Runtime execution for Monkey programs
//!
//! The object model, the lexical scope chain and the tree-walking evaluator.

mod environment;
mod evaluator;
mod value;

pub use environment::Environment;
pub use evaluator::{Evaluator, Node};
pub use value::{Function, HashKey, HashPair, Object, ObjectType, FALSE, NULL, TRUE};
