use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::builtins::BuiltinRegistry;
use crate::error::{Error, Result};
use crate::parser::{
    BinaryOp, BlockStatement, Expression, IndexExpression, Program, Statement, UnaryOp,
};
use crate::runtime::value::{Function, HashPair};
use crate::runtime::{Environment, Object, ObjectType, FALSE, NULL, TRUE};

/// Any AST node the evaluator accepts at its public boundary
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// Whole program
    Program(&'a Program),
    /// Single statement
    Statement(&'a Statement),
    /// Braced block
    Block(&'a BlockStatement),
    /// Single expression
    Expression(&'a Expression),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(program: &'a Program) -> Self {
        Node::Program(program)
    }
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(stmt: &'a Statement) -> Self {
        Node::Statement(stmt)
    }
}

impl<'a> From<&'a BlockStatement> for Node<'a> {
    fn from(block: &'a BlockStatement) -> Self {
        Node::Block(block)
    }
}

impl<'a> From<&'a Expression> for Node<'a> {
    fn from(expr: &'a Expression) -> Self {
        Node::Expression(expr)
    }
}

/// Tree-walking evaluator
///
/// Holds nothing but the builtin registry: all program state lives in the
/// [`Environment`] passed to each call, so one evaluator can serve any number
/// of environments and the AST is never modified.
///
/// Internally every step returns [`Result`], and `?` gives the short-circuit
/// on the first error. [`Evaluator::eval`] turns a failure into an
/// [`Object::Error`] value.
#[derive(Debug, Clone)]
pub struct Evaluator {
    builtins: Arc<BuiltinRegistry>,
}

impl Evaluator {
    /// Creates an evaluator with the standard builtins
    pub fn new() -> Self {
        Self::with_registry(BuiltinRegistry::new())
    }

    /// Creates an evaluator with a custom builtin registry
    pub fn with_registry(registry: BuiltinRegistry) -> Self {
        Evaluator {
            builtins: Arc::new(registry),
        }
    }

    /// Evaluates a node, reporting failures as [`Object::Error`]
    ///
    /// A `return` reaching this boundary yields its value; the internal
    /// return wrapper is never handed out.
    pub fn eval<'a>(&self, node: impl Into<Node<'a>>, env: &Environment) -> Object {
        let result = match node.into() {
            Node::Program(program) => self.execute(program, env),
            Node::Statement(stmt) => self.eval_statement(stmt, env).map(unwrap_return),
            Node::Block(block) => self.eval_block(block, env).map(unwrap_return),
            Node::Expression(expr) => self.eval_expression(expr, env).map(unwrap_return),
        };

        match result {
            Ok(obj) => obj,
            Err(e) => Object::Error(e.to_string()),
        }
    }

    /// Runs a program, stopping at the first top-level `return` or error
    ///
    /// An empty program evaluates to `null`.
    pub fn execute(&self, program: &Program, env: &Environment) -> Result<Object> {
        let mut result = NULL;

        for stmt in &program.statements {
            result = self.eval_statement(stmt, env)?;
            if matches!(result, Object::ReturnValue(_)) {
                return Ok(unwrap_return(result));
            }
        }

        Ok(result)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Evaluates a block, leaving a `ReturnValue` wrapped so it keeps
    /// travelling to the enclosing call
    fn eval_block(&self, block: &BlockStatement, env: &Environment) -> Result<Object> {
        let mut result = NULL;

        for stmt in &block.statements {
            result = self.eval_statement(stmt, env)?;
            if matches!(result, Object::ReturnValue(_)) {
                return Ok(result);
            }
        }

        Ok(result)
    }

    fn eval_statement(&self, stmt: &Statement, env: &Environment) -> Result<Object> {
        match stmt {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, env)?;
                if matches!(value, Object::ReturnValue(_)) {
                    return Ok(value);
                }
                env.set(name.value.as_str(), value);
                Ok(NULL)
            }
            Statement::Return { value } => {
                let value = self.eval_expression(value, env)?;
                Ok(Object::ReturnValue(Box::new(unwrap_return(value))))
            }
            Statement::Expression(expr) => self.eval_expression(expr, env),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn eval_expression(&self, expr: &Expression, env: &Environment) -> Result<Object> {
        match expr {
            // Integer literals are unsigned; reinterpreting as i64 wraps like
            // the 64-bit two's complement arithmetic on them.
            Expression::IntegerLiteral(n) => Ok(Object::Integer(*n as i64)),
            Expression::FloatLiteral(f) => Ok(Object::Float(*f)),
            Expression::BooleanLiteral(b) => Ok(Object::from_bool(*b)),
            Expression::StringLiteral(s) => Ok(Object::string(s.as_str())),

            Expression::Identifier(ident) => self.eval_identifier(&ident.value, env),

            Expression::Prefix { op, right } => {
                let right = self.eval_expression(right, env)?;
                eval_prefix(*op, right)
            }

            Expression::Infix { op, left, right } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                eval_infix(*op, left, right)
            }

            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env)?;
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block(alt, env)
                } else {
                    Ok(NULL)
                }
            }

            Expression::FunctionLiteral(literal) => Ok(Object::Function(Rc::new(Function {
                literal: Rc::clone(literal),
                env: env.clone(),
            }))),

            Expression::Call {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, env)?;
                let args = self.eval_expressions(arguments, env)?;
                self.apply_function(function, &args)
            }

            Expression::ArrayLiteral(elements) => {
                Ok(Object::array(self.eval_expressions(elements, env)?))
            }

            Expression::HashLiteral(pairs) => self.eval_hash_literal(pairs, env),

            Expression::Index(index) => self.eval_index(index, env),
        }
    }

    /// Scope chain first, then the builtin registry
    fn eval_identifier(&self, name: &str, env: &Environment) -> Result<Object> {
        if let Some(value) = env.get(name) {
            return Ok(value);
        }

        match self.builtins.get(name) {
            Some(builtin) => {
                tracing::trace!(name, "resolved builtin");
                Ok(Object::Builtin(builtin))
            }
            None => Err(Error::IdentifierNotFound(name.to_string())),
        }
    }

    /// Evaluates left to right, stopping at the first error
    fn eval_expressions(&self, exprs: &[Expression], env: &Environment) -> Result<Vec<Object>> {
        exprs
            .iter()
            .map(|expr| self.eval_expression(expr, env))
            .collect()
    }

    fn apply_function(&self, function: Object, args: &[Object]) -> Result<Object> {
        match function {
            Object::Function(func) => {
                let params = &func.literal.parameters;
                if params.len() != args.len() {
                    return Err(Error::WrongArgumentCount {
                        got: args.len(),
                        want: params.len(),
                    });
                }
                tracing::trace!(arity = params.len(), "calling function");

                // The new scope hangs off the captured environment, not the caller's
                let call_env = Environment::new_enclosed(&func.env);
                for (param, arg) in params.iter().zip(args) {
                    call_env.set(param.value.as_str(), arg.clone());
                }

                let result = self.eval_block(&func.literal.body, &call_env)?;
                Ok(unwrap_return(result))
            }
            Object::Builtin(builtin) => {
                tracing::trace!(name = builtin.name(), args = args.len(), "calling builtin");
                builtin.execute(args)
            }
            other => Err(Error::NotCallable(other.object_type())),
        }
    }

    /// Bare identifier keys stand for their own name as a string
    fn eval_hash_literal(
        &self,
        pairs: &[(Expression, Expression)],
        env: &Environment,
    ) -> Result<Object> {
        let mut entries = HashMap::with_capacity(pairs.len());

        for (key_expr, value_expr) in pairs {
            let key = match key_expr {
                Expression::Identifier(ident) => Object::string(ident.value.as_str()),
                other => self.eval_expression(other, env)?,
            };
            let hash_key = key
                .hash_key()
                .ok_or_else(|| Error::KeyNotHashable(key.object_type()))?;
            let value = self.eval_expression(value_expr, env)?;
            entries.insert(hash_key, HashPair { key, value });
        }

        Ok(Object::hash(entries))
    }

    // ========================================================================
    // Indexing
    // ========================================================================

    fn eval_index(&self, index: &IndexExpression, env: &Environment) -> Result<Object> {
        let target = self.eval_expression(&index.left, env)?;

        match target {
            Object::Array(elements) => {
                match self.select(elements.len(), index, env)? {
                    Selection::Element(i) => Ok(elements[i].clone()),
                    Selection::Range(indices) => Ok(Object::array(
                        indices.into_iter().map(|i| elements[i].clone()).collect(),
                    )),
                }
            }
            Object::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                match self.select(chars.len(), index, env)? {
                    Selection::Element(i) => Ok(Object::String(chars[i].to_string())),
                    Selection::Range(indices) => Ok(Object::String(
                        indices.into_iter().map(|i| chars[i]).collect(),
                    )),
                }
            }
            Object::Hash(pairs) => {
                if index.is_empty() {
                    return Err(Error::EmptyIndex);
                }
                let key_expr = match &index.start {
                    Some(start) if !index.is_slice() => start,
                    _ => return Err(Error::IndexNotSupported(ObjectType::Hash)),
                };
                let key = self.eval_expression(key_expr, env)?;
                let hash_key = key
                    .hash_key()
                    .ok_or_else(|| Error::KeyNotHashable(key.object_type()))?;
                Ok(pairs
                    .get(&hash_key)
                    .map(|pair| pair.value.clone())
                    .unwrap_or(NULL))
            }
            other => Err(Error::IndexNotSupported(other.object_type())),
        }
    }

    /// Resolves an index or slice against a sequence of `len` items
    ///
    /// Start is bounds-checked like a plain index; end is clamped. Omitted
    /// segments default according to the sign of the stride.
    fn select(&self, len: usize, index: &IndexExpression, env: &Environment) -> Result<Selection> {
        if index.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let length = len as i64;

        let start = match &index.start {
            Some(expr) => Some(resolve_start(self.eval_integer(expr, env)?, len)?),
            None => None,
        };

        if !index.is_slice() {
            // Not empty and not a slice, so the start segment is present
            return match start {
                Some(i) => Ok(Selection::Element(i as usize)),
                None => Err(Error::EmptyIndex),
            };
        }

        let end = match &index.end {
            Some(expr) => {
                let end = self.eval_integer(expr, env)?;
                if end < 0 && end.unsigned_abs() > len as u64 {
                    return Ok(Selection::Range(Vec::new()));
                }
                Some(if end < 0 { length + end } else { end.min(length) })
            }
            None => None,
        };

        let stride = match &index.stride {
            Some(expr) => self.eval_integer(expr, env)?,
            None => 1,
        };
        if stride == 0 {
            return Err(Error::ZeroStride);
        }

        let mut indices = Vec::new();
        if stride > 0 {
            let mut i = start.unwrap_or(0);
            let end = end.unwrap_or(length);
            while i < end {
                indices.push(i as usize);
                i = match i.checked_add(stride) {
                    Some(next) => next,
                    None => break,
                };
            }
        } else {
            let mut i = start.unwrap_or(length - 1);
            let end = end.unwrap_or(-1);
            while i > end {
                indices.push(i as usize);
                i = match i.checked_add(stride) {
                    Some(next) => next,
                    None => break,
                };
            }
        }

        Ok(Selection::Range(indices))
    }

    fn eval_integer(&self, expr: &Expression, env: &Environment) -> Result<i64> {
        match self.eval_expression(expr, env)? {
            Object::Integer(n) => Ok(n),
            other => Err(Error::IndexNotInteger(other.object_type())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Positions picked out by an index expression
enum Selection {
    /// Plain `target[i]`
    Element(usize),
    /// Slice, in traversal order
    Range(Vec<usize>),
}

/// Negative indices count from the end; `-len` is the first element
fn resolve_start(index: i64, len: usize) -> Result<i64> {
    let length = len as i64;
    let out_of_range = Error::IndexOutOfArray {
        index,
        length: len,
    };

    if index >= length {
        return Err(out_of_range);
    }
    if index < 0 {
        if index.unsigned_abs() > len as u64 {
            return Err(out_of_range);
        }
        return Ok(length + index);
    }
    Ok(index)
}

fn unwrap_return(obj: Object) -> Object {
    match obj {
        Object::ReturnValue(value) => *value,
        other => other,
    }
}

// ============================================================================
// Operators
// ============================================================================

fn eval_prefix(op: UnaryOp, right: Object) -> Result<Object> {
    match op {
        UnaryOp::Not => Ok(Object::from_bool(!right.is_truthy())),
        UnaryOp::Neg => match right {
            Object::Integer(n) => Ok(Object::Integer(n.wrapping_neg())),
            Object::Float(f) => Ok(Object::Float(-f)),
            Object::Boolean(false) => Ok(FALSE),
            Object::Boolean(true) => Ok(Object::Integer(-1)),
            other => Err(Error::UnknownPrefixOperator {
                op,
                right: other.object_type(),
            }),
        },
    }
}

/// Booleans join the numeric tower as 0/1; strings only concatenate
fn eval_infix(op: BinaryOp, left: Object, right: Object) -> Result<Object> {
    match (&left, &right) {
        (Object::Integer(a), Object::Integer(b)) => eval_integer_infix(op, *a, *b),
        (Object::Integer(a), Object::Boolean(b)) => eval_integer_infix(op, *a, i64::from(*b)),
        (Object::Boolean(a), Object::Integer(b)) => eval_integer_infix(op, i64::from(*a), *b),
        (Object::Boolean(a), Object::Boolean(b)) => {
            eval_integer_infix(op, i64::from(*a), i64::from(*b))
        }

        (Object::Float(a), Object::Float(b)) => Ok(eval_float_infix(op, *a, *b)),
        (Object::Integer(a), Object::Float(b)) => Ok(eval_float_infix(op, *a as f64, *b)),
        (Object::Float(a), Object::Integer(b)) => Ok(eval_float_infix(op, *a, *b as f64)),
        (Object::Boolean(a), Object::Float(b)) => Ok(eval_float_infix(op, bool_to_f64(*a), *b)),
        (Object::Float(a), Object::Boolean(b)) => Ok(eval_float_infix(op, *a, bool_to_f64(*b))),

        (Object::String(a), Object::String(b)) if op == BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Object::String(joined))
        }

        (Object::Null, Object::Null) => match op {
            BinaryOp::Eq => Ok(TRUE),
            BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Gt => Ok(FALSE),
            _ => Err(unknown_infix(op, &left, &right)),
        },

        _ => Err(unknown_infix(op, &left, &right)),
    }
}

fn eval_integer_infix(op: BinaryOp, a: i64, b: i64) -> Result<Object> {
    let result = match op {
        BinaryOp::Add => Object::Integer(a.wrapping_add(b)),
        BinaryOp::Sub => Object::Integer(a.wrapping_sub(b)),
        BinaryOp::Mul => Object::Integer(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(Error::DivisionByZero);
            }
            Object::Integer(a.wrapping_div(b))
        }
        BinaryOp::Lt => Object::from_bool(a < b),
        BinaryOp::Gt => Object::from_bool(a > b),
        BinaryOp::Eq => Object::from_bool(a == b),
        BinaryOp::NotEq => Object::from_bool(a != b),
    };
    Ok(result)
}

fn eval_float_infix(op: BinaryOp, a: f64, b: f64) -> Object {
    match op {
        BinaryOp::Add => Object::Float(a + b),
        BinaryOp::Sub => Object::Float(a - b),
        BinaryOp::Mul => Object::Float(a * b),
        BinaryOp::Div => Object::Float(a / b),
        BinaryOp::Lt => Object::from_bool(a < b),
        BinaryOp::Gt => Object::from_bool(a > b),
        BinaryOp::Eq => Object::from_bool(a == b),
        BinaryOp::NotEq => Object::from_bool(a != b),
    }
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn unknown_infix(op: BinaryOp, left: &Object, right: &Object) -> Error {
    Error::UnknownInfixOperator {
        left: left.object_type(),
        op,
        right: right.object_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval(source: &str) -> Object {
        let (program, err) = parse(source);
        assert!(err.is_none(), "parse error for {:?}: {:?}", source, err);
        Evaluator::new().eval(&program, &Environment::new())
    }

    fn assert_error(source: &str, message: &str) {
        match eval(source) {
            Object::Error(msg) => assert_eq!(msg, message, "input: {}", source),
            other => panic!("expected error for {:?}, got {:?}", source, other),
        }
    }

    #[test]
    fn test_integer_arithmetic() {
        let cases = [
            ("5", 5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * (5 + 10)", 30),
            ("-50 + 100 + -50", 0),
            ("50 / 2 * 2 + 10", 60),
            ("7 / 2", 3),
            ("-7 / 2", -3),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("-18446744073709551615", 1),
        ];
        for (input, expected) in cases {
            assert_eq!(eval(input), Object::Integer(expected), "input: {}", input);
        }
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(eval("5 * 5.0 + 1"), Object::Float(26.0));
        assert_eq!(eval("1.5 + 2 - 1"), Object::Float(2.5));
        assert_eq!(eval("true + true"), Object::Integer(2));
        assert_eq!(eval("true * 2.5"), Object::Float(2.5));
        assert_eq!(eval("1 == true"), TRUE);
        assert_eq!(eval("true != false"), TRUE);
    }

    #[test]
    fn test_division_by_zero() {
        assert_error("1 / 0", "division by zero");
        assert_eq!(eval("1.0 / 0"), Object::Float(f64::INFINITY));
    }

    #[test]
    fn test_bang_and_negation() {
        assert_eq!(eval("!true"), FALSE);
        assert_eq!(eval("!5"), FALSE);
        assert_eq!(eval("!0"), FALSE);
        assert_eq!(eval("!!5"), TRUE);
        assert_eq!(eval("-true"), Object::Integer(-1));
        assert_eq!(eval("-false"), FALSE);
        assert_eq!(eval("-2.5"), Object::Float(-2.5));
    }

    #[test]
    fn test_null_comparisons() {
        let null = "if (false) { 1 }";
        assert_eq!(eval(&format!("{0} == {0}", null)), TRUE);
        assert_eq!(eval(&format!("{0} != {0}", null)), FALSE);
        assert_eq!(eval(&format!("{0} < {0}", null)), FALSE);
        assert_error(&format!("{0} + {0}", null), "unknown operator: NULL+NULL");
        assert_error(&format!("1 == {}", null), "unknown operator: INT==NULL");
    }

    #[test]
    fn test_return_tunnels_through_blocks() {
        assert_eq!(
            eval("if (10 > 1) { if (10 > 1) { return 10; } return 1; }"),
            Object::Integer(10)
        );
        assert_eq!(eval("9; return 2 * 5; 9;"), Object::Integer(10));
    }

    #[test]
    fn test_let_evaluates_to_null() {
        assert_eq!(eval("let a = 5;"), NULL);
        assert_eq!(eval("let a = 5; a * 2"), Object::Integer(10));
    }

    #[test]
    fn test_closures() {
        assert_eq!(
            eval("let one = fn() { let x = 1; fn() { x } }; one()()"),
            Object::Integer(1)
        );
        assert_eq!(
            eval("let adder = fn(x) { fn(y) { x + y } }; let add2 = adder(2); add2(3)"),
            Object::Integer(5)
        );
    }

    #[test]
    fn test_function_arity_is_checked() {
        assert_error(
            "fn(x, y) { x + y }(1)",
            "wrong number of arguments: got=1, want=2",
        );
    }

    #[test]
    fn test_errors_short_circuit() {
        assert_error("[1, 2 + true * foo, 3]", "identifier not found: foo");
        assert_error("{\"a\": bar}", "identifier not found: bar");
        assert_error("5; -\"a\"; 5", "unknown operator: -STRING");
    }

    #[test]
    fn test_not_callable() {
        assert_error("let x = 5; x(1)", "not a function: INT");
    }

    #[test]
    fn test_builtin_shadowing() {
        assert_eq!(eval("let len = fn(x) { 42 }; len(\"abc\")"), Object::Integer(42));
        assert_eq!(eval("len(\"abc\")"), Object::Integer(3));
    }

    #[test]
    fn test_array_and_string_indexing() {
        assert_eq!(eval("[1, 2, 3][-1]"), Object::Integer(3));
        assert_eq!(eval("[1, 2, 3][-3]"), Object::Integer(1));
        assert_error("[1, 2, 3][-4]", "index -4 out of array with length 3");
        assert_eq!(eval("\"hello\"[1:3]"), Object::string("el"));
        assert_eq!(eval("\"hello\"[::-1]"), Object::string("olleh"));
        assert_eq!(eval("\"hello\"[0]"), Object::string("h"));
    }

    #[test]
    fn test_empty_sequences_slice_to_empty() {
        assert_eq!(eval("[][:]"), Object::array(vec![]));
        assert_eq!(eval("\"\"[::-1]"), Object::string(""));
        assert_error("[][0]", "index 0 out of array with length 0");
    }

    #[test]
    fn test_hash_index_forms() {
        assert_eq!(eval("{\"a\": 1}[\"a\"]"), Object::Integer(1));
        assert_error("{\"a\": 1}[]", "array-like indexing with empty expression");
        assert_error("{\"a\": 1}[\"a\":]", "index operator not supported: HASH");
        assert_error("1[0]", "index operator not supported: INT");
    }

    #[test]
    fn test_eval_accepts_single_nodes() {
        let (program, _) = parse("return 3;");
        let env = Environment::new();
        let evaluator = Evaluator::new();

        assert_eq!(evaluator.eval(&program.statements[0], &env), Object::Integer(3));
        match &program.statements[0] {
            Statement::Return { value } => {
                assert_eq!(evaluator.eval(value, &env), Object::Integer(3))
            }
            other => panic!("expected return, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_registry_has_no_builtins() {
        let (program, _) = parse("len(\"a\")");
        let evaluator = Evaluator::with_registry(BuiltinRegistry::empty());
        assert_eq!(
            evaluator.eval(&program, &Environment::new()),
            Object::Error("identifier not found: len".to_string())
        );
    }
}
