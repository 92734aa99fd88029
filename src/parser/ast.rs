use std::fmt;
use std::rc::Rc;

/// Complete Monkey program
///
/// Built once per parse and never mutated afterwards; the evaluator only
/// borrows it, so the same program can be evaluated any number of times.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in the program
    pub statements: Vec<Statement>,
}

impl Program {
    /// Label of the first token, for diagnostics
    pub fn debug_label(&self) -> String {
        self.statements
            .first()
            .map(Statement::debug_label)
            .unwrap_or_default()
    }
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable binding: let name = value
    Let {
        /// Name being bound
        name: Identifier,
        /// Expression value to bind
        value: Expression,
    },

    /// Return statement: return value
    Return {
        /// Value to return
        value: Expression,
    },

    /// Expression statement
    Expression(Expression),
}

impl Statement {
    /// Label of the first token, for diagnostics
    pub fn debug_label(&self) -> String {
        match self {
            Statement::Let { name, .. } => name.debug_label(),
            Statement::Return { value } => value.debug_label(),
            Statement::Expression(expr) => expr.debug_label(),
        }
    }
}

/// Braced statement list used by `if`/`else` branches and function bodies
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    /// Statements in the block
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    /// Label of the first token, for diagnostics
    pub fn debug_label(&self) -> String {
        self.statements
            .first()
            .map(Statement::debug_label)
            .unwrap_or_else(|| "{".to_string())
    }
}

/// Identifier reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Identifier name
    pub value: String,
}

impl Identifier {
    /// Creates an identifier
    pub fn new(value: impl Into<String>) -> Self {
        Identifier {
            value: value.into(),
        }
    }

    /// Label of the first token, for diagnostics
    pub fn debug_label(&self) -> String {
        self.value.clone()
    }
}

/// Function literal: fn(params) { body }
///
/// Shared behind an [`Rc`] so function values created at runtime can keep
/// their parameters and body alive after the program that defined them is
/// dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    /// Parameter names, in order
    pub parameters: Vec<Identifier>,
    /// Function body
    pub body: BlockStatement,
}

/// Index or slice expression: left[start:end:stride]
///
/// A segment may be omitted, which is different from supplying it: omitted
/// segments get direction-dependent defaults when evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    /// Expression being indexed
    pub left: Box<Expression>,
    /// Start (or the sole index in `left[i]`)
    pub start: Option<Box<Expression>>,
    /// End of a slice
    pub end: Option<Box<Expression>>,
    /// Stride of a slice
    pub stride: Option<Box<Expression>>,
    /// A `:` after the start segment was written, making this a slice
    pub has_end: bool,
    /// A second `:` was written, so a stride segment is present
    pub has_stride: bool,
}

impl IndexExpression {
    /// True for `left[]`
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && !self.has_end && !self.has_stride
    }

    /// True when slice syntax was used rather than a plain `left[i]`
    pub fn is_slice(&self) -> bool {
        self.has_end || self.has_stride
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Literals
    /// Identifier expression
    Identifier(Identifier),
    /// Integer literal expression (always non-negative; `-` is a prefix operator)
    IntegerLiteral(u64),
    /// Floating-point literal expression
    FloatLiteral(f64),
    /// Boolean literal expression
    BooleanLiteral(bool),
    /// String literal expression
    StringLiteral(String),

    // Collections
    /// Array literal expression
    ArrayLiteral(Vec<Expression>),
    /// Hash literal expression with key-value pairs, in source order
    HashLiteral(Vec<(Expression, Expression)>),

    // Operators
    /// Prefix operation expression
    Prefix {
        /// Prefix operator to apply
        op: UnaryOp,
        /// Operand expression
        right: Box<Expression>,
    },

    /// Infix operation expression
    Infix {
        /// Infix operator to apply
        op: BinaryOp,
        /// Left operand expression
        left: Box<Expression>,
        /// Right operand expression
        right: Box<Expression>,
    },

    /// Conditional expression
    If {
        /// Condition expression to evaluate
        condition: Box<Expression>,
        /// Block to evaluate if condition is truthy
        consequence: BlockStatement,
        /// Optional block to evaluate otherwise
        alternative: Option<BlockStatement>,
    },

    /// Function literal expression
    FunctionLiteral(Rc<FunctionLiteral>),

    /// Call expression
    Call {
        /// Expression producing the callee
        function: Box<Expression>,
        /// Argument expressions, evaluated left to right
        arguments: Vec<Expression>,
    },

    /// Index or slice expression
    Index(IndexExpression),
}

impl Expression {
    /// Label of the first token, for diagnostics
    pub fn debug_label(&self) -> String {
        match self {
            Expression::Identifier(ident) => ident.debug_label(),
            Expression::IntegerLiteral(n) => n.to_string(),
            Expression::FloatLiteral(f) => f.to_string(),
            Expression::BooleanLiteral(b) => b.to_string(),
            Expression::StringLiteral(s) => s.clone(),
            Expression::ArrayLiteral(_) => "[".to_string(),
            Expression::HashLiteral(_) => "{".to_string(),
            Expression::Prefix { op, .. } => op.to_string(),
            Expression::Infix { left, .. } => left.debug_label(),
            Expression::If { .. } => "if".to_string(),
            Expression::FunctionLiteral(_) => "fn".to_string(),
            Expression::Call { function, .. } => function.debug_label(),
            Expression::Index(index) => index.left.debug_label(),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    /// Addition operator (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,

    // Comparison
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation operator (-x)
    Neg,
    /// Logical NOT operator (!x)
    Not,
}

/// Operator precedence levels
///
/// Prefix operators sit between the additive and multiplicative levels, so
/// `-b*c` groups as `-(b*c)` while `-1+2` groups as `(-1)+2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Lowest binding power
    Lowest,
    /// Equality operators (==, !=)
    Equals,
    /// Comparison operators (<, >)
    LessGreater,
    /// Addition and subtraction (+, -)
    Sum,
    /// Prefix operators (-X, !X)
    Prefix,
    /// Multiplication and division (*, /)
    Product,
    /// Call and index (f(x), a[i])
    Call,
}

impl BinaryOp {
    /// Returns the precedence level of this binary operator
    pub fn precedence(&self) -> Precedence {
        match self {
            BinaryOp::Eq | BinaryOp::NotEq => Precedence::Equals,
            BinaryOp::Lt | BinaryOp::Gt => Precedence::LessGreater,
            BinaryOp::Add | BinaryOp::Sub => Precedence::Sum,
            BinaryOp::Mul | BinaryOp::Div => Precedence::Product,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

// Canonical rendering: one statement per line, each terminated by `;`, and
// every operator application fully parenthesized.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {};", name, value),
            Statement::Return { value } => write!(f, "return {};", value),
            Statement::Expression(expr) => write!(f, "{};", expr),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fn(")?;
        write_separated(f, &self.parameters)?;
        write!(f, "){}", self.body)
    }
}

impl fmt::Display for IndexExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}[", self.left)?;
        if let Some(start) = &self.start {
            write!(f, "{}", start)?;
        }
        if self.has_end {
            write!(f, ":")?;
            if let Some(end) = &self.end {
                write!(f, "{}", end)?;
            }
        }
        if self.has_stride {
            write!(f, ":")?;
            if let Some(stride) = &self.stride {
                write!(f, "{}", stride)?;
            }
        }
        write!(f, "])")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntegerLiteral(n) => write!(f, "{}", n),
            Expression::FloatLiteral(fl) => write!(f, "{}", fl),
            Expression::BooleanLiteral(b) => write!(f, "{}", b),
            Expression::StringLiteral(s) => write_quoted(f, s),
            Expression::ArrayLiteral(elements) => {
                write!(f, "[")?;
                write_separated(f, elements)?;
                write!(f, "]")
            }
            Expression::HashLiteral(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                write!(f, "}}")
            }
            Expression::Prefix { op, right } => write!(f, "({}{})", op, right),
            Expression::Infix { op, left, right } => write!(f, "({}{}{})", left, op, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if({}){}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else{}", alt)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral(func) => write!(f, "{}", func),
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index(index) => write!(f, "{}", index),
        }
    }
}

fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expression {
        Expression::Identifier(Identifier::new(name))
    }

    #[test]
    fn test_let_rendering() {
        let program = Program {
            statements: vec![Statement::Let {
                name: Identifier::new("x"),
                value: ident("y"),
            }],
        };
        assert_eq!(program.to_string(), "let x = y;");
        assert_eq!(program.debug_label(), "x");
    }

    #[test]
    fn test_statements_one_per_line() {
        let program = Program {
            statements: vec![
                Statement::Return { value: ident("a") },
                Statement::Expression(Expression::IntegerLiteral(7)),
            ],
        };
        assert_eq!(program.to_string(), "return a;\n7;");
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(Precedence::Product > Precedence::Prefix);
        assert!(Precedence::Prefix > Precedence::Sum);
        assert!(Precedence::Call > Precedence::Product);
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Lt.precedence() > BinaryOp::Eq.precedence());
    }

    #[test]
    fn test_function_rendering() {
        let func = FunctionLiteral {
            parameters: vec![Identifier::new("x"), Identifier::new("y")],
            body: BlockStatement {
                statements: vec![Statement::Expression(Expression::Infix {
                    op: BinaryOp::Add,
                    left: Box::new(ident("x")),
                    right: Box::new(ident("y")),
                })],
            },
        };
        assert_eq!(func.to_string(), "fn(x,y){(x+y);}");
    }

    #[test]
    fn test_index_rendering_keeps_omitted_segments() {
        let index = IndexExpression {
            left: Box::new(ident("a")),
            start: None,
            end: Some(Box::new(Expression::IntegerLiteral(2))),
            stride: None,
            has_end: true,
            has_stride: true,
        };
        assert_eq!(index.to_string(), "(a[:2:])");
        assert!(index.is_slice());
        assert!(!index.is_empty());
    }

    #[test]
    fn test_string_literal_is_requoted() {
        let expr = Expression::StringLiteral("a\"b\n".to_string());
        assert_eq!(expr.to_string(), r#""a\"b\n""#);
    }
}
