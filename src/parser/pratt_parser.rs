use std::rc::Rc;

use super::ast::{
    BinaryOp, BlockStatement, Expression, FunctionLiteral, Identifier, IndexExpression,
    Precedence, Program, Statement, UnaryOp,
};
use crate::error::{Diagnostic, ParseError};
use crate::lexer::{Lexer, Token, TokenKind};

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

/// Deepest expression tree the parser will build
///
/// Counts both nested sub-expressions and operators folded onto the left of
/// a chain, so it bounds the height of every expression tree handed to the
/// evaluator.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Pratt parser for Monkey source
///
/// Pulls tokens from the [`Lexer`] on demand and keeps two of them in view:
/// the current token selects a prefix parse function, the peek token an
/// infix one. Parsing is best-effort: every failure is recorded and the parser
/// moves on, so one call can report several problems.
pub struct Parser {
    lexer: Lexer,
    cur: Token,
    peek: Token,
    errors: ParseError,
    depth: usize,
}

impl Parser {
    /// Creates a parser primed with the first two tokens
    pub fn new(mut lexer: Lexer) -> Self {
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            cur,
            peek,
            errors: ParseError::default(),
            depth: 0,
        }
    }

    /// Parses the whole input into a program
    ///
    /// Statements that failed to parse are left out of the program. Check
    /// [`Parser::error`] before evaluating the result.
    pub fn parse(&mut self) -> Program {
        let mut program = Program::default();

        while self.cur.kind != TokenKind::Eof {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }

        program
    }

    /// Accumulated diagnostics, or `None` if the input parsed cleanly
    pub fn error(&self) -> Option<&ParseError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(&self.errors)
        }
    }

    /// Consumes the parser, returning its diagnostics if any were recorded
    pub fn into_error(self) -> Option<ParseError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors)
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Parses one statement, leaving `cur` on its last token
    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// let <IDENT> = <EXPR> [;]
    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.cur.literal.clone());

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Some(Statement::Let { name, value })
    }

    /// return <EXPR> [;]
    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        // Semicolons are optional so REPL lines can end without one
        self.skip_semicolon();
        Some(Statement::Expression(expr))
    }

    /// Parses `{ ... }` with `cur` on the opening brace; stops at `}` or EOF
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();

        while self.cur.kind != TokenKind::RightBrace && self.cur.kind != TokenKind::Eof {
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.next_token();
        }

        block
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Precedence climbing: parse a prefix term, then fold in infix operators
    /// that bind tighter than `precedence`
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let depth = self.depth;
        let expr = self.parse_nested_expression(precedence);
        self.depth = depth;
        expr
    }

    fn parse_nested_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        self.descend()?;
        let Some(prefix) = prefix_parse_fn(self.cur.kind) else {
            let message = format!("no prefix parse function for {} found", self.cur.kind);
            self.record_error(message);
            return None;
        };
        let mut left = prefix(self)?;

        while self.peek.kind != TokenKind::Semicolon && precedence < self.peek_precedence() {
            let Some(infix) = infix_parse_fn(self.peek.kind) else {
                return Some(left);
            };
            self.descend()?;
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier::new(
            self.cur.literal.clone(),
        )))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<u64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(e) => {
                let message = format!("could not parse {} as integer: {}", self.cur.literal, e);
                self.record_error(message);
                None
            }
        }
    }

    fn parse_float_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<f64>() {
            Ok(value) => Some(Expression::FloatLiteral(value)),
            Err(e) => {
                let message = format!("could not parse {} as float: {}", self.cur.literal, e);
                self.record_error(message);
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::StringLiteral(self.cur.literal.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::BooleanLiteral(self.cur.kind == TokenKind::True))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let op = match self.cur.kind {
            TokenKind::Bang => UnaryOp::Not,
            _ => UnaryOp::Neg,
        };
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let op = binary_op(self.cur.kind)?;
        self.next_token();
        let right = self.parse_expression(op.precedence())?;
        Some(Expression::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// ( <EXPR> )
    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;
        Some(expr)
    }

    /// if ( <EXPR> ) { ... } [else { ... }]
    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParen)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek.kind == TokenKind::Else {
            self.next_token();
            self.expect_peek(TokenKind::LeftBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// fn ( <IDENT>, ... ) { ... }
    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral(Rc::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek.kind == TokenKind::RightParen {
            self.next_token();
            return Some(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(Identifier::new(self.cur.literal.clone()));

        while self.peek.kind == TokenKind::Comma {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(Identifier::new(self.cur.literal.clone()));
        }

        self.expect_peek(TokenKind::RightParen)?;
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RightParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;
        Some(Expression::ArrayLiteral(elements))
    }

    /// Comma-separated expressions up to `end`, with `cur` on the opening delimiter
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek.kind == end {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek.kind == TokenKind::Comma {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(list)
    }

    /// { <EXPR> : <EXPR>, ... }
    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();

        while self.peek.kind != TokenKind::RightBrace {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek.kind != TokenKind::RightBrace {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RightBrace)?;
        Some(Expression::HashLiteral(pairs))
    }

    /// <EXPR> [ start? (: end?)? (: stride?)? ]
    ///
    /// Records which segments were written so omitted ones can take their
    /// direction-dependent defaults at evaluation time.
    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let mut index = IndexExpression {
            left: Box::new(left),
            start: None,
            end: None,
            stride: None,
            has_end: false,
            has_stride: false,
        };

        if self.peek.kind == TokenKind::RightBracket {
            self.next_token();
            return Some(Expression::Index(index));
        }

        if self.peek.kind != TokenKind::Colon {
            self.next_token();
            index.start = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
        }

        if self.peek.kind == TokenKind::Colon {
            self.next_token();
            index.has_end = true;
            if !matches!(self.peek.kind, TokenKind::Colon | TokenKind::RightBracket) {
                self.next_token();
                index.end = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            }
        }

        if self.peek.kind == TokenKind::Colon {
            self.next_token();
            index.has_stride = true;
            if self.peek.kind != TokenKind::RightBracket {
                self.next_token();
                index.stride = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            }
        }

        self.expect_peek(TokenKind::RightBracket)?;
        Some(Expression::Index(index))
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.cur = std::mem::replace(&mut self.peek, next);
    }

    fn skip_semicolon(&mut self) {
        if self.peek.kind == TokenKind::Semicolon {
            self.next_token();
        }
    }

    /// Advances if the peek token has the expected kind, records an error otherwise
    fn expect_peek(&mut self, expected: TokenKind) -> Option<()> {
        if self.peek.kind == expected {
            self.next_token();
            Some(())
        } else {
            let message = format!(
                "expecting token {}, but got {} with literal {} instead",
                expected, self.peek.kind, self.peek.literal
            );
            let (line, column) = (self.peek.line, self.peek.column);
            self.record_error_at(line, column, message);
            None
        }
    }

    /// Takes one more level of tree height, failing past [`MAX_NESTING_DEPTH`]
    fn descend(&mut self) -> Option<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            self.record_error("expression nested too deeply".to_string());
            return None;
        }
        self.depth += 1;
        Some(())
    }

    fn peek_precedence(&self) -> Precedence {
        token_precedence(self.peek.kind)
    }

    fn record_error(&mut self, message: String) {
        let (line, column) = (self.cur.line, self.cur.column);
        self.record_error_at(line, column, message);
    }

    fn record_error_at(&mut self, line: usize, column: usize, message: String) {
        tracing::debug!(line, column, %message, "parse error");
        self.errors.push(Diagnostic {
            line,
            column,
            message,
        });
    }
}

/// Prefix parse table, keyed by the current token
fn prefix_parse_fn(kind: TokenKind) -> Option<PrefixParseFn> {
    let f: PrefixParseFn = match kind {
        TokenKind::Ident => Parser::parse_identifier,
        TokenKind::Int => Parser::parse_integer_literal,
        TokenKind::Float => Parser::parse_float_literal,
        TokenKind::String => Parser::parse_string_literal,
        TokenKind::True | TokenKind::False => Parser::parse_boolean,
        TokenKind::Bang | TokenKind::Minus => Parser::parse_prefix_expression,
        TokenKind::LeftParen => Parser::parse_grouped_expression,
        TokenKind::If => Parser::parse_if_expression,
        TokenKind::Function => Parser::parse_function_literal,
        TokenKind::LeftBracket => Parser::parse_array_literal,
        TokenKind::LeftBrace => Parser::parse_hash_literal,
        _ => return None,
    };
    Some(f)
}

/// Infix parse table, keyed by the peek token
fn infix_parse_fn(kind: TokenKind) -> Option<InfixParseFn> {
    let f: InfixParseFn = match kind {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Asterisk
        | TokenKind::Slash
        | TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::Eq
        | TokenKind::NotEq => Parser::parse_infix_expression,
        TokenKind::LeftParen => Parser::parse_call_expression,
        TokenKind::LeftBracket => Parser::parse_index_expression,
        _ => return None,
    };
    Some(f)
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Asterisk => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        _ => return None,
    };
    Some(op)
}

fn token_precedence(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::LeftParen | TokenKind::LeftBracket => Precedence::Call,
        other => binary_op(other)
            .map(|op| op.precedence())
            .unwrap_or(Precedence::Lowest),
    }
}
