use super::token::{Token, TokenKind};

/// On-demand scanner for Monkey source text
///
/// `next_token` never fails: characters outside the language become
/// [`TokenKind::Illegal`] tokens and, once the input is exhausted, every
/// further call yields [`TokenKind::Eof`].
pub struct Lexer {
    /// Source code as character vector
    source: Vec<char>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line and column where the current token starts
    token_line: usize,
    token_column: usize,
}

impl Lexer {
    /// Creates a new lexer over the given source code
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            token_line: 1,
            token_column: 1,
        }
    }

    /// Scans the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        self.start = self.current;
        self.token_line = self.line;
        self.token_column = self.column;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof, String::new());
        }

        let c = self.advance();
        match c {
            '=' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::Eq)
                } else {
                    self.add_token(TokenKind::Assign)
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::NotEq)
                } else {
                    self.add_token(TokenKind::Bang)
                }
            }
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Asterisk),
            '/' => self.add_token(TokenKind::Slash),
            '<' => self.add_token(TokenKind::Lt),
            '>' => self.add_token(TokenKind::Gt),
            ',' => self.add_token(TokenKind::Comma),
            ';' => self.add_token(TokenKind::Semicolon),
            ':' => self.add_token(TokenKind::Colon),
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),

            '"' | '\'' => self.scan_string(c),

            c if c.is_ascii_digit() => self.scan_number(),

            c if is_identifier_start(c) => self.scan_identifier_or_keyword(),

            _ => self.add_token(TokenKind::Illegal),
        }
    }

    /// Scans every remaining token, stopping after (and including) the first EOF
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), ' ' | '\t' | '\r' | '\n') {
            self.advance();
        }
    }

    /// Scans a string delimited by `quote`; an unterminated string runs to end of input
    fn scan_string(&mut self, quote: char) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != quote {
            let c = self.advance();
            if c == '\\' {
                if self.is_at_end() {
                    break;
                }
                match self.advance() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    other => value.push(other),
                }
            } else {
                value.push(c);
            }
        }

        if !self.is_at_end() {
            self.advance(); // closing quote
        }

        self.make_token(TokenKind::String, value)
    }

    /// Scans an INT or FLOAT; a `.` not followed by a digit is left for the next call
    fn scan_number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume .
            while self.peek().is_ascii_digit() {
                self.advance();
            }
            return self.add_token(TokenKind::Float);
        }

        self.add_token(TokenKind::Int)
    }

    fn scan_identifier_or_keyword(&mut self) -> Token {
        while is_identifier_continue(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
        self.make_token(kind, text)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn add_token(&self, kind: TokenKind) -> Token {
        let literal: String = self.source[self.start..self.current].iter().collect();
        self.make_token(kind, literal)
    }

    fn make_token(&self, kind: TokenKind, literal: String) -> Token {
        Token::new(kind, literal, self.token_line, self.token_column)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
