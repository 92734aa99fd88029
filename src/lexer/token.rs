use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

lazy_static::lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut keywords = HashMap::new();
        keywords.insert("fn", TokenKind::Function);
        keywords.insert("let", TokenKind::Let);
        keywords.insert("true", TokenKind::True);
        keywords.insert("false", TokenKind::False);
        keywords.insert("if", TokenKind::If);
        keywords.insert("else", TokenKind::Else);
        keywords.insert("return", TokenKind::Return);
        keywords
    };
}

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The type of token
    #[serde(rename = "Type")]
    pub kind: TokenKind,
    /// Source text of the token; for strings, the unescaped contents
    #[serde(rename = "Literal")]
    pub literal: String,
    /// Line number where token appears (1-indexed)
    #[serde(skip)]
    pub line: usize,
    /// Column number where token starts (1-indexed)
    #[serde(skip)]
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }
}

/// All possible token types in Monkey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Character the scanner does not recognise
    #[serde(rename = "ILLEGAL")]
    Illegal,
    /// End of input, repeated forever once reached
    #[serde(rename = "EOF")]
    Eof,

    // Identifiers and literals
    /// Identifier
    #[serde(rename = "IDENT")]
    Ident,
    /// Integer literal
    #[serde(rename = "INT")]
    Int,
    /// Floating-point literal
    #[serde(rename = "FLOAT")]
    Float,
    /// String literal
    #[serde(rename = "STRING")]
    String,

    // Operators
    /// Assignment operator (=)
    #[serde(rename = "=")]
    Assign,
    /// Plus operator (+)
    #[serde(rename = "+")]
    Plus,
    /// Minus operator (-)
    #[serde(rename = "-")]
    Minus,
    /// Bang operator (!)
    #[serde(rename = "!")]
    Bang,
    /// Asterisk operator (*)
    #[serde(rename = "*")]
    Asterisk,
    /// Slash operator (/)
    #[serde(rename = "/")]
    Slash,
    /// Less than operator (<)
    #[serde(rename = "<")]
    Lt,
    /// Greater than operator (>)
    #[serde(rename = ">")]
    Gt,
    /// Equality operator (==)
    #[serde(rename = "==")]
    Eq,
    /// Inequality operator (!=)
    #[serde(rename = "!=")]
    NotEq,

    // Delimiters
    /// Comma delimiter
    #[serde(rename = ",")]
    Comma,
    /// Semicolon delimiter
    #[serde(rename = ";")]
    Semicolon,
    /// Colon (slices and hash pairs)
    #[serde(rename = ":")]
    Colon,
    /// Left parenthesis (
    #[serde(rename = "(")]
    LeftParen,
    /// Right parenthesis )
    #[serde(rename = ")")]
    RightParen,
    /// Left brace {
    #[serde(rename = "{")]
    LeftBrace,
    /// Right brace }
    #[serde(rename = "}")]
    RightBrace,
    /// Left bracket [
    #[serde(rename = "[")]
    LeftBracket,
    /// Right bracket ]
    #[serde(rename = "]")]
    RightBracket,

    // Keywords
    /// FN keyword
    #[serde(rename = "FUNCTION")]
    Function,
    /// LET keyword
    #[serde(rename = "LET")]
    Let,
    /// TRUE keyword
    #[serde(rename = "TRUE")]
    True,
    /// FALSE keyword
    #[serde(rename = "FALSE")]
    False,
    /// IF keyword
    #[serde(rename = "IF")]
    If,
    /// ELSE keyword
    #[serde(rename = "ELSE")]
    Else,
    /// RETURN keyword
    #[serde(rename = "RETURN")]
    Return,
}

impl TokenKind {
    /// Reclassifies scanned identifier text as a keyword, if it is one
    pub fn keyword(s: &str) -> Option<TokenKind> {
        KEYWORDS.get(s).copied()
    }

    /// Name used in diagnostics and token dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Function => "FUNCTION",
            TokenKind::Let => "LET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
