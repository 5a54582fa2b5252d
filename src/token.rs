use log::trace;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Toy scanner.
///
/// Tokens carry no payload: literal values are recovered from the lexeme by
/// the parser, which keeps every token `Copy`.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    // ── single character tokens ──────────────────────────────────────────
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// '['
    LEFT_BRACKET,

    /// ']'
    RIGHT_BRACKET,

    /// ';'
    SEMICOLON,

    /// ','
    COMMA,

    // ── one or two character tokens ──────────────────────────────────────
    /// '+'
    PLUS,

    /// '+='
    PLUS_EQUAL,

    /// '++'
    PLUS_PLUS,

    /// '-'
    MINUS,

    /// '-='
    MINUS_EQUAL,

    /// '--'
    MINUS_MINUS,

    /// '*'
    STAR,

    /// '*='
    STAR_EQUAL,

    /// '/'
    SLASH,

    /// '/='
    SLASH_EQUAL,

    /// '%'
    MODULO,

    /// '%='
    MODULO_EQUAL,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '=>' (arrow syntax)
    EQUAL_GREATER,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// '<|' (back pipe)
    LESS_OR,

    /// '&&'
    AND_AND,

    /// '||'
    OR_OR,

    /// '|>' (pipe)
    OR_GREATER,

    /// '.'
    DOT,

    /// '...' (reserved for rest/spread)
    DOT_DOT_DOT,

    /// '?'
    QUESTION,

    /// ':'
    COLON,

    // ── literals ─────────────────────────────────────────────────────────
    /// A user‑defined identifier
    IDENTIFIER,

    /// A numeric literal
    NUMBER,

    /// A string literal, lexeme includes the surrounding quotes
    STRING,

    // ── keywords ─────────────────────────────────────────────────────────
    AS,
    ASSERT,
    BREAK,
    CONST,
    CONTINUE,
    DO,
    ELSE,
    FALSE,
    FOR,
    FOREACH,
    IF,
    IMPORT,
    IN,
    NIL,
    OF,
    PRINT,
    RETURN,
    TRUE,
    VAR,
    WHILE,

    // ── meta ─────────────────────────────────────────────────────────────
    /// Does nothing; reserved.
    PASS,

    /// Lexical error; the lexeme holds the message.
    ERROR,

    /// End‑of‑file marker
    EOF,
}

impl TokenType {
    /// Every token kind, in declaration order.
    pub const ALL: [TokenType; 63] = [
        TokenType::LEFT_PAREN,
        TokenType::RIGHT_PAREN,
        TokenType::LEFT_BRACE,
        TokenType::RIGHT_BRACE,
        TokenType::LEFT_BRACKET,
        TokenType::RIGHT_BRACKET,
        TokenType::SEMICOLON,
        TokenType::COMMA,
        TokenType::PLUS,
        TokenType::PLUS_EQUAL,
        TokenType::PLUS_PLUS,
        TokenType::MINUS,
        TokenType::MINUS_EQUAL,
        TokenType::MINUS_MINUS,
        TokenType::STAR,
        TokenType::STAR_EQUAL,
        TokenType::SLASH,
        TokenType::SLASH_EQUAL,
        TokenType::MODULO,
        TokenType::MODULO_EQUAL,
        TokenType::BANG,
        TokenType::BANG_EQUAL,
        TokenType::EQUAL,
        TokenType::EQUAL_EQUAL,
        TokenType::EQUAL_GREATER,
        TokenType::GREATER,
        TokenType::GREATER_EQUAL,
        TokenType::LESS,
        TokenType::LESS_EQUAL,
        TokenType::LESS_OR,
        TokenType::AND_AND,
        TokenType::OR_OR,
        TokenType::OR_GREATER,
        TokenType::DOT,
        TokenType::DOT_DOT_DOT,
        TokenType::QUESTION,
        TokenType::COLON,
        TokenType::IDENTIFIER,
        TokenType::NUMBER,
        TokenType::STRING,
        TokenType::AS,
        TokenType::ASSERT,
        TokenType::BREAK,
        TokenType::CONST,
        TokenType::CONTINUE,
        TokenType::DO,
        TokenType::ELSE,
        TokenType::FALSE,
        TokenType::FOR,
        TokenType::FOREACH,
        TokenType::IF,
        TokenType::IMPORT,
        TokenType::IN,
        TokenType::NIL,
        TokenType::OF,
        TokenType::PRINT,
        TokenType::RETURN,
        TokenType::TRUE,
        TokenType::VAR,
        TokenType::WHILE,
        TokenType::PASS,
        TokenType::ERROR,
        TokenType::EOF,
    ];
}

/// A scanned token: its kind, the span it covers in the source buffer and
/// the line it was found on.
///
/// Tokens are plain values; the parser copies them freely into its
/// `previous` / `current` window.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    /// For `ERROR` tokens this is the error message instead.
    pub lexeme: &'a str,

    /// Byte offset of the first character of the token.
    pub offset: usize,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Create a new Token with the given type, lexeme, offset and line.
    pub fn new(token_type: TokenType, lexeme: &'a str, offset: usize, line: usize) -> Self {
        trace!(
            "Creating new token: type={:?}, lexeme={}, offset={}, line={}",
            token_type,
            lexeme,
            offset,
            line
        );

        Self {
            token_type,
            lexeme,
            offset,
            line,
        }
    }

    /// Create a lexical error token carrying `message`.
    pub fn error(message: &'static str, offset: usize, line: usize) -> Self {
        Self::new(TokenType::ERROR, message, offset, line)
    }

    /// Length of the span in bytes. Error tokens report zero.
    pub fn len(&self) -> usize {
        match self.token_type {
            TokenType::ERROR => 0,
            _ => self.lexeme.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_type {
            TokenType::STRING => {
                let inner = self
                    .lexeme
                    .get(1..self.lexeme.len().saturating_sub(1))
                    .unwrap_or("");

                write!(f, "{:?} {} {}", self.token_type, self.lexeme, inner)
            }

            TokenType::NUMBER => {
                let n: f64 = self.lexeme.parse().unwrap_or(0.0);

                // 3 → "3.0", 3.14 → "3.14"
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    let mut buf = itoa::Buffer::new();
                    write!(
                        f,
                        "{:?} {} {}.0",
                        self.token_type,
                        self.lexeme,
                        buf.format(n as i64)
                    )
                } else {
                    write!(f, "{:?} {} {}", self.token_type, self.lexeme, n)
                }
            }

            _ => write!(f, "{:?} {} null", self.token_type, self.lexeme),
        }
    }
}

/// Anything that can hand out tokens one at a time.
///
/// `next_token` is total: lexical problems come back as `ERROR` tokens and,
/// once the input is exhausted, every further call yields `EOF`.
pub trait TokenSource<'a> {
    fn next_token(&mut self) -> Token<'a>;
}
