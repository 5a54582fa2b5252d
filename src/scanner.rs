//! Module `scanner` implements a one‑pass, on‑demand lexer for the Toy language.
//!
//! It hands out one [`Token`] per call, skipping whitespace and comments, and
//! never fails: lexical problems come back as `ERROR` tokens whose lexeme is
//! the message, so the parser decides how to report them.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input buffer.
//!
//! - `impl TokenSource<'a> for Scanner<'a>`
//!   `next_token()` is total and keeps returning `EOF` once the input is done.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields every token up to and including a single `EOF`, then `None`.
//!
//! # Token Recognition
//!
//! - Single‑character punctuators: `( ) { } [ ] ; , ? :`.
//! - One‑or‑two character operators: `+ += ++`, `- -= --`, `* *=`, `/ /=`,
//!   `% %=`, `! !=`, `= == =>`, `> >=`, `< <= <|`.
//! - Doubles only: `&&`, `||`, plus the pipe `|>`.
//! - Single or triple: `.` and `...`.
//! - String literals: `"` … `"`, multi‑line allowed, no escape processing.
//! - Numeric literals: integer with an optional fractional part.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a
//!   perfect‑hash `KEYWORDS` map.
//! - Comments: `//` to end of line (skipped with `memchr`) and `/* … */`.

use crate::token::{Token, TokenSource, TokenType};
use log::{debug, info, trace};
use memchr::{memchr, memmem};
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"as"       => TokenType::AS,
    b"assert"   => TokenType::ASSERT,
    b"break"    => TokenType::BREAK,
    b"const"    => TokenType::CONST,
    b"continue" => TokenType::CONTINUE,
    b"do"       => TokenType::DO,
    b"else"     => TokenType::ELSE,
    b"false"    => TokenType::FALSE,
    b"for"      => TokenType::FOR,
    b"foreach"  => TokenType::FOREACH,
    b"if"       => TokenType::IF,
    b"import"   => TokenType::IMPORT,
    b"in"       => TokenType::IN,
    b"nil"      => TokenType::NIL,
    b"of"       => TokenType::OF,
    b"print"    => TokenType::PRINT,
    b"return"   => TokenType::RETURN,
    b"true"     => TokenType::TRUE,
    b"var"      => TokenType::VAR,
    b"while"    => TokenType::WHILE,
};

/// A single pass **scanner / lexer** that converts source text into
/// [`Token`]s on demand.  The lifetime `'a` ties every emitted token’s
/// `lexeme` slice back to the original source buffer.
pub struct Scanner<'a> {
    src: &'a str,    // entire source text
    bytes: &'a [u8], // same buffer, byte view
    start: usize,    // index of the *first* byte of the current lexeme
    curr: usize,     // index *one past* the last byte examined
    line: usize,     // 1‑based line counter (\n increments)
    done: bool,      // EOF already handed out through the iterator
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            done: false,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    /// Are we at (or past) the end of input?
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.bytes.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.bytes.get(self.curr).copied().unwrap_or(0)
    }

    /// Peek one byte beyond [`peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes.get(self.curr + 1).copied().unwrap_or(0)
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn make_token(&self, token_type: TokenType) -> Token<'a> {
        Token::new(
            token_type,
            &self.src[self.start..self.curr],
            self.start,
            self.line,
        )
    }

    #[inline(always)]
    fn error_token(&self, message: &'static str) -> Token<'a> {
        debug!("Lexical error on line {}: {}", self.line, message);

        Token::error(message, self.start, self.line)
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Skip whitespace and comments.  An unterminated block comment is the
    /// only failure and is returned as an error token.
    fn skip_trivia(&mut self) -> Option<Token<'a>> {
        loop {
            match self.peek() {
                b' ' | b'\r' | b'\t' => {
                    self.advance();
                }

                b'\n' => {
                    self.line += 1;
                    self.advance();
                }

                b'/' if self.peek_next() == b'/' => {
                    // Fast‑forward to the next newline; the newline itself is
                    // left for the arm above so the line count stays right.
                    match memchr(b'\n', &self.bytes[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.bytes.len(),
                    }
                }

                b'/' if self.peek_next() == b'*' => {
                    self.start = self.curr;
                    let body = &self.bytes[self.curr + 2..];

                    match memmem::find(body, b"*/") {
                        Some(pos) => {
                            self.line += body[..pos].iter().filter(|&&b| b == b'\n').count();
                            self.curr += 2 + pos + 2;
                        }
                        None => {
                            self.line += body.iter().filter(|&&b| b == b'\n').count();
                            self.curr = self.bytes.len();

                            return Some(self.error_token("Unterminated comment."));
                        }
                    }
                }

                _ => return None,
            }
        }
    }

    /// Scan a *single* token starting at `self.curr`.
    fn scan_token(&mut self) -> Token<'a> {
        if let Some(error) = self.skip_trivia() {
            return error;
        }

        self.start = self.curr;

        if self.is_at_end() {
            return Token::new(TokenType::EOF, "", self.curr, self.line);
        }

        let b = self.advance();

        let tt = match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b'[' => TokenType::LEFT_BRACKET,
            b']' => TokenType::RIGHT_BRACKET,
            b';' => TokenType::SEMICOLON,
            b',' => TokenType::COMMA,
            b'?' => TokenType::QUESTION,
            b':' => TokenType::COLON,

            // ── one or two character operators ───────────────────────────
            b'+' => {
                if self.match_byte(b'=') {
                    TokenType::PLUS_EQUAL
                } else if self.match_byte(b'+') {
                    TokenType::PLUS_PLUS
                } else {
                    TokenType::PLUS
                }
            }

            b'-' => {
                if self.match_byte(b'=') {
                    TokenType::MINUS_EQUAL
                } else if self.match_byte(b'-') {
                    TokenType::MINUS_MINUS
                } else {
                    TokenType::MINUS
                }
            }

            b'*' => {
                if self.match_byte(b'=') {
                    TokenType::STAR_EQUAL
                } else {
                    TokenType::STAR
                }
            }

            b'/' => {
                if self.match_byte(b'=') {
                    TokenType::SLASH_EQUAL
                } else {
                    TokenType::SLASH
                }
            }

            b'%' => {
                if self.match_byte(b'=') {
                    TokenType::MODULO_EQUAL
                } else {
                    TokenType::MODULO
                }
            }

            b'!' => {
                if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                }
            }

            b'=' => {
                if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else if self.match_byte(b'>') {
                    TokenType::EQUAL_GREATER
                } else {
                    TokenType::EQUAL
                }
            }

            b'>' => {
                if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                }
            }

            b'<' => {
                if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else if self.match_byte(b'|') {
                    TokenType::LESS_OR
                } else {
                    TokenType::LESS
                }
            }

            // ── doubles only ─────────────────────────────────────────────
            b'&' => {
                if !self.match_byte(b'&') {
                    return self.error_token("Unexpected character: expected '&&'");
                }

                TokenType::AND_AND
            }

            b'|' => {
                if self.match_byte(b'|') {
                    TokenType::OR_OR
                } else if self.match_byte(b'>') {
                    TokenType::OR_GREATER
                } else {
                    return self.error_token("Unexpected character: expected '||' or '|>'");
                }
            }

            // ── single or triple ─────────────────────────────────────────
            b'.' => {
                if self.peek() == b'.' && self.peek_next() == b'.' {
                    self.curr += 2;
                    TokenType::DOT_DOT_DOT
                } else {
                    TokenType::DOT
                }
            }

            b'"' => return self.string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            // ── unexpected character ─────────────────────────────────────
            _ => {
                // Never leave `curr` inside a multi‑byte character.
                while self.peek() & 0xC0 == 0x80 {
                    self.advance();
                }

                return self.error_token("Unexpected character");
            }
        };

        self.make_token(tt)
    }

    /// Scan a double‑quoted string literal.  The lexeme keeps both quotes.
    fn string(&mut self) -> Token<'a> {
        match memchr(b'"', &self.bytes[self.curr..]) {
            Some(pos) => {
                let body = &self.bytes[self.curr..self.curr + pos];
                self.line += body.iter().filter(|&&b| b == b'\n').count();
                self.curr += pos + 1; // include closing quote

                self.make_token(TokenType::STRING)
            }

            None => {
                let body = &self.bytes[self.curr..];
                self.line += body.iter().filter(|&&b| b == b'\n').count();
                self.curr = self.bytes.len();

                self.error_token("Unterminated string.")
            }
        }
    }

    /// Scan a numeric literal (`123`, `3.14`).  Fractions are optional.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        TokenType::NUMBER
    }

    /// Scan an identifier and decide whether it is a **keyword**.
    fn identifier(&mut self) -> TokenType {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        KEYWORDS
            .get(&self.bytes[self.start..self.curr])
            .copied()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> TokenSource<'a> for Scanner<'a> {
    fn next_token(&mut self) -> Token<'a> {
        let token = self.scan_token();

        trace!("Scanned {:?} on line {}", token.token_type, token.line);

        token
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.next_token();

        if token.token_type == TokenType::EOF {
            self.done = true;
        }

        Some(token)
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
