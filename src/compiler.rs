//! Statement layer and compilation entry points.
//!
//! Only the statements needed to drive the expression core live here:
//!
//! ```text
//! program     → declaration* EOF ;
//! declaration → varDecl | statement ;
//! varDecl     → "var" IDENT ( "=" expression )? ";" ;
//! statement   → printStmt | block | exprStmt ;
//! printStmt   → "print" expression ";" ;
//! block       → "{" declaration* "}" ;
//! exprStmt    → expression ";" ;
//! ```
//!
//! This layer owns the synchronization points: after each declaration, a
//! panicking parser skips to a statement boundary and is put back into
//! normal mode.

use log::{debug, info};

use crate::chunk::{Chunk, OpCode};
use crate::error::{Diagnostic, Result, ToyError};
use crate::object::StringInterner;
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::token::{TokenSource, TokenType};

/// Statement compiler wrapped around the expression [`Parser`].
pub struct Compiler<'src, 'out, S: TokenSource<'src>> {
    parser: Parser<'src, 'out, S>,
}

impl<'src, 'out, S: TokenSource<'src>> Compiler<'src, 'out, S> {
    pub fn new(parser: Parser<'src, 'out, S>) -> Self {
        Self { parser }
    }

    /// Compile declarations until end of input, then emit the final return.
    /// Returns whether any error was reported.
    pub fn program(mut self) -> bool {
        info!("Beginning compile phase");

        while !self.parser.matches(TokenType::EOF) {
            self.declaration();
        }

        self.parser.emit_op(OpCode::Return);
        self.parser.had_error()
    }

    /// Compile a single expression that must span the whole input.
    pub fn single_expression(mut self) -> bool {
        info!("Compiling single expression");

        self.parser.expression();
        self.parser
            .consume(TokenType::EOF, "Expected end of expression");

        self.parser.emit_op(OpCode::Return);
        self.parser.had_error()
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) {
        debug!("Entering declaration");

        if self.parser.matches(TokenType::VAR) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.parser.is_panicking() {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        self.parser
            .consume(TokenType::IDENTIFIER, "Expected variable name");
        let name = self.parser.previous();

        if self.parser.matches(TokenType::EQUAL) {
            self.parser.expression();
        } else {
            self.parser.emit_op(OpCode::Nil);
        }

        self.parser.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration",
        );

        if self.parser.scope_depth() > 0 {
            // Declared after the initializer: `var a = a;` reads the outer `a`.
            self.parser.declare_local(name);
        } else {
            let idx = self.parser.identifier_constant(name);
            self.parser.emit_op_with(OpCode::DefineGlobal, idx);
        }
    }

    // ──────────────────────── statement rules ─────────────────────

    fn statement(&mut self) {
        if self.parser.matches(TokenType::PRINT) {
            self.print_statement();
        } else if self.parser.matches(TokenType::LEFT_BRACE) {
            self.parser.begin_scope();
            self.block();
            self.parser.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.parser.expression();
        self.parser
            .consume(TokenType::SEMICOLON, "Expected ';' after value");
        self.parser.emit_op(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.parser.expression();
        self.parser
            .consume(TokenType::SEMICOLON, "Expected ';' after expression");
        self.parser.emit_op(OpCode::Pop);
    }

    fn block(&mut self) {
        while !self.parser.check(TokenType::RIGHT_BRACE) && !self.parser.check(TokenType::EOF) {
            self.declaration();
        }

        self.parser
            .consume(TokenType::RIGHT_BRACE, "Expected '}' after block");
    }

    /// Discards tokens until it thinks it is at a statement boundary, then
    /// leaves panic mode.
    fn synchronize(&mut self) {
        while !self.parser.check(TokenType::EOF) {
            if self.parser.previous().token_type == TokenType::SEMICOLON {
                break;
            }

            match self.parser.current().token_type {
                TokenType::VAR
                | TokenType::CONST
                | TokenType::PRINT
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::FOR
                | TokenType::FOREACH
                | TokenType::DO
                | TokenType::RETURN
                | TokenType::BREAK
                | TokenType::CONTINUE
                | TokenType::IMPORT
                | TokenType::ASSERT => break,
                _ => {}
            }

            self.parser.advance();
        }

        self.parser.recover();
    }
}

/// What the input is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Program,
    Expression,
}

/// Compile a whole program.  The chunk is only handed back when no error
/// was reported.
pub fn compile(source: &str, strings: &mut StringInterner) -> Result<Chunk> {
    run(source, strings, Unit::Program)
}

/// Compile `source` as one expression followed by end of input.
pub fn compile_expression(source: &str, strings: &mut StringInterner) -> Result<Chunk> {
    run(source, strings, Unit::Expression)
}

fn run(source: &str, strings: &mut StringInterner, unit: Unit) -> Result<Chunk> {
    let mut scanner = Scanner::new(source);
    let mut chunk = Chunk::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let parser = Parser::new(&mut scanner, &mut chunk, strings, &mut diagnostics);
    let compiler = Compiler::new(parser);

    let had_error = match unit {
        Unit::Program => compiler.program(),
        Unit::Expression => compiler.single_expression(),
    };

    if had_error {
        info!("Compilation failed with {} diagnostic(s)", diagnostics.len());

        return Err(ToyError::Compile(diagnostics));
    }

    info!("Compilation succeeded: {} bytes of code", chunk.len());

    Ok(chunk)
}
