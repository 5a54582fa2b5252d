/*!
Single-pass expression compiler
===============================

The [`Parser`] pulls tokens from a [`TokenSource`] and writes bytecode into a
[`Chunk`] as it goes; no syntax tree is built.  Expressions are parsed with
**Pratt (precedence‑climbing)**: every token kind maps to a [`ParseRule`](crate::rules::ParseRule) in
[`crate::rules`], and [`Parser::parse_precedence`] is the single entry point
all expression parsing funnels through.

```text
expression → assignment ;
assignment → IDENT "=" assignment | equality ;
equality   → comparison ( ( "!=" | "==" ) comparison )* ;
comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term       → factor ( ( "-" | "+" ) factor )* ;
factor     → unary ( ( "/" | "*" ) unary )* ;
unary      → ( "!" | "-" ) unary | primary ;
primary    → NUMBER | STRING | "true" | "false" | "nil"
           | IDENT | "(" expression ")" ;
```

### Errors

Problems are reported to a [`DiagnosticSink`] and parsing continues.  The
first report moves the parser into [`Mode::Panicking`], which silences every
later report until the statement layer reaches a synchronization point and
calls [`Parser::recover`].  `had_error` is sticky for the whole unit.

### Logging Policy

| Location                  | Level   | Purpose                              |
|---------------------------|---------|--------------------------------------|
| `Parser::new`             | `info`  | Lifecycle milestones.                |
| grammar handlers, emitter | `debug` | Descent into productions, opcodes.   |
| suppressed diagnostics    | `debug` | Cascades swallowed by panic mode.    |
*/

use log::{debug, info, warn};

use crate::chunk::{Chunk, OpCode, CONSTANTS_MAX};
use crate::error::{Diagnostic, DiagnosticSink, ErrorKind, Location};
use crate::object::StringInterner;
use crate::rules::{get_rule, InfixRule, Precedence, PrefixRule};
use crate::token::{Token, TokenSource, TokenType};
use crate::value::Value;

/// Largest number of locals addressable by a one-byte slot operand.
pub const LOCALS_MAX: usize = u8::MAX as usize + 1;

/// Deepest nesting of `parse_precedence` calls before the parser gives up
/// on an expression.
pub const EXPRESSION_DEPTH_MAX: usize = 256;

/// Error-recovery state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Panicking,
}

/// A local binding: its name and the scope depth it was declared at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Local<'src> {
    pub name: Token<'src>,
    pub depth: usize,
}

/// Parser state for one compilation unit.
pub struct Parser<'src, 'out, S: TokenSource<'src>> {
    scanner: &'out mut S,
    chunk: &'out mut Chunk,
    strings: &'out mut StringInterner,
    diagnostics: &'out mut dyn DiagnosticSink,

    current: Token<'src>,
    previous: Token<'src>,

    locals: Vec<Local<'src>>,
    scope_depth: usize,
    expression_depth: usize,

    had_error: bool,
    mode: Mode,
}

impl<'src, 'out, S: TokenSource<'src>> Parser<'src, 'out, S> {
    /// Construct a parser and prime the lookahead with the first token.
    pub fn new(
        scanner: &'out mut S,
        chunk: &'out mut Chunk,
        strings: &'out mut StringInterner,
        diagnostics: &'out mut dyn DiagnosticSink,
    ) -> Self {
        info!("Parser created");

        let start = Token::new(TokenType::EOF, "", 0, 1);

        let mut parser = Self {
            scanner,
            chunk,
            strings,
            diagnostics,
            current: start,
            previous: start,
            locals: Vec::new(),
            scope_depth: 0,
            expression_depth: 0,
            had_error: false,
            mode: Mode::Normal,
        };

        parser.advance();
        parser
    }

    // ───────────────────────── state inspection ───────────────────

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_panicking(&self) -> bool {
        self.mode == Mode::Panicking
    }

    /// Leave panic mode.  Only the statement layer calls this, at a
    /// synchronization point.  Returns whether the parser was panicking.
    /// `had_error` is untouched.
    pub fn recover(&mut self) -> bool {
        let was_panicking = self.is_panicking();

        if was_panicking {
            debug!("Recovering at line {}", self.current.line);
        }

        self.mode = Mode::Normal;
        was_panicking
    }

    pub fn current(&self) -> Token<'src> {
        self.current
    }

    pub fn previous(&self) -> Token<'src> {
        self.previous
    }

    pub fn scope_depth(&self) -> usize {
        self.scope_depth
    }

    pub fn locals(&self) -> &[Local<'src>] {
        &self.locals
    }

    // ───────────────────────── token cursor ───────────────────────

    /// Shift `current` into `previous` and pull the next usable token,
    /// reporting and skipping lexical errors on the way.
    pub fn advance(&mut self) {
        self.previous = self.current;

        loop {
            self.current = self.scanner.next_token();

            if self.current.token_type != TokenType::ERROR {
                break;
            }

            let token = self.current;
            self.error_at(token, ErrorKind::Lexical, token.lexeme);
        }
    }

    /// Advance past `kind`, or report `message` at the current token and
    /// stay put.
    pub fn consume(&mut self, kind: TokenType, message: &str) {
        if self.check(kind) {
            self.advance();
            return;
        }

        debug!(
            "consume: expected {:?}, found {:?}",
            kind, self.current.token_type
        );

        self.error_at_current(ErrorKind::Syntax, message);
    }

    #[inline(always)]
    pub fn check(&self, kind: TokenType) -> bool {
        self.current.token_type == kind
    }

    #[inline(always)]
    pub fn matches(&mut self, kind: TokenType) -> bool {
        if !self.check(kind) {
            return false;
        }

        self.advance();
        true
    }

    // ─────────────────────── precedence climbing ──────────────────

    /// Parse a full expression at the loosest precedence.
    pub fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    /// Parse one expression whose outermost operator binds at least as
    /// tightly as `min`, emitting its bytecode.
    pub fn parse_precedence(&mut self, min: Precedence) {
        if self.expression_depth >= EXPRESSION_DEPTH_MAX {
            debug!("Expression depth limit {} reached", EXPRESSION_DEPTH_MAX);

            self.error(ErrorKind::Semantic, "Expression nested too deeply");
            return;
        }

        self.expression_depth += 1;
        self.climb(min);
        self.expression_depth -= 1;
    }

    fn climb(&mut self, min: Precedence) {
        self.advance();

        let Some(prefix) = get_rule(self.previous.token_type).prefix else {
            self.error(ErrorKind::Syntax, "Expected expression");
            return;
        };

        let can_assign = min <= Precedence::Assignment;
        self.prefix(prefix, can_assign);

        loop {
            let rule = get_rule(self.current.token_type);

            let Some(infix) = rule.infix else { break };

            if rule.precedence < min {
                break;
            }

            self.advance();
            self.infix(infix, can_assign);
        }

        // An `=` left over here was not taken by any variable handler, so
        // whatever precedes it is not assignable.
        if can_assign && self.matches(TokenType::EQUAL) {
            self.error(ErrorKind::Semantic, "Invalid assignment target");
        }
    }

    fn prefix(&mut self, rule: PrefixRule, can_assign: bool) {
        match rule {
            PrefixRule::Grouping => self.grouping(),
            PrefixRule::Unary => self.unary(),
            PrefixRule::Literal => self.literal(),
            PrefixRule::Number => self.number(),
            PrefixRule::String => self.string(),
            PrefixRule::Variable => self.variable(can_assign),
        }
    }

    fn infix(&mut self, rule: InfixRule, _can_assign: bool) {
        match rule {
            InfixRule::Binary => self.binary(),
        }
    }

    // ───────────────────────── expression handlers ────────────────

    fn literal(&mut self) {
        match self.previous.token_type {
            TokenType::TRUE => self.emit_op(OpCode::True),
            TokenType::FALSE => self.emit_op(OpCode::False),
            TokenType::NIL => self.emit_op(OpCode::Nil),
            other => warn!("literal handler invoked for {:?}", other),
        }
    }

    fn number(&mut self) {
        let lexeme = self.previous.lexeme;

        match lexeme.parse::<f64>() {
            Ok(n) => self.emit_constant(Value::Number(n)),
            Err(e) => {
                debug!("Number parse failed for {:?}: {}", lexeme, e);
                self.error(ErrorKind::Syntax, "Invalid number literal");
            }
        }
    }

    fn string(&mut self) {
        // Drop the delimiters; escape sequences are passed through untouched.
        let lexeme = self.previous.lexeme;
        let contents = lexeme.get(1..lexeme.len().saturating_sub(1)).unwrap_or("");

        let handle = self.strings.intern(contents);
        self.emit_constant(Value::String(handle));
    }

    fn grouping(&mut self) {
        debug!("Entering grouping");

        self.expression();
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression");
    }

    fn unary(&mut self) {
        let operator = self.previous.token_type;

        self.parse_precedence(Precedence::Unary);

        match operator {
            TokenType::MINUS => self.emit_op(OpCode::Negate),
            TokenType::BANG => self.emit_op(OpCode::Not),
            other => warn!("unary handler invoked for {:?}", other),
        }
    }

    fn binary(&mut self) {
        let operator = self.previous.token_type;
        let rule = get_rule(operator);

        // Right operand one level tighter: left associative.
        self.parse_precedence(rule.precedence.next());

        match operator {
            // comparisons
            TokenType::EQUAL_EQUAL => self.emit_op(OpCode::Equal),
            TokenType::BANG_EQUAL => self.emit_ops(OpCode::Equal, OpCode::Not),
            TokenType::GREATER => self.emit_op(OpCode::Greater),
            TokenType::GREATER_EQUAL => self.emit_ops(OpCode::Less, OpCode::Not),
            TokenType::LESS => self.emit_op(OpCode::Less),
            TokenType::LESS_EQUAL => self.emit_ops(OpCode::Greater, OpCode::Not),

            // arithmetic
            TokenType::PLUS => self.emit_op(OpCode::Add),
            TokenType::MINUS => self.emit_op(OpCode::Subtract),
            TokenType::STAR => self.emit_op(OpCode::Multiply),
            TokenType::SLASH => self.emit_op(OpCode::Divide),

            other => warn!("binary handler invoked for {:?}", other),
        }
    }

    fn variable(&mut self, can_assign: bool) {
        let name = self.previous;
        self.named_variable(name, can_assign);
    }

    fn named_variable(&mut self, name: Token<'src>, can_assign: bool) {
        let (get, set, arg) = match self.resolve_local(&name) {
            Some(slot) => (OpCode::GetLocal, OpCode::SetLocal, slot),
            None => {
                let idx = self.identifier_constant(name);
                (OpCode::GetGlobal, OpCode::SetGlobal, idx)
            }
        };

        if can_assign && self.matches(TokenType::EQUAL) {
            debug!("Assignment to '{}'", name.lexeme);

            self.expression();
            self.emit_op_with(set, arg);
        } else {
            self.emit_op_with(get, arg);
        }
    }

    // ───────────────────────── scopes & locals ────────────────────

    pub fn begin_scope(&mut self) {
        self.scope_depth += 1;

        debug!("Entered scope depth {}", self.scope_depth);
    }

    /// Close the innermost scope, popping its locals off the stack.
    /// Returns how many locals were discarded.
    pub fn end_scope(&mut self) -> usize {
        if self.scope_depth == 0 {
            warn!("end_scope called at global scope");
            return 0;
        }

        self.scope_depth -= 1;

        let keep = self
            .locals
            .iter()
            .rposition(|local| local.depth <= self.scope_depth)
            .map_or(0, |i| i + 1);
        let popped = self.locals.len() - keep;

        self.locals.truncate(keep);

        for _ in 0..popped {
            self.emit_op(OpCode::Pop);
        }

        debug!(
            "Left scope, depth now {}, {} local(s) popped",
            self.scope_depth, popped
        );

        popped
    }

    /// Add `name` to the innermost scope.  A duplicate within the same
    /// scope, or running out of slots, is reported and nothing is added.
    pub fn declare_local(&mut self, name: Token<'src>) -> bool {
        let duplicate = self
            .locals
            .iter()
            .rev()
            .take_while(|local| local.depth >= self.scope_depth)
            .any(|local| local.name.lexeme == name.lexeme);

        if duplicate {
            self.error_at(
                name,
                ErrorKind::Semantic,
                "A variable with this name was already declared in this scope",
            );
            return false;
        }

        if self.locals.len() >= LOCALS_MAX {
            self.error_at(name, ErrorKind::Semantic, "Too many local variables in scope");
            return false;
        }

        debug!(
            "Declared local '{}' in slot {} at depth {}",
            name.lexeme,
            self.locals.len(),
            self.scope_depth
        );

        self.locals.push(Local {
            name,
            depth: self.scope_depth,
        });

        true
    }

    /// Slot of the innermost local called `name`, if any.
    pub fn resolve_local(&self, name: &Token<'src>) -> Option<u8> {
        self.locals
            .iter()
            .rposition(|local| local.name.lexeme == name.lexeme)
            .and_then(|slot| u8::try_from(slot).ok())
    }

    // ───────────────────────── emitter ────────────────────────────

    pub fn emit_op(&mut self, op: OpCode) {
        debug!("emit {}", op.name());

        self.chunk.write(op, self.previous.line);
    }

    pub fn emit_ops(&mut self, first: OpCode, second: OpCode) {
        self.emit_op(first);
        self.emit_op(second);
    }

    pub fn emit_op_with(&mut self, op: OpCode, operand: u8) {
        debug!("emit {} {}", op.name(), operand);

        self.chunk
            .write_with_operand(op, operand, self.previous.line);
    }

    pub fn emit_constant(&mut self, value: Value) {
        let idx = self.make_constant(value);
        self.emit_op_with(OpCode::Constant, idx);
    }

    /// Add `value` to the pool, reporting when its index does not fit an
    /// operand.
    pub fn make_constant(&mut self, value: Value) -> u8 {
        let idx = self.chunk.add_constant(value);

        match u8::try_from(idx) {
            Ok(idx) => idx,
            Err(_) => {
                debug!("Constant pool full ({} max)", CONSTANTS_MAX);

                self.error(ErrorKind::Semantic, "Too many constants in one chunk");
                0
            }
        }
    }

    /// Intern an identifier's name into the constant pool for global access.
    pub fn identifier_constant(&mut self, name: Token<'src>) -> u8 {
        let handle = self.strings.intern(name.lexeme);
        self.make_constant(Value::String(handle))
    }

    // ───────────────────────── error reporting ────────────────────

    pub fn error(&mut self, kind: ErrorKind, message: &str) {
        let token = self.previous;
        self.error_at(token, kind, message);
    }

    pub fn error_at_current(&mut self, kind: ErrorKind, message: &str) {
        let token = self.current;
        self.error_at(token, kind, message);
    }

    fn error_at(&mut self, token: Token<'src>, kind: ErrorKind, message: &str) {
        self.had_error = true;

        if self.mode == Mode::Panicking {
            debug!("Suppressed while panicking: line {}: {}", token.line, message);
            return;
        }

        self.mode = Mode::Panicking;

        let location = match token.token_type {
            TokenType::EOF => Location::End,
            TokenType::ERROR => Location::Unknown,
            _ => Location::At(token.lexeme.to_owned()),
        };

        self.diagnostics
            .report(Diagnostic::new(kind, token.line, location, message));
    }
}
