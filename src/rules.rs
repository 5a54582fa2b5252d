//! The Pratt table: for every token kind, which prefix and infix handler
//! applies and how tightly the infix form binds.
//!
//! Adding an operator means adding a row here and a handler in the parser;
//! the precedence-climbing loop itself never changes.

use crate::token::TokenType;

/// Binding strength, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    None,
    Assignment, // =
    Or,         // ||
    And,        // &&
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Call,       // . ()
    Primary,
}

impl Precedence {
    /// One level tighter.  `Primary` is already the tightest.
    pub const fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

/// Handlers that can start an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixRule {
    Grouping,
    Unary,
    Literal,
    Number,
    String,
    Variable,
}

/// Handlers that continue an expression after its left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixRule {
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRule {
    pub prefix: Option<PrefixRule>,
    pub infix: Option<InfixRule>,
    pub precedence: Precedence,
}

const fn rule(
    prefix: Option<PrefixRule>,
    infix: Option<InfixRule>,
    precedence: Precedence,
) -> ParseRule {
    ParseRule {
        prefix,
        infix,
        precedence,
    }
}

const NONE: ParseRule = rule(None, None, Precedence::None);

/// Rule lookup.  Total over `TokenType`: kinds that neither start nor
/// continue an expression get `NONE`.
#[rustfmt::skip]
pub const fn get_rule(kind: TokenType) -> ParseRule {
    use InfixRule as I;
    use PrefixRule as P;
    use Precedence as Prec;

    match kind {
        // single character tokens
        TokenType::LEFT_PAREN    => rule(Some(P::Grouping), None,          Prec::None),
        TokenType::RIGHT_PAREN   => NONE,
        TokenType::LEFT_BRACE    => NONE,
        TokenType::RIGHT_BRACE   => NONE,
        TokenType::LEFT_BRACKET  => NONE,
        TokenType::RIGHT_BRACKET => NONE,
        TokenType::SEMICOLON     => NONE,
        TokenType::COMMA         => NONE,

        // one or two character tokens
        TokenType::PLUS          => rule(None,              Some(I::Binary), Prec::Term),
        TokenType::PLUS_EQUAL    => NONE,
        TokenType::PLUS_PLUS     => NONE,
        TokenType::MINUS         => rule(Some(P::Unary),    Some(I::Binary), Prec::Term),
        TokenType::MINUS_EQUAL   => NONE,
        TokenType::MINUS_MINUS   => NONE,
        TokenType::STAR          => rule(None,              Some(I::Binary), Prec::Factor),
        TokenType::STAR_EQUAL    => NONE,
        TokenType::SLASH         => rule(None,              Some(I::Binary), Prec::Factor),
        TokenType::SLASH_EQUAL   => NONE,
        TokenType::MODULO        => NONE,
        TokenType::MODULO_EQUAL  => NONE,
        TokenType::BANG          => rule(Some(P::Unary),    None,            Prec::None),
        TokenType::BANG_EQUAL    => rule(None,              Some(I::Binary), Prec::Equality),
        TokenType::EQUAL         => NONE,
        TokenType::EQUAL_EQUAL   => rule(None,              Some(I::Binary), Prec::Equality),
        TokenType::EQUAL_GREATER => NONE,
        TokenType::GREATER       => rule(None,              Some(I::Binary), Prec::Comparison),
        TokenType::GREATER_EQUAL => rule(None,              Some(I::Binary), Prec::Comparison),
        TokenType::LESS          => rule(None,              Some(I::Binary), Prec::Comparison),
        TokenType::LESS_EQUAL    => rule(None,              Some(I::Binary), Prec::Comparison),
        TokenType::LESS_OR       => NONE,
        TokenType::AND_AND       => NONE,
        TokenType::OR_OR         => NONE,
        TokenType::OR_GREATER    => NONE,
        TokenType::DOT           => NONE,
        TokenType::DOT_DOT_DOT   => NONE,
        TokenType::QUESTION      => NONE,
        TokenType::COLON         => NONE,

        // literals
        TokenType::IDENTIFIER    => rule(Some(P::Variable), None,            Prec::None),
        TokenType::NUMBER        => rule(Some(P::Number),   None,            Prec::None),
        TokenType::STRING        => rule(Some(P::String),   None,            Prec::None),

        // keywords
        TokenType::AS            => NONE,
        TokenType::ASSERT        => NONE,
        TokenType::BREAK         => NONE,
        TokenType::CONST         => NONE,
        TokenType::CONTINUE      => NONE,
        TokenType::DO            => NONE,
        TokenType::ELSE          => NONE,
        TokenType::FALSE         => rule(Some(P::Literal),  None,            Prec::None),
        TokenType::FOR           => NONE,
        TokenType::FOREACH       => NONE,
        TokenType::IF            => NONE,
        TokenType::IMPORT        => NONE,
        TokenType::IN            => NONE,
        TokenType::NIL           => rule(Some(P::Literal),  None,            Prec::None),
        TokenType::OF            => NONE,
        TokenType::PRINT         => NONE,
        TokenType::RETURN        => NONE,
        TokenType::TRUE          => rule(Some(P::Literal),  None,            Prec::None),
        TokenType::VAR           => NONE,
        TokenType::WHILE         => NONE,

        // meta
        TokenType::PASS          => NONE,
        TokenType::ERROR         => NONE,
        TokenType::EOF           => NONE,
    }
}
