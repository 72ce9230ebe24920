use rust_decimal::Decimal;
use serde::Serialize;

use crate::ast::function::FunctionCall;
use crate::lexer;

/// Character range of a token in the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub pos: usize,
    pub length: usize,
}

impl Span {
    pub fn new(pos: usize, length: usize) -> Self {
        Span { pos, length }
    }

    pub fn between(start: usize, end: usize) -> Self {
        Span {
            pos: start,
            length: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> usize {
        self.pos + self.length
    }

    pub fn contains(&self, other: &Span) -> bool {
        other.pos >= self.pos && other.end() <= self.end()
    }
}

/// Operators, symbolic and keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    /// Binary subtraction or unary minus.
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
    Not,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
        }
    }

    /// Symbolic binary operators, longest first so `<>` wins over `<`.
    pub(crate) const SYMBOLS: [Operator; 10] = [
        Operator::NotEqual,
        Operator::LessOrEqual,
        Operator::GreaterOrEqual,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Equal,
        Operator::Less,
        Operator::Greater,
    ];

    pub fn is_keyword(&self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

/// Field-less discriminant of [`TokenKind`], plus the parameter-only
/// `Query` and `Period` types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    OpenBrace,
    CloseBrace,
    Operator,
    Number,
    Macro,
    UserMacro,
    LldMacro,
    String,
    FunctionIdMacro,
    Function,
    Query,
    Period,
    Expression,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::OpenBrace => "open_brace",
            TokenType::CloseBrace => "close_brace",
            TokenType::Operator => "operator",
            TokenType::Number => "number",
            TokenType::Macro => "macro",
            TokenType::UserMacro => "user_macro",
            TokenType::LldMacro => "lld_macro",
            TokenType::String => "string",
            TokenType::FunctionIdMacro => "function_id_macro",
            TokenType::Function => "function",
            TokenType::Query => "query",
            TokenType::Period => "period",
            TokenType::Expression => "expression",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `(`
    OpenBrace,

    /// `)`
    CloseBrace,

    /// # Examples
    /// ```text
    /// +  -  *  /  =  <>  <  <=  >  >=
    /// and  or  not
    /// ```
    Operator(Operator),

    /// # Examples
    /// ```text
    /// 42
    /// .5
    /// 12.5m
    /// 1K
    /// 0x1F
    /// ```
    Number { suffix: Option<char> },

    /// Built-in macro
    ///
    /// # Examples
    /// ```text
    /// {TRIGGER.VALUE}
    /// ```
    Macro,

    /// # Examples
    /// ```text
    /// {$THRESHOLD}
    /// {$THRESHOLD:"eth0"}
    /// {$THRESHOLD: eth0}
    /// ```
    UserMacro,

    /// Low-level discovery macro, optionally with a function applied.
    ///
    /// # Examples
    /// ```text
    /// {#IFNAME}
    /// {{#IFNAME}.regsub("^([a-z]+)", \1)}
    /// ```
    LldMacro,

    /// Double-quoted string, escapes `\"` and `\\`
    String,

    /// Back-reference into a flat function list.
    ///
    /// # Examples
    /// ```text
    /// {0}
    /// {12345}
    /// ```
    FunctionIdMacro { index: usize },

    /// # Examples
    /// ```text
    /// last(/host/key)
    /// abs(last(/host/key) - 1)
    /// {host:key.last(0)}
    /// ```
    Function(FunctionCall),

    /// Math function argument; owns the tokens of one nested expression.
    Expression(Vec<Token>),
}

/// One lexical unit of an expression with its source span and matched text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub span: Span,
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Token {
            span,
            text: text.into(),
            kind,
        }
    }

    pub fn token_type(&self) -> TokenType {
        match &self.kind {
            TokenKind::OpenBrace => TokenType::OpenBrace,
            TokenKind::CloseBrace => TokenType::CloseBrace,
            TokenKind::Operator(_) => TokenType::Operator,
            TokenKind::Number { .. } => TokenType::Number,
            TokenKind::Macro => TokenType::Macro,
            TokenKind::UserMacro => TokenType::UserMacro,
            TokenKind::LldMacro => TokenType::LldMacro,
            TokenKind::String => TokenType::String,
            TokenKind::FunctionIdMacro { .. } => TokenType::FunctionIdMacro,
            TokenKind::Function(_) => TokenType::Function,
            TokenKind::Expression(_) => TokenType::Expression,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<&FunctionCall> {
        match &self.kind {
            TokenKind::Function(call) => Some(call),
            _ => None,
        }
    }

    /// Numeric value of a `Number` token, suffix applied.
    pub fn number_value(&self) -> Option<Decimal> {
        match self.kind {
            TokenKind::Number { .. } => lexer::number_value(&self.text),
            _ => None,
        }
    }

    /// Unescaped content of a `String` token.
    pub fn string_value(&self) -> Option<String> {
        match self.kind {
            TokenKind::String => Some(lexer::unquote_string(&self.text)),
            _ => None,
        }
    }
}
