use logos::Logos;
use strum_macros::EnumIter;

pub use self::TokenKind::*;

/// Tokens of the SQL dialect: `SELECT` and `UPDATE` statements over numeric
/// and identifier primaries. String literals are not part of this core.
#[allow(non_camel_case_types)]
#[derive(Logos, EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Error,

    EOI,

    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    #[regex(r"--[^\n]*", logos::skip)]
    Comment,

    #[regex(r"[_a-zA-Z][_a-zA-Z0-9]*")]
    Ident,

    #[regex(r"[0-9]+")]
    LiteralInteger,

    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    #[regex(r"([0-9]*\.[0-9]+([eE][+-]?[0-9]+)?)|([0-9]+\.[0-9]*([eE][+-]?[0-9]+)?)")]
    LiteralFloat,

    // Symbols
    #[token("=")]
    Eq,
    #[token("<>")]
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Multiply,
    #[token("/")]
    Divide,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    // Keywords
    #[token("SELECT", ignore(ascii_case))]
    SELECT,
    #[token("FROM", ignore(ascii_case))]
    FROM,
    #[token("WHERE", ignore(ascii_case))]
    WHERE,
    #[token("AS", ignore(ascii_case))]
    AS,
    #[token("UPDATE", ignore(ascii_case))]
    UPDATE,
    #[token("SET", ignore(ascii_case))]
    SET,
    #[token("AND", ignore(ascii_case))]
    AND,
    #[token("OR", ignore(ascii_case))]
    OR,
    #[token("NOT", ignore(ascii_case))]
    NOT,
    #[token("IS", ignore(ascii_case))]
    IS,
    #[token("NULL", ignore(ascii_case))]
    NULL,
}

impl TokenKind {
    pub fn is_literal(&self) -> bool {
        matches!(self, LiteralInteger | LiteralFloat)
    }

    /// 关键字
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            SELECT | FROM | WHERE | AS | UPDATE | SET | AND | OR | NOT | IS | NULL
        )
    }
}
