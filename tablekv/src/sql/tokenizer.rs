use std::ops::Range;

use logos::{Lexer, Logos};
use strum::IntoEnumIterator;

use crate::error::{CResult, Error};
use crate::sql::token_kind::TokenKind;

/// A token over the original statement text.
#[derive(Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub source: &'a str,
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl<'a> Token<'a> {
    fn new_eoi(source: &'a str) -> Self {
        Token { source, kind: TokenKind::EOI, span: source.len()..source.len() }
    }

    /// The statement text covered by this token.
    pub fn text(&self) -> &'a str {
        &self.source[self.span.clone()]
    }
}

impl std::fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.span)
    }
}

pub struct Tokenizer<'a> {
    source: &'a str,
    lexer: Lexer<'a, TokenKind>,
    eoi: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer { source, lexer: TokenKind::lexer(source), eoi: false }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = CResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lexer.next() {
            Some(Err(_)) => Some(Err(Error::parse(
                self.lexer.span().start,
                format!("unrecognized character {:?}", self.lexer.slice()),
            ))),
            Some(Ok(kind)) => Some(Ok(Token {
                source: self.source,
                kind,
                span: self.lexer.span(),
            })),
            None if !self.eoi => {
                self.eoi = true;
                Some(Ok(Token::new_eoi(self.source)))
            }
            None => None,
        }
    }
}

/// Tokenizes a whole statement. The result always ends with the EOI marker,
/// which the parser relies on when reporting truncated input.
pub fn tokenize_sql(sql: &str) -> CResult<Vec<Token<'_>>> {
    Tokenizer::new(sql).collect()
}

/// Every keyword of the dialect, lowercased.
pub fn all_keywords() -> Vec<String> {
    TokenKind::iter()
        .filter(TokenKind::is_keyword)
        .map(|kind| format!("{kind:?}").to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::token_kind::TokenKind::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        tokenize_sql(sql).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenize_select() {
        assert_eq!(
            kinds("SELECT Id, Quantity FROM Books WHERE Id <= 3"),
            vec![
                SELECT, Ident, Comma, Ident, FROM, Ident, WHERE, Ident, Lte,
                LiteralInteger, EOI
            ],
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(kinds("select"), vec![SELECT, EOI]);
        assert_eq!(kinds("SeLeCt"), vec![SELECT, EOI]);
        // A keyword prefix inside a longer word stays an identifier.
        assert_eq!(kinds("selector"), vec![Ident, EOI]);
    }

    #[test]
    fn both_not_equal_spellings() {
        assert_eq!(kinds("a <> b"), kinds("a != b"));
    }

    #[test]
    fn numbers() {
        assert_eq!(kinds("1 2.5 .5 1. 1e3"), vec![
            LiteralInteger, LiteralFloat, LiteralFloat, LiteralFloat, LiteralFloat, EOI
        ]);
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            kinds("SELECT Id -- trailing note\nFROM Books"),
            vec![SELECT, Ident, FROM, Ident, EOI],
        );
    }

    #[test]
    fn unrecognized_character_reports_position() {
        let err = tokenize_sql("SELECT ;").unwrap_err();
        assert_eq!(err, crate::error::Error::parse(7, "unrecognized character \";\""));
    }

    #[test]
    fn token_text_slices_the_source() {
        let tokens = tokenize_sql("UPDATE Books").unwrap();
        assert_eq!(tokens[1].text(), "Books");
    }

    #[test]
    fn keyword_listing() {
        let keywords = all_keywords();
        assert!(keywords.contains(&"select".to_string()));
        assert!(keywords.contains(&"null".to_string()));
        assert_eq!(keywords.len(), 11);
    }
}
