//! The lexer: character stream to token stream.
//!
//! Recognition order, first match wins: whitespace, number, string, word
//! (boolean literal, keyword, word operator, identifier), operator glyph
//! (two characters before one), punctuator/separator. Anything else is an
//! `InvalidCharError`. The first error aborts lexing.

use viper_util::{DiagResult, Diagnostic, DiagnosticKind, SourceBuffer, Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{self, Token, TokenKind};

/// Lex `src` into a token stream terminated by an EOF token.
pub fn tokenize(src: &SourceBuffer) -> DiagResult<Vec<Token>> {
    Lexer::new(src).lex()
}

/// The Viper lexer.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    src: &'a SourceBuffer,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a SourceBuffer) -> Self {
        Self { cursor: Cursor::new(src.text()), src }
    }

    /// Consume the whole source, producing tokens or the first diagnostic.
    pub fn lex(mut self) -> DiagResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.cursor.is_at_end() {
            let ch = self.cursor.current_char();

            if ch == ' ' || ch == '\n' || ch == '\t' {
                self.cursor.advance();
                continue;
            }
            if ch.is_ascii_digit() {
                tokens.push(self.lex_number()?);
                continue;
            }
            if ch == '\'' || ch == '"' {
                tokens.push(self.lex_string(ch));
                continue;
            }
            if ch.is_ascii_alphabetic() {
                tokens.push(self.lex_word());
                continue;
            }
            if token::starts_operator(ch) {
                tokens.push(self.lex_operator(ch)?);
                continue;
            }
            if let Some(kind) = token::punctuator(ch) {
                let pos = self.cursor.position();
                let mut buf = [0u8; 4];
                tokens.push(Token::new(
                    kind,
                    Symbol::intern(ch.encode_utf8(&mut buf)),
                    Span::point(pos),
                ));
                self.cursor.advance();
                continue;
            }

            return Err(self.invalid_char(ch));
        }

        tokens.push(Token::new(
            TokenKind::Eof,
            Symbol::intern("EOF"),
            Span::point(self.cursor.position()),
        ));
        Ok(tokens)
    }

    /// Digits with at most one `.`. A second dot makes the whole run an
    /// `InvalidLiteralError`; the run is still consumed so the span covers
    /// all of it.
    fn lex_number(&mut self) -> DiagResult<Token> {
        let begin = self.cursor.position();
        let mut text = String::new();
        let mut dots = 0usize;

        loop {
            let ch = self.cursor.current_char();
            if ch.is_ascii_digit() || ch == '.' {
                if ch == '.' {
                    dots += 1;
                }
                text.push(ch);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let span = Span::new(begin, self.cursor.position_before());
        if dots > 1 {
            return Err(Diagnostic::new(
                DiagnosticKind::InvalidLiteral,
                text,
                self.src.line(begin.line),
                span,
            ));
        }
        Ok(Token::new(TokenKind::Num, Symbol::intern(&text), span))
    }

    /// Quote-delimited string. The closing quote may be missing at end of
    /// input; the delimiters are not part of the lexeme either way.
    fn lex_string(&mut self, delim: char) -> Token {
        let begin = self.cursor.position();
        self.cursor.advance();

        let mut text = String::new();
        while !self.cursor.is_at_end() && self.cursor.current_char() != delim {
            text.push(self.cursor.current_char());
            self.cursor.advance();
        }
        self.cursor.advance();

        Token::new(
            TokenKind::Str,
            Symbol::intern(&text),
            Span::new(begin, self.cursor.position_before()),
        )
    }

    /// A letter followed by letters, digits, or `_`, resolved to a boolean
    /// literal, keyword, word operator, or identifier, in that order.
    fn lex_word(&mut self) -> Token {
        let begin = self.cursor.position();
        let mut word = String::new();

        loop {
            let ch = self.cursor.current_char();
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let kind = if token::bool_literal(&word).is_some() {
            TokenKind::Bool
        } else if let Some(kw) = token::keyword(&word) {
            kw
        } else if let Some(op) = token::word_operator(&word) {
            op
        } else {
            TokenKind::Ident
        };

        Token::new(
            kind,
            Symbol::intern(&word),
            Span::new(begin, self.cursor.position_before()),
        )
    }

    /// Operator glyphs; the two-character spellings win over single
    /// characters. A character that can only open a longer operator (`&`)
    /// fails when the continuation is absent.
    fn lex_operator(&mut self, first: char) -> DiagResult<Token> {
        let begin = self.cursor.position();
        self.cursor.advance();

        let second = self.cursor.current_char();
        if let Some(kind) = token::two_char_operator(first, second) {
            let second_pos = self.cursor.position();
            self.cursor.advance();
            let mut lexeme = String::new();
            lexeme.push(first);
            lexeme.push(second);
            return Ok(Token::new(
                kind,
                Symbol::intern(&lexeme),
                Span::new(begin, second_pos),
            ));
        }

        match token::one_char_operator(first) {
            Some(kind) => {
                let mut buf = [0u8; 4];
                Ok(Token::new(
                    kind,
                    Symbol::intern(first.encode_utf8(&mut buf)),
                    Span::point(begin),
                ))
            }
            None => Err(Diagnostic::new(
                DiagnosticKind::InvalidChar,
                format!("'{first}'"),
                self.src.line(begin.line),
                Span::point(begin),
            )),
        }
    }

    fn invalid_char(&self, ch: char) -> Diagnostic {
        let pos = self.cursor.position();
        Diagnostic::new(
            DiagnosticKind::InvalidChar,
            format!("'{ch}'"),
            self.src.line(pos.line),
            Span::point(pos),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenFamily;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(&SourceBuffer::new(src))
            .expect("lexes cleanly")
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_a_declaration() {
        assert_eq!(
            kinds("num x = 1 + 2 * 3"),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::Num,
                TokenKind::Plus,
                TokenKind::Num,
                TokenKind::Star,
                TokenKind::Num,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_win() {
        assert_eq!(
            kinds("a ** b <= c += 1"),
            vec![
                TokenKind::Ident,
                TokenKind::DoubleStar,
                TokenKind::Ident,
                TokenKind::LessEqual,
                TokenKind::Ident,
                TokenKind::PlusEqual,
                TokenKind::Num,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn operator_aliases() {
        assert_eq!(
            kinds("a && b | not c ^ 2"),
            vec![
                TokenKind::Ident,
                TokenKind::And,
                TokenKind::Ident,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Ident,
                TokenKind::DoubleStar,
                TokenKind::Num,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_lexeme_excludes_delimiters() {
        let tokens = tokenize(&SourceBuffer::new("\"hi\" 'there'")).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text(), "hi");
        assert_eq!(tokens[1].text(), "there");
    }

    #[test]
    fn bool_spellings() {
        for src in ["True", "true", "TRUE", "False", "false", "FALSE"] {
            let tokens = tokenize(&SourceBuffer::new(src)).unwrap();
            assert_eq!(tokens[0].kind, TokenKind::Bool, "{src}");
            assert_eq!(tokens[0].family, TokenFamily::Literal);
        }
    }

    #[test]
    fn keywords_and_identifiers() {
        let tokens = tokenize(&SourceBuffer::new("if elif else for while return whilst")).unwrap();
        let families: Vec<_> = tokens.iter().map(|t| t.family).collect();
        assert_eq!(
            families,
            vec![
                TokenFamily::Keyword,
                TokenFamily::Keyword,
                TokenFamily::Keyword,
                TokenFamily::Keyword,
                TokenFamily::Keyword,
                TokenFamily::Keyword,
                TokenFamily::Identifier,
                TokenFamily::Punctuator,
            ]
        );
    }

    #[test]
    fn second_dot_is_an_invalid_literal() {
        let err = tokenize(&SourceBuffer::new("x = 1.2.3")).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::InvalidLiteral);
        assert_eq!(err.details, "1.2.3");
        assert_eq!(err.span.begin.column, 4);
        assert_eq!(err.span.end.column, 8);
    }

    #[test]
    fn bare_ampersand_fails() {
        let err = tokenize(&SourceBuffer::new("a & b")).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::InvalidChar);
        assert_eq!(err.details, "'&'");
    }

    #[test]
    fn unknown_character_fails() {
        let err = tokenize(&SourceBuffer::new("num @x = 1")).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::InvalidChar);
        assert_eq!(err.details, "'@'");
        assert_eq!(err.span.begin.column, 4);
    }

    #[test]
    fn spans_point_into_the_source() {
        let src = SourceBuffer::new("num x = 10\nprint(x)");
        let tokens = tokenize(&src).unwrap();
        let print_tok = tokens.iter().find(|t| t.text() == "print").unwrap();
        assert_eq!(print_tok.span.begin.line, 1);
        assert_eq!(print_tok.span.begin.column, 0);
        let ten = tokens.iter().find(|t| t.text() == "10").unwrap();
        assert_eq!(ten.span.begin.column, 8);
        assert_eq!(ten.span.end.column, 9);
    }

    #[test]
    fn empty_source_is_just_eof() {
        let tokens = tokenize(&SourceBuffer::new("")).unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn unterminated_string_runs_to_end_of_input() {
        let tokens = tokenize(&SourceBuffer::new("'abc")).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text(), "abc");
    }
}
