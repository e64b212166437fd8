//! Edge-case and property tests for the lexer.

use proptest::prelude::*;

use viper_util::SourceBuffer;

use crate::lexer::tokenize;
use crate::token::TokenKind;

#[test]
fn whitespace_only_source() {
    let tokens = tokenize(&SourceBuffer::new("  \n\t  \n")).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
}

#[test]
fn number_glued_to_word_splits() {
    let tokens = tokenize(&SourceBuffer::new("12abc")).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Num);
    assert_eq!(tokens[0].text(), "12");
    assert_eq!(tokens[1].kind, TokenKind::Ident);
    assert_eq!(tokens[1].text(), "abc");
}

#[test]
fn trailing_dot_stays_in_the_number() {
    let tokens = tokenize(&SourceBuffer::new("1.")).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Num);
    assert_eq!(tokens[0].text(), "1.");
}

#[test]
fn leading_dot_is_a_punctuator() {
    let tokens = tokenize(&SourceBuffer::new(".5")).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Dot);
    assert_eq!(tokens[1].kind, TokenKind::Num);
}

#[test]
fn quotes_inside_other_quotes() {
    let tokens = tokenize(&SourceBuffer::new("\"it's fine\"")).unwrap();
    assert_eq!(tokens[0].text(), "it's fine");
}

#[test]
fn underscores_continue_identifiers_but_cannot_start_them() {
    let tokens = tokenize(&SourceBuffer::new("my_var1")).unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text(), "my_var1");

    let err = tokenize(&SourceBuffer::new("_x")).unwrap_err();
    assert_eq!(err.details, "'_'");
}

#[test]
fn brackets_lex_even_though_the_grammar_ignores_them() {
    let tokens = tokenize(&SourceBuffer::new("[1, 2]")).unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LBracket,
            TokenKind::Num,
            TokenKind::Comma,
            TokenKind::Num,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}

/// One atom of a generated program, always separated by whitespace.
fn atom() -> impl Strategy<Value = String> {
    let glyph = prop::sample::select(vec![
        "**", "<=", ">=", "==", "!=", "+=", "&&", "+", "-", "*", "/", "(", ")", "{", "}", ";",
        ",",
    ])
    .prop_map(str::to_owned);
    prop_oneof![
        "[a-zA-Z][a-zA-Z0-9_]{0,8}",
        "[0-9]{1,5}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        glyph,
    ]
}

proptest! {
    /// Round-trip: each token's lexeme sits in the source at its span.
    #[test]
    fn lexemes_round_trip_through_spans(atoms in prop::collection::vec(atom(), 1..24)) {
        let text = atoms.join(" ");
        let src = SourceBuffer::new(text.clone());
        let tokens = tokenize(&src).unwrap();

        for token in tokens.iter().filter(|t| !t.is_eof()) {
            let begin = token.span.begin;
            let line = src.line(begin.line);
            prop_assert_eq!(
                &line[begin.column..begin.column + token.text().len()],
                token.text()
            );
        }
    }

    /// Coverage: the byte range of each span reproduces the lexeme.
    #[test]
    fn spans_cover_their_lexemes(atoms in prop::collection::vec(atom(), 1..24)) {
        let text = atoms.join("\n");
        let src = SourceBuffer::new(text.clone());
        let tokens = tokenize(&src).unwrap();

        for token in tokens.iter().filter(|t| !t.is_eof()) {
            let begin = token.span.begin.idx;
            let end = token.span.end.idx;
            prop_assert_eq!(&text[begin..=end], token.text());
        }
    }

    /// The lexer terminates on arbitrary printable input, with tokens or a
    /// diagnostic, never a panic.
    #[test]
    fn lexer_total_on_printable_ascii(text in "[ -~\\n\\t]{0,64}") {
        let _ = tokenize(&SourceBuffer::new(text));
    }
}
