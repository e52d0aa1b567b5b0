// tests/lexer_tests.rs

use jmesq::ast::{Token, TokenKind};
use jmesq::lexer::{LexError, Lexer};
use jmesq::{Value, tokenize};
use pretty_assertions::assert_eq;
use serde_json::json;

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn single(input: &str) -> TokenKind {
    let mut tokens = kinds(input);
    assert_eq!(tokens.len(), 1, "Expected one token for input: {}", input);
    tokens.remove(0)
}

// ============================================================================
// Punctuation and operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        (".", TokenKind::Dot),
        ("*", TokenKind::Star),
        (",", TokenKind::Comma),
        (":", TokenKind::Colon),
        ("{", TokenKind::Lbrace),
        ("}", TokenKind::Rbrace),
        ("[", TokenKind::Lbracket),
        ("]", TokenKind::Rbracket),
        ("(", TokenKind::Lparen),
        (")", TokenKind::Rparen),
        ("@", TokenKind::Current),
        ("&", TokenKind::Expref),
        ("|", TokenKind::Pipe),
        ("!", TokenKind::Not),
        ("<", TokenKind::Lt),
        (">", TokenKind::Gt),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("==", TokenKind::Eq),
        ("!=", TokenKind::Ne),
        ("<=", TokenKind::Lte),
        (">=", TokenKind::Gte),
        ("||", TokenKind::Or),
        ("&&", TokenKind::And),
        ("[?", TokenKind::Filter),
        ("[]", TokenKind::Flatten),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_longest_match_wins() {
    assert_eq!(
        kinds("a||b|c"),
        vec![
            TokenKind::UnquotedIdentifier("a".into()),
            TokenKind::Or,
            TokenKind::UnquotedIdentifier("b".into()),
            TokenKind::Pipe,
            TokenKind::UnquotedIdentifier("c".into()),
        ]
    );
    assert_eq!(kinds("&&&"), vec![TokenKind::And, TokenKind::Expref]);
}

#[test]
fn test_bracket_with_space_is_not_flatten() {
    assert_eq!(kinds("[ ]"), vec![TokenKind::Lbracket, TokenKind::Rbracket]);
}

// ============================================================================
// Identifiers and numbers
// ============================================================================

#[test]
fn test_unquoted_identifiers() {
    assert_eq!(single("foo_bar9"), TokenKind::UnquotedIdentifier("foo_bar9".into()));
    assert_eq!(single("_x"), TokenKind::UnquotedIdentifier("_x".into()));
}

#[test]
fn test_quoted_identifier_decodes_escapes() {
    assert_eq!(
        single(r#""with space""#),
        TokenKind::QuotedIdentifier("with space".into())
    );
    assert_eq!(
        single(r#""a\"bA""#),
        TokenKind::QuotedIdentifier("a\"bA".into())
    );
}

#[test]
fn test_numbers() {
    assert_eq!(single("42"), TokenKind::Number(42));
    assert_eq!(single("-7"), TokenKind::Number(-7));
    assert_eq!(
        kinds("[-1:]"),
        vec![
            TokenKind::Lbracket,
            TokenKind::Number(-1),
            TokenKind::Colon,
            TokenKind::Rbracket,
        ]
    );
}

#[test]
fn test_number_overflow_is_an_error() {
    let err = tokenize("99999999999999999999").unwrap_err();
    assert_eq!(err, LexError::InvalidNumber { position: 0 });
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_raw_string_literal() {
    assert_eq!(single("'hello'"), TokenKind::Literal(Value::from("hello")));
    assert_eq!(single(r"'it\'s'"), TokenKind::Literal(Value::from("it's")));
    assert_eq!(single(r"'a\\b'"), TokenKind::Literal(Value::from(r"a\b")));
    assert_eq!(single(r"'\n'"), TokenKind::Literal(Value::from(r"\n")));
}

#[test]
fn test_json_literals() {
    let test_cases = vec![
        ("`true`", json!(true)),
        ("`null`", json!(null)),
        ("`1.5`", json!(1.5)),
        ("`-3`", json!(-3)),
        ("`\"x\"`", json!("x")),
        ("`[1, 2]`", json!([1, 2])),
        ("`{\"a\": {\"b\": []}}`", json!({"a": {"b": []}})),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            single(input),
            TokenKind::Literal(expected.into()),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_bare_literal_is_a_string() {
    assert_eq!(single("`foo`"), TokenKind::Literal(Value::from("foo")));
}

#[test]
fn test_escaped_backtick_inside_literal() {
    assert_eq!(single(r"`a\`b`"), TokenKind::Literal(Value::from("a`b")));
}

#[test]
fn test_invalid_json_literal() {
    let err = tokenize("`[1, 2`").unwrap_err();
    assert!(matches!(err, LexError::InvalidLiteral { position: 0, .. }));
}

// ============================================================================
// Positions and errors
// ============================================================================

#[test]
fn test_token_positions() {
    let tokens = tokenize("foo.bar  [0]").unwrap();
    let starts: Vec<usize> = tokens.iter().map(|t| t.start).collect();
    assert_eq!(starts, vec![0, 3, 4, 9, 10, 11]);
}

#[test]
fn test_positions_count_chars_not_bytes() {
    let tokens = tokenize("'é' == x").unwrap();
    assert_eq!(tokens[1].start, 4);
}

#[test]
fn test_unknown_character() {
    let err = tokenize("foo # bar").unwrap_err();
    assert_eq!(err, LexError::UnknownCharacter { ch: '#', position: 4 });
    assert_eq!(err.position(), 4);
}

#[test]
fn test_single_equals_is_rejected() {
    let err = tokenize("a = b").unwrap_err();
    assert_eq!(err, LexError::UnknownCharacter { ch: '=', position: 2 });
}

#[test]
fn test_unterminated_quotes() {
    for (input, quote) in [("\"abc", '"'), ("'abc", '\''), ("`abc", '`')] {
        let err = tokenize(input).unwrap_err();
        assert_eq!(
            err,
            LexError::Unterminated { quote, position: 0 },
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_empty_input_has_no_tokens() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(tokenize(" \t\r\n").unwrap().is_empty());
}

#[test]
fn test_next_token_streams_until_end() {
    let mut lexer = Lexer::new("a.b");
    assert_eq!(
        lexer.next_token().unwrap(),
        Some(Token::new(TokenKind::UnquotedIdentifier("a".into()), 0))
    );
    assert_eq!(lexer.next_token().unwrap(), Some(Token::new(TokenKind::Dot, 1)));
    assert!(lexer.next_token().unwrap().is_some());
    assert_eq!(lexer.next_token().unwrap(), None);
    assert_eq!(lexer.next_token().unwrap(), None);
}

#[test]
fn test_token_display() {
    let tokens = tokenize("foo[0]").unwrap();
    let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(
        rendered,
        vec!["UnquotedIdentifier(foo)@0", "Lbracket([)@3", "Number(0)@4", "Rbracket(])@5"]
    );
}
