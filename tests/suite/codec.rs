//! Token codec tests

use sprig_types::{Axiom, CollectError, Token, collect_params, decode, encode};

#[test]
fn encode_renders_parenthesized_params() {
    assert_eq!(encode(&["a", "b", "c"]).to_string(), "(a)(b)(c)");
}

#[test]
fn decode_of_encoded_params_renders_same_text() {
    let text = encode(&["a", "b", "c"]).to_string();
    assert_eq!(decode(&text).to_string(), "(a)(b)(c)");
}

#[test]
fn close_paren_in_param_is_escaped_and_recovered() {
    let encoded = encode(&["x)y"]);
    assert_eq!(encoded.to_string(), "(x\\)y)");
    assert_eq!(
        collect_params(&encoded.to_string()).unwrap(),
        vec!["x)y".to_string()]
    );
}

#[test]
fn params_with_structural_characters_survive() {
    let params = vec![
        "[branch]".to_string(),
        "((nested))".to_string(),
        "a\\b".to_string(),
        String::new(),
        "ünïcödé".to_string(),
    ];
    let text = encode(&params).to_string();
    assert_eq!(collect_params(&text).unwrap(), params);
}

#[test]
fn decode_is_one_token_per_char() {
    let axiom = decode("F(1)[\\]");
    assert_eq!(
        axiom.tokens(),
        &[
            Token::Symbol('F'),
            Token::GroupOpen,
            Token::Symbol('1'),
            Token::GroupClose,
            Token::Push,
            Token::Escape,
            Token::Pop,
        ]
    );
}

#[test]
fn axiom_parses_from_str() {
    let axiom: Axiom = "A[B]".parse().unwrap();
    assert_eq!(axiom, Axiom::from("A[B]"));
}

#[test]
fn collect_rejects_text_outside_groups() {
    assert_eq!(
        collect_params("x(a)"),
        Err(CollectError::UnexpectedToken {
            position: 0,
            found: 'x'
        })
    );
}
