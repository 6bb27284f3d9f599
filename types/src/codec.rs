//! Conversion between flat text and token sequences.
//!
//! Decoding is a plain character classification pass. Escapes only matter
//! while a parameter group is being collected: inside `( ... )` a `\`
//! immediately before `)` makes that `)` literal. No other character is ever
//! escaped, so any parameter text round-trips through [`encode`] and
//! [`collect_params`] unchanged, except text ending in `\` (see
//! [`encode`]).

use std::mem;

use thiserror::Error;

use crate::{Axiom, Token};

/// Leading marker of a production's replacement that asks the engine to
/// splice the received parameters back into the output.
pub const SENTINEL: char = '.';

/// Decode text into tokens, one token per character.
#[must_use]
pub fn decode(text: &str) -> Axiom {
    text.chars().map(Token::from_char).collect()
}

/// Render a parameter list in canonical group form: `["a", "b"]` becomes
/// `(a)(b)` and every `)` inside a parameter becomes `\)`.
///
/// A parameter whose text ends in `\` cannot be represented: the trailing
/// backslash escapes the closing `)` of its own group.
#[must_use]
pub fn encode<P: AsRef<str>>(params: &[P]) -> Axiom {
    let capacity = params.iter().map(|p| p.as_ref().len() + 2).sum();
    let mut out = Axiom::with_capacity(capacity);
    for param in params {
        out.push(Token::GroupOpen);
        for ch in param.as_ref().chars() {
            if ch == Token::GROUP_CLOSE {
                out.push(Token::Escape);
            }
            out.push(Token::from_char(ch));
        }
        out.push(Token::GroupClose);
    }
    out
}

/// In-progress parameter text while a `( ... )` group is being collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBuffer {
    text: String,
}

impl ParamBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next token of the group.
    ///
    /// Returns the finished parameter when `token` closes the group. A `)`
    /// directly after a `\` replaces that backslash with a literal `)` and
    /// collection continues.
    pub fn feed(&mut self, token: Token) -> Option<String> {
        if token != Token::GroupClose {
            self.text.push(token.as_char());
            return None;
        }
        if self.text.ends_with(Token::ESCAPE) {
            self.text.pop();
            self.text.push(Token::GROUP_CLOSE);
            return None;
        }
        Some(mem::take(&mut self.text))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("unexpected '{found}' at position {position}, expected '('")]
    UnexpectedToken { position: usize, found: char },
    #[error("parameter group opened at position {start} is never closed")]
    Unterminated { start: usize },
}

/// Collect the parameters of a text made only of `( ... )` groups.
///
/// This runs the same automaton the engine uses during derivation, so
/// `collect_params(&encode(p).to_string()) == p` for any `p` whose entries
/// do not end in `\`.
pub fn collect_params(text: &str) -> Result<Vec<String>, CollectError> {
    let mut params = Vec::new();
    let mut open: Option<(usize, ParamBuffer)> = None;

    for (position, token) in decode(text).into_iter().enumerate() {
        match open.as_mut() {
            Some((_, buffer)) => {
                if let Some(param) = buffer.feed(token) {
                    params.push(param);
                    open = None;
                }
            }
            None if token == Token::GroupOpen => open = Some((position, ParamBuffer::new())),
            None => {
                return Err(CollectError::UnexpectedToken {
                    position,
                    found: token.as_char(),
                });
            }
        }
    }

    match open {
        Some((start, _)) => Err(CollectError::Unterminated { start }),
        None => Ok(params),
    }
}
