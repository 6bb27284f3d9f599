//! Core token types for Sprig.
//!
//! This crate contains the pure representation of an L-system axiom: tokens,
//! token sequences and the text codec. No IO, no randomness, no rules.
//! Everything here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod codec;

pub use codec::{CollectError, ParamBuffer, SENTINEL, collect_params, decode, encode};

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Tokens
// ============================================================================

/// An atomic unit of an axiom.
///
/// Every character of the textual form maps to exactly one token. The
/// structural variants only carry meaning during derivation: `GroupOpen`,
/// `GroupClose` and `Escape` inside parameter groups, `Push` and `Pop` as
/// scope brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// A rule key.
    Symbol(char),
    /// `(`
    GroupOpen,
    /// `)`
    GroupClose,
    /// `\`
    Escape,
    /// `[`
    Push,
    /// `]`
    Pop,
}

impl Token {
    pub const GROUP_OPEN: char = '(';
    pub const GROUP_CLOSE: char = ')';
    pub const ESCAPE: char = '\\';
    pub const PUSH: char = '[';
    pub const POP: char = ']';

    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        match ch {
            Self::GROUP_OPEN => Token::GroupOpen,
            Self::GROUP_CLOSE => Token::GroupClose,
            Self::ESCAPE => Token::Escape,
            Self::PUSH => Token::Push,
            Self::POP => Token::Pop,
            other => Token::Symbol(other),
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Token::Symbol(ch) => ch,
            Token::GroupOpen => Self::GROUP_OPEN,
            Token::GroupClose => Self::GROUP_CLOSE,
            Token::Escape => Self::ESCAPE,
            Token::Push => Self::PUSH,
            Token::Pop => Self::POP,
        }
    }

    /// Characters that decode to a structural token and therefore can never
    /// be used as a rule key.
    #[must_use]
    pub const fn is_reserved(ch: char) -> bool {
        !matches!(Self::from_char(ch), Token::Symbol(_))
    }
}

impl From<char> for Token {
    fn from(ch: char) -> Self {
        Self::from_char(ch)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// Axiom
// ============================================================================

/// An ordered token sequence: both the engine's persistent state and the
/// output of one derivation.
///
/// The textual form (via `Display`) is the character-for-character rendering
/// of the tokens, so `Axiom::from(text).to_string() == text` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Axiom(Vec<Token>);

impl Axiom {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn extend_from(&mut self, tokens: &[Token]) {
        self.0.extend_from_slice(tokens);
    }

    /// If the first token is the pass-through sentinel, return the remainder.
    #[must_use]
    pub fn strip_sentinel(&self) -> Option<&[Token]> {
        match self.0.split_first() {
            Some((Token::Symbol(SENTINEL), rest)) => Some(rest),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.0
    }
}

impl From<Vec<Token>> for Axiom {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

impl From<&str> for Axiom {
    fn from(text: &str) -> Self {
        decode(text)
    }
}

impl From<String> for Axiom {
    fn from(text: String) -> Self {
        decode(&text)
    }
}

impl From<Axiom> for String {
    fn from(axiom: Axiom) -> Self {
        axiom.to_string()
    }
}

impl FromStr for Axiom {
    type Err = Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(decode(text))
    }
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|token| write!(f, "{token}"))
    }
}

impl FromIterator<Token> for Axiom {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Axiom {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Axiom {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
