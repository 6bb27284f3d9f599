//! Error types for derivation and rule registration.

use std::error::Error as StdError;

use thiserror::Error;

/// Which way the `[` / `]` brackets of an axiom fail to balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeImbalance {
    #[error("']' at position {position} has no matching '['")]
    UnmatchedClose { position: usize },
    #[error("{depth} '[' still open at end of axiom")]
    UnclosedOpen { depth: usize },
}

/// A derivation failure. The engine's axiom and generation are left as they
/// were before the failed `advance`.
#[derive(Debug, Error)]
pub enum DeriveError {
    #[error("unbalanced scope: {0}")]
    UnbalancedScope(ScopeImbalance),
    #[error("parameter group opened at position {start} is never closed")]
    UnterminatedParameter { start: usize },
    #[error("production for '{symbol}' at position {position} failed")]
    Production {
        symbol: char,
        position: usize,
        #[source]
        source: ProductionError,
    },
}

impl DeriveError {
    #[must_use]
    pub fn is_unbalanced_scope(&self) -> bool {
        matches!(self, DeriveError::UnbalancedScope(_))
    }
}

/// Error raised by a production function.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProductionError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ProductionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a rule for '{0}' is already registered")]
    DuplicateRule(char),
    #[error("'{0}' is a structural character and cannot be a rule key")]
    ReservedSymbol(char),
}
