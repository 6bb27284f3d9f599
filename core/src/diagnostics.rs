//! Advisory log levels and the sink production functions write through.
//!
//! Nothing here can change a derivation's result. Levels are resolved per
//! symbol: the rule's own override, then the registry default, then
//! [`LogLevel::Action`].

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum LogLevel {
    Silent = 0,
    #[default]
    Action = 1,
    Info = 2,
    Verbose = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("log level must be 0-3, got {0}")]
pub struct LogLevelError(pub u8);

impl LogLevel {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether a message tagged `message` passes when this level is active.
    #[must_use]
    pub fn allows(self, message: LogLevel) -> bool {
        message != LogLevel::Silent && message <= self
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Action => "action",
            Self::Info => "info",
            Self::Verbose => "verbose",
        }
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LogLevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Silent),
            1 => Ok(Self::Action),
            2 => Ok(Self::Info),
            3 => Ok(Self::Verbose),
            other => Err(LogLevelError(other)),
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level.as_u8()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for messages written by production functions.
///
/// Implementations must not re-enter the engine.
pub trait DiagnosticSink {
    fn emit(&self, level: LogLevel, symbol: Option<char>, message: &str);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Rc<T> {
    fn emit(&self, level: LogLevel, symbol: Option<char>, message: &str) {
        (**self).emit(level, symbol, message);
    }
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, level: LogLevel, symbol: Option<char>, message: &str) {
        let symbol = symbol.map(String::from).unwrap_or_default();
        match level {
            LogLevel::Silent => {}
            LogLevel::Action => tracing::info!(%symbol, "{message}"),
            LogLevel::Info => tracing::debug!(%symbol, "{message}"),
            LogLevel::Verbose => tracing::trace!(%symbol, "{message}"),
        }
    }
}
