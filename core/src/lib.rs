//! Core rewriting logic for Sprig.
//!
//! This crate holds the L-system derivation engine and everything it threads
//! through a derivation: the rule registry, the per-derivation build context,
//! the shared random sequence and the diagnostics hooks.
//!
//! ```text
//! Engine::advance() -> BuildContext (template state, shared rng)
//!                          |
//!                          v
//!          token loop: ( ... ) collect | [ push | ] pop | symbol -> rule
//!                          |
//!                          v
//!              output axiom + BuildReport (final state)
//! ```

pub mod builtin;
mod context;
pub mod diagnostics;
mod engine;
pub mod errors;
mod random;
mod rule;

pub use builtin::Builtin;
pub use context::{BuildContext, BuildReport};
pub use diagnostics::{DiagnosticSink, LogLevel, LogLevelError, TracingSink};
pub use engine::{Engine, EngineBuilder, HookMap, ProductionInfo};
pub use errors::{DeriveError, ProductionError, RegistryError, ScopeImbalance};
pub use random::RandomSequence;
pub use rule::{Produced, ProductionFn, Rule, RuleConfig, RuleRegistry};

pub use sprig_types::{Axiom, Token};
