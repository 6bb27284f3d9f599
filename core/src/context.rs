//! Per-derivation build context.

use std::mem;

use sprig_types::{Axiom, ParamBuffer};

use crate::diagnostics::{DiagnosticSink, LogLevel};
use crate::errors::{DeriveError, ScopeImbalance};
use crate::random::RandomSequence;
use crate::rule::RuleRegistry;

/// Saved on `[`, restored on `]`.
#[derive(Debug, Clone)]
struct ScopeFrame<S> {
    state: S,
    params: Vec<String>,
}

/// Everything one derivation threads through its production calls.
///
/// A fresh context is built for every `advance`: `state` starts as a clone of
/// the engine's template and is never written back, so each generation's
/// productions see the same starting state. Global data and the random
/// sequence are borrowed from the engine and outlive the context.
pub struct BuildContext<'a, G, S> {
    global: &'a G,
    state: S,
    rng: &'a mut RandomSequence,
    sink: &'a dyn DiagnosticSink,
    rules: &'a RuleRegistry<G, S>,
    generation: u64,
    symbol: Option<char>,

    pub(crate) output: Axiom,
    pub(crate) params: Vec<String>,
    pub(crate) collecting: Option<(usize, ParamBuffer)>,
    scopes: Vec<ScopeFrame<S>>,
    pub(crate) steps: usize,
}

impl<'a, G, S: Clone> BuildContext<'a, G, S> {
    pub(crate) fn new(
        global: &'a G,
        state: S,
        rng: &'a mut RandomSequence,
        sink: &'a dyn DiagnosticSink,
        rules: &'a RuleRegistry<G, S>,
        generation: u64,
        capacity: usize,
    ) -> Self {
        Self {
            global,
            state,
            rng,
            sink,
            rules,
            generation,
            symbol: None,
            output: Axiom::with_capacity(capacity),
            params: Vec::new(),
            collecting: None,
            scopes: Vec::new(),
            steps: 0,
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(ScopeFrame {
            state: self.state.clone(),
            params: self.params.clone(),
        });
    }

    pub(crate) fn pop_scope(&mut self, position: usize) -> Result<(), DeriveError> {
        let frame = self
            .scopes
            .pop()
            .ok_or(DeriveError::UnbalancedScope(ScopeImbalance::UnmatchedClose {
                position,
            }))?;
        self.state = frame.state;
        self.params = frame.params;
        Ok(())
    }
}

impl<G, S> BuildContext<'_, G, S> {
    #[must_use]
    pub fn global(&self) -> &G {
        self.global
    }

    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// The engine's random sequence, shared with every other production and
    /// every later generation.
    pub fn rng(&mut self) -> &mut RandomSequence {
        self.rng
    }

    pub fn next_real(&mut self) -> f64 {
        self.rng.next_real()
    }

    /// Generation number of the axiom being rewritten (the initial axiom is 1).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Symbol whose production is running, if any.
    #[must_use]
    pub fn symbol(&self) -> Option<char> {
        self.symbol
    }

    /// Output produced so far in this derivation.
    #[must_use]
    pub fn output(&self) -> &Axiom {
        &self.output
    }

    /// Number of `[` scopes currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Resolved log level for the running symbol and the sink to write to.
    #[must_use]
    pub fn log_level(&self) -> (LogLevel, &dyn DiagnosticSink) {
        (self.rules.resolve_log_level(self.symbol), self.sink)
    }

    /// Emit `message` if the resolved level allows `level`.
    pub fn log(&self, level: LogLevel, message: &str) {
        let (active, sink) = self.log_level();
        if active.allows(level) {
            sink.emit(level, self.symbol, message);
        }
    }

    pub(crate) fn set_symbol(&mut self, symbol: Option<char>) {
        self.symbol = symbol;
    }

    pub(crate) fn take_params(&mut self) -> Vec<String> {
        mem::take(&mut self.params)
    }

    pub(crate) fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn finish(self) -> (Axiom, BuildReport<S>) {
        let report = BuildReport {
            state: self.state,
            generation: self.generation + 1,
            steps: self.steps,
            axiom_len: self.output.len(),
        };
        (self.output, report)
    }
}

/// What a completed derivation leaves behind for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport<S> {
    /// Current state at the end of the derivation. Not written back into the
    /// engine.
    pub state: S,
    /// Generation number of the newly produced axiom.
    pub generation: u64,
    /// Number of production steps (symbols rewritten).
    pub steps: usize,
    pub axiom_len: usize,
}
