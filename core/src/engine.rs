//! The derivation engine.
//!
//! One `advance` walks the current axiom left to right exactly once:
//!
//! - `(` starts collecting a parameter; tokens up to the next unescaped `)`
//!   form one entry of the pending parameter list.
//! - `[` saves the current state and pending parameters; `]` restores them.
//!   Both brackets are copied to the output.
//! - every other token is a production step for its symbol. The pending
//!   parameters go to that symbol's production and are then replaced by the
//!   list it hands on (or cleared).

use std::collections::HashMap;
use std::fmt;

use sprig_types::{Axiom, ParamBuffer, Token, encode};

use crate::context::{BuildContext, BuildReport};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::errors::{DeriveError, ScopeImbalance};
use crate::random::RandomSequence;
use crate::rule::{Produced, RuleRegistry};

/// Observational callbacks keyed by symbol, invoked before each production
/// step for that symbol. They cannot alter the derivation.
pub type HookMap<'h> = HashMap<char, Box<dyn FnMut(&ProductionInfo<'_>) + 'h>>;

/// What a hook sees for one production step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionInfo<'a> {
    pub symbol: char,
    /// Token index in the axiom being rewritten.
    pub position: usize,
    /// Generation number of the axiom being rewritten.
    pub generation: u64,
    pub params: &'a [String],
    pub has_rule: bool,
}

/// An L-system instance: the current axiom plus everything needed to derive
/// the next one.
///
/// `G` is caller-owned global data shared read-only with every production.
/// `S` is the state template cloned into each derivation's context.
pub struct Engine<G = (), S = ()> {
    axiom: Axiom,
    generation: u64,
    rules: RuleRegistry<G, S>,
    global: G,
    template: S,
    rng: RandomSequence,
    sink: Box<dyn DiagnosticSink>,
}

impl Engine {
    /// Start building an engine with unit global data and state.
    pub fn builder(axiom: impl Into<Axiom>) -> EngineBuilder<(), ()> {
        EngineBuilder {
            axiom: axiom.into(),
            global: (),
            state: (),
            seed: None,
            sink: None,
        }
    }
}

impl<G: Default, S: Default> Engine<G, S> {
    /// Engine with default global data and state and an entropy seed.
    pub fn new(axiom: impl Into<Axiom>, rules: RuleRegistry<G, S>) -> Self {
        EngineBuilder {
            axiom: axiom.into(),
            global: G::default(),
            state: S::default(),
            seed: None,
            sink: None,
        }
        .build(rules)
    }
}

impl<G, S> Engine<G, S> {
    #[must_use]
    pub fn axiom(&self) -> &Axiom {
        &self.axiom
    }

    /// Generation number of the current axiom. Starts at 1.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn rules(&self) -> &RuleRegistry<G, S> {
        &self.rules
    }

    #[must_use]
    pub fn global(&self) -> &G {
        &self.global
    }

    /// The state every derivation starts from.
    #[must_use]
    pub fn template(&self) -> &S {
        &self.template
    }

    #[must_use]
    pub fn random(&self) -> &RandomSequence {
        &self.rng
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

impl<G, S: Clone> Engine<G, S> {
    /// Derive the next generation.
    ///
    /// On success the produced tokens replace the axiom and the generation
    /// counter increments. On failure both are left untouched; values already
    /// drawn from the random sequence stay drawn.
    pub fn advance(
        &mut self,
        hooks: Option<&mut HookMap<'_>>,
    ) -> Result<BuildReport<S>, DeriveError> {
        let mut ctx = BuildContext::new(
            &self.global,
            self.template.clone(),
            &mut self.rng,
            &*self.sink,
            &self.rules,
            self.generation,
            self.axiom.len(),
        );

        if let Err(err) = derive(&self.axiom, &self.rules, &mut ctx, hooks) {
            tracing::warn!(generation = self.generation, "derivation failed: {err}");
            return Err(err);
        }

        let (output, report) = ctx.finish();
        tracing::debug!(
            generation = report.generation,
            input_len = self.axiom.len(),
            output_len = output.len(),
            steps = report.steps,
            "derived generation"
        );
        self.axiom = output;
        self.generation = report.generation;
        Ok(report)
    }

    /// Advance `generations` times, returning the last report.
    pub fn advance_by(
        &mut self,
        generations: usize,
        mut hooks: Option<&mut HookMap<'_>>,
    ) -> Result<Option<BuildReport<S>>, DeriveError> {
        let mut last = None;
        for _ in 0..generations {
            last = Some(self.advance(hooks.as_deref_mut())?);
        }
        Ok(last)
    }
}

impl<G, S> fmt::Debug for Engine<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("axiom", &self.axiom.to_string())
            .field("generation", &self.generation)
            .field("rules", &self.rules)
            .field("rng", &self.rng)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`]. Global data and state change the builder's type,
/// so set them before calling [`EngineBuilder::build`] with a registry of the
/// matching type.
pub struct EngineBuilder<G, S> {
    axiom: Axiom,
    global: G,
    state: S,
    seed: Option<u64>,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl<G, S> EngineBuilder<G, S> {
    pub fn global<G2>(self, global: G2) -> EngineBuilder<G2, S> {
        EngineBuilder {
            axiom: self.axiom,
            global,
            state: self.state,
            seed: self.seed,
            sink: self.sink,
        }
    }

    pub fn state<S2>(self, state: S2) -> EngineBuilder<G, S2> {
        EngineBuilder {
            axiom: self.axiom,
            global: self.global,
            state,
            seed: self.seed,
            sink: self.sink,
        }
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same as [`EngineBuilder::seed`] but accepts an optional seed.
    #[must_use]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn build(self, rules: RuleRegistry<G, S>) -> Engine<G, S> {
        let rng = match self.seed {
            Some(seed) => RandomSequence::new(seed),
            None => {
                let rng = RandomSequence::from_entropy();
                tracing::info!(seed = rng.seed(), "no seed given, drew one");
                rng
            }
        };
        Engine {
            axiom: self.axiom,
            generation: 1,
            rules,
            global: self.global,
            template: self.state,
            rng,
            sink: self.sink.unwrap_or_else(|| Box::new(TracingSink)),
        }
    }
}

fn derive<G, S: Clone>(
    input: &Axiom,
    rules: &RuleRegistry<G, S>,
    ctx: &mut BuildContext<'_, G, S>,
    mut hooks: Option<&mut HookMap<'_>>,
) -> Result<(), DeriveError> {
    for (position, &token) in input.iter().enumerate() {
        if let Some((_, buffer)) = ctx.collecting.as_mut() {
            if let Some(param) = buffer.feed(token) {
                ctx.params.push(param);
                ctx.collecting = None;
            }
            continue;
        }

        match token {
            Token::GroupOpen => ctx.collecting = Some((position, ParamBuffer::new())),
            Token::Push => {
                ctx.push_scope();
                ctx.output.push(Token::Push);
            }
            Token::Pop => {
                ctx.pop_scope(position)?;
                ctx.output.push(Token::Pop);
            }
            _ => production_step(token, position, rules, ctx, hooks.as_deref_mut())?,
        }
    }

    if let Some((start, _)) = &ctx.collecting {
        return Err(DeriveError::UnterminatedParameter { start: *start });
    }
    let depth = ctx.open_scopes();
    if depth > 0 {
        return Err(DeriveError::UnbalancedScope(ScopeImbalance::UnclosedOpen {
            depth,
        }));
    }
    Ok(())
}

fn production_step<G, S>(
    token: Token,
    position: usize,
    rules: &RuleRegistry<G, S>,
    ctx: &mut BuildContext<'_, G, S>,
    hooks: Option<&mut HookMap<'_>>,
) -> Result<(), DeriveError> {
    let symbol = token.as_char();
    let params = ctx.take_params();
    let rule = rules.get(symbol);

    if let Some(hook) = hooks.and_then(|hooks| hooks.get_mut(&symbol)) {
        hook(&ProductionInfo {
            symbol,
            position,
            generation: ctx.generation(),
            params: &params,
            has_rule: rule.is_some(),
        });
    }

    let produced = match rule {
        Some(rule) => match rule.produce() {
            Some(produce) => {
                ctx.set_symbol(Some(symbol));
                let result = produce(rule.config(), &mut *ctx, &params);
                ctx.set_symbol(None);
                result.map_err(|source| DeriveError::Production {
                    symbol,
                    position,
                    source,
                })?
            }
            None => Produced::fallback(),
        },
        None => Produced::fallback(),
    };
    tracing::trace!(
        %symbol,
        position,
        params = params.len(),
        replaced = produced.replacement.is_some(),
        "production step"
    );

    let Produced {
        replacement,
        next_params,
    } = produced;
    match (replacement, rule.and_then(|rule| rule.default_text())) {
        (Some(replacement), _) => match replacement.strip_sentinel() {
            Some(rest) => {
                ctx.output.extend_from(encode(&params).tokens());
                ctx.output.extend_from(rest);
            }
            None => ctx.output.extend_from(replacement.tokens()),
        },
        (None, Some(default_text)) => ctx.output.extend_from(default_text.tokens()),
        (None, None) => ctx.output.push(token),
    }

    ctx.params = next_params.unwrap_or_default();
    ctx.steps += 1;
    Ok(())
}
