//! Rules and the registry mapping symbols to them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sprig_types::{Axiom, Token};

use crate::context::BuildContext;
use crate::diagnostics::LogLevel;
use crate::errors::{ProductionError, RegistryError};

/// Outcome of one production call.
///
/// `replacement` overrides the rule's default text. `next_params` replaces
/// the pending parameter list handed to the next symbol; when it is `None`
/// the pending list is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Produced {
    pub replacement: Option<Axiom>,
    pub next_params: Option<Vec<String>>,
}

impl Produced {
    /// Use the rule's default text and hand nothing on.
    #[must_use]
    pub fn fallback() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn replace(text: impl Into<Axiom>) -> Self {
        Self {
            replacement: Some(text.into()),
            next_params: None,
        }
    }

    /// Use the rule's default text and attach `params` to the next symbol.
    #[must_use]
    pub fn pass_on<I, P>(params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::fallback().with_next(params)
    }

    #[must_use]
    pub fn with_next<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.next_params = Some(params.into_iter().map(Into::into).collect());
        self
    }
}

/// A production function: `(config, context, pending params) -> Produced`.
pub type ProductionFn<G, S> = dyn Fn(&RuleConfig, &mut BuildContext<'_, G, S>, &[String]) -> Result<Produced, ProductionError>;

/// Static rule-local data, e.g. the option list of a stochastic rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleConfig(Map<String, Value>);

impl RuleConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// A list entry, or `None` if the key is missing or any element has the
    /// wrong type.
    #[must_use]
    pub fn get_str_list(&self, key: &str) -> Option<Vec<&str>> {
        self.0
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    #[must_use]
    pub fn get_f64_list(&self, key: &str) -> Option<Vec<f64>> {
        self.0
            .get(key)?
            .as_array()?
            .iter()
            .map(Value::as_f64)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RuleConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The rewrite rule for one symbol. Immutable once registered.
///
/// A rule either has only default text, or a production function that may
/// fall back to the default text. With neither, the symbol rewrites to
/// itself.
pub struct Rule<G, S> {
    default_text: Option<Axiom>,
    produce: Option<Box<ProductionFn<G, S>>>,
    config: RuleConfig,
    log_level: Option<LogLevel>,
}

impl<G, S> Rule<G, S> {
    #[must_use]
    pub fn text(default_text: impl Into<Axiom>) -> Self {
        Self {
            default_text: Some(default_text.into()),
            ..Self::identity()
        }
    }

    /// A rule with no default text and no production.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            default_text: None,
            produce: None,
            config: RuleConfig::default(),
            log_level: None,
        }
    }

    #[must_use]
    pub fn production<F>(produce: F) -> Self
    where
        F: Fn(&RuleConfig, &mut BuildContext<'_, G, S>, &[String]) -> Result<Produced, ProductionError>
            + 'static,
    {
        Self::identity().with_production(Box::new(produce))
    }

    #[must_use]
    pub fn with_production(mut self, produce: Box<ProductionFn<G, S>>) -> Self {
        self.produce = Some(produce);
        self
    }

    #[must_use]
    pub fn with_default(mut self, default_text: impl Into<Axiom>) -> Self {
        self.default_text = Some(default_text.into());
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: RuleConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    #[must_use]
    pub fn default_text(&self) -> Option<&Axiom> {
        self.default_text.as_ref()
    }

    #[must_use]
    pub fn produce(&self) -> Option<&ProductionFn<G, S>> {
        self.produce.as_deref()
    }

    #[must_use]
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }
}

impl<G, S> fmt::Debug for Rule<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("default_text", &self.default_text.as_ref().map(ToString::to_string))
            .field("produce", &self.produce.is_some())
            .field("config", &self.config)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Symbol -> rule mapping.
///
/// Duplicate registration is rejected with [`RegistryError::DuplicateRule`];
/// the first rule registered for a symbol stays in place.
pub struct RuleRegistry<G, S> {
    rules: HashMap<char, Rule<G, S>>,
    default_log_level: Option<LogLevel>,
}

impl<G, S> Default for RuleRegistry<G, S> {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
            default_log_level: None,
        }
    }
}

impl<G, S> RuleRegistry<G, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: char, rule: Rule<G, S>) -> Result<(), RegistryError> {
        if Token::is_reserved(symbol) {
            return Err(RegistryError::ReservedSymbol(symbol));
        }
        if self.rules.contains_key(&symbol) {
            return Err(RegistryError::DuplicateRule(symbol));
        }
        self.rules.insert(symbol, rule);
        Ok(())
    }

    /// Chaining form of [`RuleRegistry::insert`].
    pub fn with_rule(mut self, symbol: char, rule: Rule<G, S>) -> Result<Self, RegistryError> {
        self.insert(symbol, rule)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_default_log_level(mut self, level: LogLevel) -> Self {
        self.default_log_level = Some(level);
        self
    }

    pub fn set_default_log_level(&mut self, level: Option<LogLevel>) {
        self.default_log_level = level;
    }

    #[must_use]
    pub fn get(&self, symbol: char) -> Option<&Rule<G, S>> {
        self.rules.get(&symbol)
    }

    #[must_use]
    pub fn contains(&self, symbol: char) -> bool {
        self.rules.contains_key(&symbol)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered symbols in sorted order.
    #[must_use]
    pub fn symbols(&self) -> Vec<char> {
        let mut symbols: Vec<char> = self.rules.keys().copied().collect();
        symbols.sort_unstable();
        symbols
    }

    #[must_use]
    pub fn default_log_level(&self) -> Option<LogLevel> {
        self.default_log_level
    }

    /// Rule override, then registry default, then `Action`.
    #[must_use]
    pub fn resolve_log_level(&self, symbol: Option<char>) -> LogLevel {
        symbol
            .and_then(|symbol| self.get(symbol))
            .and_then(Rule::log_level)
            .or(self.default_log_level)
            .unwrap_or_default()
    }
}

impl<G, S> fmt::Debug for RuleRegistry<G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("symbols", &self.symbols())
            .field("default_log_level", &self.default_log_level)
            .finish()
    }
}
