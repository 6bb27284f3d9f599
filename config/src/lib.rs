//! L-system definitions loaded from TOML.
//!
//! ```toml
//! axiom = "(0)X"
//! seed = 7
//! generations = 4
//! log_level = 1
//!
//! [rules.F]
//! default = "FF"
//!
//! [rules.X]
//! default = "F[+X][-X]FX"
//! builtin = "choose"
//! log_level = 3
//! [rules.X.config]
//! options = ["F[+X]F[-X]+X", "F[-X]F[+X]-X"]
//! weights = [2.0, 1.0]
//! ```
//!
//! Raw deserialization structs stay private; [`SystemConfig`] only exists
//! once every rule key is a single non-structural character and every
//! builtin name resolves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

use sprig_core::builtin::UnknownBuiltin;
use sprig_core::{Builtin, Engine, LogLevel, RegistryError, Rule, RuleConfig, RuleRegistry};
use sprig_types::{Axiom, Token};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", display_path(.path.as_deref()))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "<inline>".to_string(), |path| path.display().to_string())
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } => Some(path),
            ConfigError::Parse { path, .. } => path.as_deref(),
            ConfigError::Registry(_) => None,
        }
    }
}

/// Validation failures raised while resolving the raw TOML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemConfigError {
    #[error("rule key {0:?} must be exactly one character")]
    RuleKeyLength(String),
    #[error("rule key '{0}' is a structural character")]
    ReservedSymbol(char),
    #[error("rule '{symbol}': {source}")]
    UnknownBuiltin {
        symbol: char,
        #[source]
        source: UnknownBuiltin,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSystemConfig {
    axiom: String,
    seed: Option<u64>,
    generations: Option<usize>,
    log_level: Option<LogLevel>,
    max_axiom_len: Option<usize>,
    #[serde(default)]
    rules: BTreeMap<String, RawRuleConfig>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleConfig {
    default: Option<String>,
    builtin: Option<String>,
    log_level: Option<LogLevel>,
    #[serde(default)]
    config: RuleConfig,
}

/// One resolved `[rules.X]` table.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    symbol: char,
    default_text: Option<Axiom>,
    builtin: Option<Builtin>,
    log_level: Option<LogLevel>,
    config: RuleConfig,
}

impl RuleSpec {
    #[must_use]
    pub fn symbol(&self) -> char {
        self.symbol
    }

    #[must_use]
    pub fn default_text(&self) -> Option<&Axiom> {
        self.default_text.as_ref()
    }

    #[must_use]
    pub fn builtin(&self) -> Option<Builtin> {
        self.builtin
    }

    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    #[must_use]
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    fn to_rule<G: 'static, S: 'static>(&self) -> Rule<G, S> {
        let mut rule = match self.builtin {
            Some(builtin) => builtin.rule(self.config.clone()),
            None => Rule::identity().with_config(self.config.clone()),
        };
        if let Some(text) = &self.default_text {
            rule = rule.with_default(text.clone());
        }
        if let Some(level) = self.log_level {
            rule = rule.with_log_level(level);
        }
        rule
    }
}

fn resolve_rule(key: String, raw: RawRuleConfig) -> Result<RuleSpec, SystemConfigError> {
    let mut chars = key.chars();
    let symbol = match (chars.next(), chars.next()) {
        (Some(symbol), None) => symbol,
        _ => return Err(SystemConfigError::RuleKeyLength(key)),
    };
    if Token::is_reserved(symbol) {
        return Err(SystemConfigError::ReservedSymbol(symbol));
    }
    let builtin = raw
        .builtin
        .as_deref()
        .map(str::parse::<Builtin>)
        .transpose()
        .map_err(|source| SystemConfigError::UnknownBuiltin { symbol, source })?;
    Ok(RuleSpec {
        symbol,
        default_text: raw.default.map(Axiom::from),
        builtin,
        log_level: raw.log_level,
        config: raw.config,
    })
}

/// A validated L-system definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSystemConfig")]
pub struct SystemConfig {
    axiom: Axiom,
    seed: Option<u64>,
    generations: Option<usize>,
    log_level: Option<LogLevel>,
    max_axiom_len: Option<usize>,
    rules: Vec<RuleSpec>,
}

impl TryFrom<RawSystemConfig> for SystemConfig {
    type Error = SystemConfigError;

    fn try_from(raw: RawSystemConfig) -> Result<Self, Self::Error> {
        let rules = raw
            .rules
            .into_iter()
            .map(|(key, rule)| resolve_rule(key, rule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            axiom: Axiom::from(expand_env_vars(&raw.axiom)),
            seed: raw.seed,
            generations: raw.generations,
            log_level: raw.log_level,
            max_axiom_len: raw.max_axiom_len,
            rules,
        })
    }
}

impl SystemConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { path: None, source })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read system at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse system at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: Some(path.to_path_buf()),
                    source: err,
                })
            }
        }
    }

    /// `~/.sprig/system.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".sprig").join("system.toml"))
    }

    #[must_use]
    pub fn axiom(&self) -> &Axiom {
        &self.axiom
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn generations(&self) -> Option<usize> {
        self.generations
    }

    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    #[must_use]
    pub fn max_axiom_len(&self) -> Option<usize> {
        self.max_axiom_len
    }

    /// Rules in symbol order.
    #[must_use]
    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    pub fn registry<G: 'static, S: 'static>(&self) -> Result<RuleRegistry<G, S>, ConfigError> {
        let mut registry = RuleRegistry::new();
        registry.set_default_log_level(self.log_level);
        for spec in &self.rules {
            registry.insert(spec.symbol, spec.to_rule())?;
        }
        Ok(registry)
    }

    /// Build an engine for this system with caller-supplied global data and
    /// state template.
    pub fn engine<G: 'static, S: 'static>(
        &self,
        global: G,
        state: S,
    ) -> Result<Engine<G, S>, ConfigError> {
        let registry = self.registry()?;
        Ok(Engine::builder(self.axiom.clone())
            .global(global)
            .state(state)
            .maybe_seed(self.seed)
            .build(registry))
    }
}

/// Replace `${VAR}` with the value of the environment variable (empty when
/// unset). An unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        let end = start + 2 + end_rel;
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}
