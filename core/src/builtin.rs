//! Ready-made production functions that only depend on rule config and the
//! random sequence, so they work for any global data and state type.
//!
//! | name          | config keys                         | effect                               |
//! |---------------|-------------------------------------|--------------------------------------|
//! | `choose`      | `options`, `weights`                | stochastic pick of a replacement     |
//! | `random`      | `min`, `max`, `precision`, `emit`, `then` | draws a value for the next symbol or the output |
//! | `passthrough` | `then`, `forward`                   | keeps received params in the output  |

use std::str::FromStr;

use thiserror::Error;

use sprig_types::{Axiom, SENTINEL, encode};

use crate::context::BuildContext;
use crate::diagnostics::LogLevel;
use crate::errors::ProductionError;
use crate::rule::{Produced, ProductionFn, Rule, RuleConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Choose,
    Random,
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown builtin production '{0}' (expected choose, random or passthrough)")]
pub struct UnknownBuiltin(pub String);

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Choose, Builtin::Random, Builtin::Passthrough];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Choose => "choose",
            Builtin::Random => "random",
            Builtin::Passthrough => "passthrough",
        }
    }

    #[must_use]
    pub fn production<G: 'static, S: 'static>(self) -> Box<ProductionFn<G, S>> {
        match self {
            Builtin::Choose => Box::new(choose::<G, S>),
            Builtin::Random => Box::new(random::<G, S>),
            Builtin::Passthrough => Box::new(passthrough::<G, S>),
        }
    }

    /// A rule running this builtin with `config`.
    #[must_use]
    pub fn rule<G: 'static, S: 'static>(self, config: RuleConfig) -> Rule<G, S> {
        Rule::identity()
            .with_production(self.production())
            .with_config(config)
    }
}

impl FromStr for Builtin {
    type Err = UnknownBuiltin;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Builtin::ALL
            .into_iter()
            .find(|builtin| builtin.name() == name)
            .ok_or_else(|| UnknownBuiltin(name.to_string()))
    }
}

/// Pick one of `options`, weighted by `weights` (uniform when absent).
pub fn choose<G, S>(
    config: &RuleConfig,
    ctx: &mut BuildContext<'_, G, S>,
    _params: &[String],
) -> Result<Produced, ProductionError> {
    let options = config
        .get_str_list("options")
        .filter(|options| !options.is_empty())
        .ok_or_else(|| ProductionError::new("choose: `options` must be a non-empty string list"))?;
    let weights = match config.get("weights") {
        None => vec![1.0; options.len()],
        Some(_) => config
            .get_f64_list("weights")
            .ok_or_else(|| ProductionError::new("choose: `weights` must be a number list"))?,
    };
    if weights.len() != options.len() {
        return Err(ProductionError::new(format!(
            "choose: {} weights for {} options",
            weights.len(),
            options.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ProductionError::new(
            "choose: weights must be finite and non-negative",
        ));
    }
    let Some(last_positive) = weights.iter().rposition(|w| *w > 0.0) else {
        return Err(ProductionError::new("choose: weights sum to zero"));
    };

    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(ProductionError::new("choose: weights sum to infinity"));
    }
    let mut target = ctx.next_real() * total;
    let mut index = last_positive;
    for (i, weight) in weights.iter().enumerate() {
        if target < *weight {
            index = i;
            break;
        }
        target -= weight;
    }

    ctx.log(LogLevel::Verbose, &format!("chose option {index}: {}", options[index]));
    Ok(Produced::replace(options[index]))
}

/// Decimal digits an `f64` can meaningfully carry.
const MAX_PRECISION: u64 = 17;

/// Draw a value in `[min, max)`.
///
/// `emit = "next"` (default) hands `[value]` to the next symbol and keeps the
/// rule's default text; `emit = "output"` writes `(value)` followed by `then`.
pub fn random<G, S>(
    config: &RuleConfig,
    ctx: &mut BuildContext<'_, G, S>,
    _params: &[String],
) -> Result<Produced, ProductionError> {
    let min = config.get_f64("min").unwrap_or(0.0);
    let max = config.get_f64("max").unwrap_or(1.0);
    if !(min.is_finite() && max.is_finite() && min <= max) {
        return Err(ProductionError::new(format!(
            "random: invalid range [{min}, {max})"
        )));
    }

    let precision = match config.get("precision") {
        None => None,
        Some(raw) => Some(
            raw.as_u64()
                .filter(|digits| *digits <= MAX_PRECISION)
                .ok_or_else(|| ProductionError::new("random: precision must be 0-17"))?,
        ),
    };

    let value = min + ctx.next_real() * (max - min);
    let text = match precision {
        Some(digits) => format!("{value:.*}", digits as usize),
        None => format!("{value}"),
    };
    ctx.log(LogLevel::Info, &format!("drew {text}"));

    match config.get_str("emit").unwrap_or("next") {
        "next" => Ok(Produced::pass_on([text])),
        "output" => {
            let mut out = encode(&[text]);
            out.extend_from(Axiom::from(config.get_str("then").unwrap_or_default()).tokens());
            Ok(Produced {
                replacement: Some(out),
                next_params: None,
            })
        }
        other => Err(ProductionError::new(format!(
            "random: `emit` must be \"next\" or \"output\", got {other:?}"
        ))),
    }
}

/// Keep the received parameters in the output, followed by `then`. With
/// `forward = true` they are also handed to the next symbol.
pub fn passthrough<G, S>(
    config: &RuleConfig,
    _ctx: &mut BuildContext<'_, G, S>,
    params: &[String],
) -> Result<Produced, ProductionError> {
    let mut text = String::from(SENTINEL);
    text.push_str(config.get_str("then").unwrap_or_default());
    let produced = Produced::replace(text);
    if config.get_bool("forward").unwrap_or(false) {
        Ok(produced.with_next(params.iter().cloned()))
    } else {
        Ok(produced)
    }
}
