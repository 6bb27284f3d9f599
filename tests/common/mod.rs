//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use sprig_core::{Engine, Produced, Rule, RuleRegistry};

/// Parameter lists seen by a recording rule, in call order.
pub type Seen = Rc<RefCell<Vec<Vec<String>>>>;

pub fn seen() -> Seen {
    Rc::new(RefCell::new(Vec::new()))
}

/// A rule that records the params it receives and keeps its default text.
pub fn recording_rule(seen: &Seen) -> Rule<(), ()> {
    let seen = Rc::clone(seen);
    Rule::production(move |_, _, params| {
        seen.borrow_mut().push(params.to_vec());
        Ok(Produced::fallback())
    })
}

/// A rule that records every value it draws from the shared random sequence.
pub fn drawing_rule(draws: &Rc<RefCell<Vec<f64>>>) -> Rule<(), ()> {
    let draws = Rc::clone(draws);
    Rule::production(move |_, ctx, _| {
        draws.borrow_mut().push(ctx.next_real());
        Ok(Produced::fallback())
    })
}

/// Seeded engine with unit global data and state.
pub fn engine(axiom: &str, rules: RuleRegistry<(), ()>) -> Engine {
    Engine::builder(axiom).seed(1).build(rules)
}

/// Derive `generations` times and return the final axiom text.
pub fn derive(axiom: &str, rules: RuleRegistry<(), ()>, generations: usize) -> String {
    let mut engine = engine(axiom, rules);
    engine
        .advance_by(generations, None)
        .expect("derivation succeeds");
    engine.axiom().to_string()
}

/// Write a system definition into `dir` and return its path.
pub fn write_system(dir: &Path, name: &str, toml: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, toml).expect("write system file");
    path
}

pub const BINARY_TREE: &str = r#"
axiom = "X"
seed = 11
generations = 3

[rules.X]
default = "F[+X][-X]"

[rules.F]
default = "FF"
"#;

pub const STOCHASTIC_TREE: &str = r#"
axiom = "X"
seed = 2024
generations = 4

[rules.X]
builtin = "choose"
[rules.X.config]
options = ["F[+X]F[-X]+X", "F[-X]F[+X]-X", "F[X]X"]
weights = [2.0, 1.0, 1.0]

[rules.F]
default = "FF"
"#;
