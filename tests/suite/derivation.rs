//! Single-generation derivation tests

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use insta::assert_snapshot;
use sprig_core::{
    BuildContext, DeriveError, Engine, HookMap, Produced, ProductionError, ProductionInfo, Rule,
    RuleConfig, RuleRegistry, ScopeImbalance,
};

use crate::common::{derive, engine, recording_rule, seen};

#[test]
fn unknown_symbol_is_its_own_replacement() {
    assert_eq!(derive("x", RuleRegistry::new(), 1), "x");
}

#[test]
fn collected_params_are_dropped_by_default_rule() {
    let rules = RuleRegistry::new().with_rule('k', Rule::text("Z")).unwrap();
    assert_eq!(derive("(a)(b)k", rules, 1), "Z");
}

#[test]
fn returned_params_reach_following_symbol() {
    let seen = seen();
    let rules = RuleRegistry::new()
        .with_rule('k', Rule::production(|_, _, _| Ok(Produced::pass_on(["r"]))))
        .unwrap()
        .with_rule('n', recording_rule(&seen))
        .unwrap();
    derive("kn", rules, 1);
    assert_eq!(*seen.borrow(), vec![vec!["r".to_string()]]);
}

#[test]
fn sentinel_passes_params_through() {
    let rules = RuleRegistry::new()
        .with_rule('S', Rule::production(|_, _, _| Ok(Produced::replace(".T"))))
        .unwrap();
    assert_eq!(derive("(w)S", rules, 1), "(w)T");
}

#[test]
fn balanced_scopes_derive_and_close() {
    let rules = RuleRegistry::new()
        .with_rule('F', Rule::text("F[+F]F[-F]F"))
        .unwrap();
    assert_snapshot!(derive("F", rules, 2), @"F[+F]F[-F]F[+F[+F]F[-F]F]F[+F]F[-F]F[-F[+F]F[-F]F]F[+F]F[-F]F");
}

#[test]
fn rule_emitting_unmatched_close_fails_next_generation() {
    let rules = RuleRegistry::new().with_rule('A', Rule::text("A]")).unwrap();
    let mut engine = engine("[A]", rules);
    engine.advance(None).unwrap();
    assert_eq!(engine.axiom().to_string(), "[A]]");
    let err = engine.advance(None).unwrap_err();
    assert!(matches!(
        err,
        DeriveError::UnbalancedScope(ScopeImbalance::UnmatchedClose { position: 3 })
    ));
    assert_eq!(engine.generation(), 2);
}

#[test]
fn unterminated_param_aborts() {
    let mut engine = engine("(abc", RuleRegistry::new());
    assert!(matches!(
        engine.advance(None),
        Err(DeriveError::UnterminatedParameter { start: 0 })
    ));
}

#[test]
fn escaped_close_stays_inside_param() {
    let seen = seen();
    let rules = RuleRegistry::new()
        .with_rule('A', recording_rule(&seen))
        .unwrap();
    derive("(f\\)x)(y)A", rules, 1);
    assert_eq!(
        *seen.borrow(),
        vec![vec!["f)x".to_string(), "y".to_string()]]
    );
}

#[test]
fn turtle_state_is_scoped_by_brackets() {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct Turtle {
        heading: i32,
        steps: u32,
    }

    let visits = Rc::new(RefCell::new(Vec::new()));
    let visits_in_rule = Rc::clone(&visits);
    let turn = |_: &RuleConfig,
                ctx: &mut BuildContext<'_, (), Turtle>,
                params: &[String]|
     -> Result<Produced, ProductionError> {
        let degrees = params
            .first()
            .map_or(Ok(90), |raw| raw.parse::<i32>())
            .map_err(|err| ProductionError::with_source("bad angle", err))?;
        ctx.state_mut().heading += degrees;
        Ok(Produced::fallback())
    };
    let rules = RuleRegistry::new()
        .with_rule('+', Rule::production(turn))
        .unwrap()
        .with_rule(
            'F',
            Rule::production(move |_, ctx: &mut BuildContext<'_, (), Turtle>, _| {
                ctx.state_mut().steps += 1;
                visits_in_rule
                    .borrow_mut()
                    .push((ctx.state().heading, ctx.depth()));
                Ok(Produced::fallback())
            }),
        )
        .unwrap();
    let mut engine = Engine::builder("F[(45)+F[(45)+F]F](30)+F")
        .state(Turtle::default())
        .seed(1)
        .build(rules);
    let report = engine.advance(None).unwrap();

    assert_eq!(
        *visits.borrow(),
        vec![(0, 0), (45, 1), (90, 2), (45, 1), (30, 0)]
    );
    assert_eq!(
        report.state,
        Turtle {
            heading: 30,
            steps: 2
        }
    );
    assert_eq!(engine.axiom().to_string(), "F[+F[+F]F]+F");
}

#[test]
fn production_errors_carry_symbol_and_cause() {
    let rules = RuleRegistry::new()
        .with_rule(
            '+',
            Rule::production(|_, _, params: &[String]| {
                let degrees = params
                    .first()
                    .ok_or_else(|| ProductionError::new("missing angle"))?
                    .parse::<i32>()
                    .map_err(|err| ProductionError::with_source("bad angle", err))?;
                Ok(Produced::replace(format!("({degrees})+")))
            }),
        )
        .unwrap();
    let mut engine = engine("(ten)+", rules);
    let err = engine.advance(None).unwrap_err();
    assert_eq!(err.to_string(), "production for '+' at position 5 failed");
    assert_eq!(engine.axiom().to_string(), "(ten)+");
}

#[test]
fn hooks_see_symbol_params_and_generation() {
    let mut log = Vec::new();
    {
        let mut hooks: HookMap<'_> = HashMap::new();
        hooks.insert(
            'A',
            Box::new(|info: &ProductionInfo<'_>| {
                log.push(format!(
                    "g{} @{} {:?} rule={}",
                    info.generation, info.position, info.params, info.has_rule
                ));
            }),
        );
        hooks.insert(
            'B',
            Box::new(|info: &ProductionInfo<'_>| {
                assert!(info.has_rule);
            }),
        );
        let rules = RuleRegistry::new().with_rule('B', Rule::text("A")).unwrap();
        let mut engine = engine("(p)AB", rules);
        engine.advance_by(2, Some(&mut hooks)).unwrap();
    }
    assert_eq!(
        log,
        vec![
            "g1 @3 [\"p\"] rule=false",
            "g2 @0 [] rule=false",
            "g2 @1 [] rule=false",
        ]
    );
}
