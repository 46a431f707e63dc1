//! Reference validation
//!
//! Every event in action position (primary, default or exception action, with any
//! `not` removed) must be a declared event, and every `{measure}` in a rule or
//! exception condition must be a declared measure. Names are compared exactly as
//! written.
//!
//! The whole rule set is checked before failing. Each missing name is reported once,
//! at its first use, and the error carries sorted declaration suggestions.

use crate::sleec::ast::Program;
use crate::sleec::error::{ReferenceKind, ValidationError, Violation};
use std::collections::{BTreeSet, HashSet};

pub fn validate(program: &Program) -> Result<(), ValidationError> {
    let events: HashSet<&str> = program.events.iter().map(|e| e.name.as_str()).collect();
    let measures: HashSet<&str> = program.measures.iter().map(|m| m.name.as_str()).collect();

    let mut violations = Vec::new();
    let mut reported: HashSet<(ReferenceKind, &str)> = HashSet::new();
    let mut missing_events = BTreeSet::new();
    let mut missing_measures = BTreeSet::new();

    for rule in &program.rules {
        for action in rule.actions() {
            let name = action.event.as_str();
            if !events.contains(name) && reported.insert((ReferenceKind::Event, name)) {
                missing_events.insert(name.to_string());
                violations.push(Violation {
                    kind: ReferenceKind::Event,
                    name: name.to_string(),
                    rule: rule.id.clone(),
                    line: rule.line,
                });
            }
        }

        for condition in rule.conditions() {
            for name in condition.measures() {
                if !measures.contains(name) && reported.insert((ReferenceKind::Measure, name)) {
                    missing_measures.insert(name.to_string());
                    violations.push(Violation {
                        kind: ReferenceKind::Measure,
                        name: name.to_string(),
                        rule: rule.id.clone(),
                        line: rule.line,
                    });
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            violations,
            missing_events: missing_events.into_iter().collect(),
            missing_measures: missing_measures.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleec::parsing::parse;

    fn check(source: &str) -> Result<(), ValidationError> {
        validate(&parse(source).expect("source to parse"))
    }

    #[test]
    fn test_declared_references_pass() {
        let source = "def_start\nevent Door\nevent Alarm\nmeasure isNight: boolean\ndef_end\n\
                      rule_start\nR1 when Door and not {isNight} then Alarm\nrule_end";
        assert_eq!(check(source), Ok(()));
    }

    #[test]
    fn test_condition_events_are_not_checked() {
        let source = "def_start\nevent Alarm\ndef_end\nrule_start\nR1 when Mystery then Alarm\nrule_end";
        assert_eq!(check(source), Ok(()));
    }

    #[test]
    fn test_negated_action_is_checked_without_not() {
        let source = "def_start\nevent A\ndef_end\nrule_start\nR1 when A then not Ghost\nrule_end";
        let err = check(source).expect_err("Ghost is undeclared");
        assert_eq!(err.missing_events, vec!["Ghost".to_string()]);
    }

    #[test]
    fn test_collects_everything_once() {
        let source = "def_start\nevent A\ndef_end\nrule_start\n\
                      R1 when A and {m1} then Zed\n\
                      R2 when {m1} then Bee unless ({m2}) then Zed\n\
                      R3 when A then Bee otherwise Cee\n\
                      rule_end";
        let err = check(source).expect_err("several references are undeclared");
        assert_eq!(err.missing_events, vec!["Bee", "Cee", "Zed"]);
        assert_eq!(err.missing_measures, vec!["m1", "m2"]);
        assert_eq!(err.violations.len(), 5);
        assert_eq!(err.violations[0].name, "Zed");
        assert_eq!(err.violations[0].rule, "R1");
        assert_eq!(err.violations[0].line, 5);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let source = "def_start\nevent alarm\ndef_end\nrule_start\nR1 when A then Alarm\nrule_end";
        let err = check(source).expect_err("case differs");
        assert_eq!(err.missing_events, vec!["Alarm"]);
    }
}
