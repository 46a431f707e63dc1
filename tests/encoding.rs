//! End-to-end encoding tests: source text in, clingo program out

use proptest::prelude::*;
use sleec::sleec::config::ConverterConfig;
use sleec::sleec::{ConvertError, Converter};
use std::fs;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{}", name)).expect("fixture is readable")
}

fn convert(source: &str) -> String {
    Converter::default()
        .convert_str(source)
        .expect("source converts")
}

#[test]
fn test_single_trigger_single_action() {
    let output = convert("def_start\nevent A\nevent B\ndef_end\nrule_start\nR1 when A then B\nrule_end\n");

    assert!(output.contains("time(0..10)."));
    assert!(output.contains("exp(r1)."));
    assert!(output.contains("antecedent(r1, T) :- happens(a, T, T), time(T)."));
    assert!(output.contains("consequent(r1, T) :- time(T), happens(b, T, T)."));
    assert!(output.contains(":- exp(R), time(T), not holds(R,T)."));
    assert!(output.contains("{ happens(a, T, T) } :- time(T)."));
    assert!(output.contains("{ happens(b, T, T) } :- time(T)."));
}

#[test]
fn test_measure_negation_in_trigger() {
    let output = convert(&fixture("door_alarm.sleec"));

    assert!(output.contains(
        "antecedent(r1, T) :- happens(dooropen, T, T), not holds_at(islocked, T), time(T)."
    ));
    assert!(output.contains("{ holds_at(islocked, T) } :- time(T)."));
    assert!(output.contains("{ happens(dooropen, T, T) } :- time(T)."));
}

fn branch_ids(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix("exp(").and_then(|l| l.strip_suffix(").")))
        .collect()
}

#[test]
fn test_two_unless_clauses_yield_three_branches() {
    let output = convert(
        "def_start\nevent ButtonPress\nevent LightOn\nevent DimLight\nevent Beep\n\
         measure powerSave: boolean\nmeasure emergencyMode: boolean\ndef_end\n\
         rule_start\nR1 when ButtonPress then LightOn\n\
         unless ({powerSave}) then DimLight\n\
         unless ({emergencyMode}) then Beep\nrule_end\n",
    );

    let branches = branch_ids(&output);
    assert_eq!(branches, vec!["r1_primary", "r1_unless1", "r1_unless2"]);

    for id in branches {
        assert!(output.contains(&format!("holds_nv({id}, T):-")));
        assert!(output.contains(&format!("holds_v({id}, T):-")));
    }
    assert!(output.contains(
        "antecedent(r1_primary, T) :- happens(buttonpress, T, T), not holds_at(powersave, T), not holds_at(emergencymode, T), time(T)."
    ));
    assert!(output.contains(
        "antecedent(r1_unless1, T) :- happens(buttonpress, T, T), holds_at(powersave, T), not holds_at(emergencymode, T), time(T)."
    ));
    assert!(output.contains(
        "antecedent(r1_unless2, T) :- happens(buttonpress, T, T), holds_at(emergencymode, T), time(T)."
    ));
    assert!(output.contains("consequent(r1_unless2, T) :- time(T), happens(beep, T, T)."));
}

#[test]
fn test_negated_exception_action_registers_no_branch() {
    let output = convert(&fixture("light_cascade.sleec"));

    assert_eq!(branch_ids(&output), vec!["r1_primary", "r1_unless1"]);
    assert!(!output.contains("r1_unless2"));
    assert!(output.contains(
        "antecedent(r1_primary, T) :- happens(buttonpress, T, T), not holds_at(powersave, T), not holds_at(emergencymode, T), time(T)."
    ));
    assert!(output.contains(
        "antecedent(r1_unless1, T) :- happens(buttonpress, T, T), holds_at(powersave, T), not holds_at(emergencymode, T), time(T)."
    ));
    assert!(output.contains("consequent(r1_primary, T) :- time(T), happens(lighton, T, T)."));
    assert!(output.contains("consequent(r1_unless1, T) :- time(T), happens(dimlight, T, T)."));
}

#[test]
fn test_negated_exception_leaves_trigger_satisfiable() {
    let output = convert(
        "def_start\nevent MotionDetected\nevent TurnOnLight\nmeasure isDaytime: boolean\ndef_end\n\
         rule_start\nR1 when MotionDetected then TurnOnLight unless ({isDaytime}) then not TurnOnLight\nrule_end\n",
    );

    assert_eq!(branch_ids(&output), vec!["r1_primary"]);
    assert!(!output.contains("r1_unless1"));
    assert!(output.contains(
        "antecedent(r1_primary, T) :- happens(motiondetected, T, T), not holds_at(isdaytime, T), time(T)."
    ));
    assert!(output.contains("{ happens(motiondetected, T, T) } :- time(T)."));
}

#[test]
fn test_negated_default_action_registers_no_branch() {
    let output = convert(
        "def_start\nevent A\nevent B\nevent C\ndef_end\nrule_start\nR1 when A then B otherwise not C\nrule_end\n",
    );

    assert_eq!(branch_ids(&output), vec!["r1"]);
    assert!(!output.contains("r1_otherwise"));
    assert!(!output.contains("not happens(a, T, T)"));
}

#[test]
fn test_scale_measure_exactly_one_choice() {
    let output = convert(
        "def_start\nmeasure level: scale(low, medium, high)\nevent A\nevent B\ndef_end\n\
         rule_start\nR1 when A and {level} = high then B\nrule_end\n",
    );

    assert!(output.contains(
        "1 { holds_at(level, low, T) ; holds_at(level, medium, T) ; holds_at(level, high, T) } 1 :- time(T)."
    ));
    assert!(output.contains("antecedent(r1, T) :- happens(a, T, T), holds_at(level, high, T), time(T)."));
}

#[test]
fn test_undeclared_action_is_reported_with_suggestion() {
    let source = "def_start\nevent A\ndef_end\nrule_start\nR1 when A then Undeclared\nrule_end\n";
    match Converter::default().convert_str(source) {
        Err(ConvertError::Validation(err)) => {
            assert_eq!(err.suggestions(), vec!["event Undeclared".to_string()]);
            assert!(err.to_string().contains("event Undeclared"));
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_max_time_comes_from_config() {
    let config = ConverterConfig::builder()
        .max_time(25)
        .build()
        .expect("valid config");
    let output = Converter::new(config)
        .expect("valid config")
        .convert_str(&fixture("door_alarm.sleec"))
        .expect("source converts");
    assert!(output.contains("time(0..25)."));
}

#[test]
fn test_output_is_deterministic() {
    let source = fixture("care_robot.sleec");
    assert_eq!(convert(&source), convert(&source));
}

#[test]
fn test_care_robot_snapshot() {
    let output = convert(&fixture("care_robot.sleec"));
    insta::assert_snapshot!("care_robot", output.trim_end());
}

fn cascade_source(exceptions: usize) -> String {
    let mut source = String::from("def_start\nevent Trigger\nevent Act\n");
    for k in 1..=exceptions {
        source.push_str(&format!("event Alt{k}\nmeasure c{k}: boolean\n"));
    }
    source.push_str("def_end\nrule_start\nR1 when Trigger then Act");
    for k in 1..=exceptions {
        source.push_str(&format!(" unless ({{c{k}}}) then Alt{k}"));
    }
    source.push_str("\nrule_end\n");
    source
}

/// Evaluate a branch antecedent for a valuation of the exception measures, with the
/// trigger taken as having happened.
fn fires(antecedent: &str, valuation: &[bool]) -> bool {
    valuation.iter().enumerate().all(|(index, &value)| {
        let atom = format!("holds_at(c{}, T)", index + 1);
        if antecedent.contains(&format!("not {atom}")) {
            !value
        } else if antecedent.contains(&atom) {
            value
        } else {
            true
        }
    })
}

proptest! {
    #[test]
    fn prop_at_most_one_cascade_branch_fires(
        valuation in proptest::collection::vec(any::<bool>(), 1..5)
    ) {
        let output = convert(&cascade_source(valuation.len()));
        let antecedents: Vec<&str> = output
            .lines()
            .filter(|line| line.starts_with("antecedent("))
            .filter_map(|line| line.split_once(" :- "))
            .map(|(_, body)| body.trim_end_matches('.'))
            .collect();
        prop_assert_eq!(antecedents.len(), valuation.len() + 1);

        let firing = antecedents
            .iter()
            .filter(|body| fires(body, &valuation))
            .count();
        prop_assert_eq!(firing, 1);
    }
}
