//! Reference validation across whole documents

use sleec::sleec::error::ReferenceKind;
use sleec::sleec::parse;
use sleec::sleec::validation::validate;
use std::fs;

#[test]
fn test_missing_definitions_are_collected() {
    let source = fs::read_to_string("tests/fixtures/missing_definitions.sleec")
        .expect("fixture is readable");
    let program = parse(&source).expect("fixture parses");
    let err = validate(&program).expect_err("fixture has undeclared names");

    let reported: Vec<(ReferenceKind, &str, &str, usize)> = err
        .violations
        .iter()
        .map(|v| (v.kind, v.name.as_str(), v.rule.as_str(), v.line))
        .collect();
    assert_eq!(
        reported,
        vec![
            (ReferenceKind::Event, "Stop", "R1", 6),
            (ReferenceKind::Event, "Brake", "R2", 7),
            (ReferenceKind::Measure, "speed", "R2", 7),
            (ReferenceKind::Measure, "obstacle", "R2", 7),
        ]
    );

    assert_eq!(
        err.suggestions(),
        vec![
            "event Brake",
            "event Stop",
            "measure obstacle: boolean",
            "measure speed: boolean",
        ]
    );

    let message = err.to_string();
    assert!(message.starts_with("Validation failed:\n"));
    assert!(message.contains("Error: Undefined event 'Stop' referenced in rule R1 at line 6"));
    assert_eq!(message.matches("\nevent Stop").count(), 1);
    assert!(message.contains("Please add these definitions to your SLEEC file:"));
}

#[test]
fn test_measures_in_conditions_are_not_events() {
    let program = parse(
        "def_start\nmeasure isNight: boolean\nevent Door\nevent Alarm\ndef_end\n\
         rule_start\nR1 when Door and not {isNight} then Alarm\nrule_end",
    )
    .expect("valid source");
    assert!(validate(&program).is_ok());
}

#[test]
fn test_negated_actions_must_be_declared() {
    let program = parse(
        "def_start\nevent A\nevent B\ndef_end\nrule_start\nR1 when A then B unless (A) then not Ghost\nrule_end",
    )
    .expect("valid source");
    let err = validate(&program).expect_err("Ghost is undeclared");
    assert_eq!(err.missing_events, vec!["Ghost".to_string()]);
    assert!(err.missing_measures.is_empty());
}

#[test]
fn test_names_are_case_sensitive() {
    let program = parse(
        "def_start\nevent alarm\nevent Door\ndef_end\nrule_start\nR1 when Door then Alarm\nrule_end",
    )
    .expect("valid source");
    let err = validate(&program).expect_err("Alarm differs from alarm");
    assert_eq!(err.suggestions(), vec!["event Alarm"]);
}
