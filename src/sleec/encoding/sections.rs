//! The six sections of a generated program
//!
//! Each function returns one section as text, or `None` when the section would be
//! empty. The encoder joins them in order with the configured separator.

use crate::sleec::ast::{MeasureKind, Program};
use crate::sleec::config::ConverterConfig;
use crate::sleec::encoding::asp::{self, not, value_term, Atom, Term, T, T2};
use crate::sleec::encoding::events::EventPartition;
use crate::sleec::encoding::rules::RuleEncoding;

const RULE_LINE: &str =
    "% =============================================================================";

fn banner(title: &str) -> String {
    format!("{RULE_LINE}\n% {title}\n{RULE_LINE}")
}

/// Banner followed by the non-empty blocks, separated by blank lines
fn section(title: &str, blocks: Vec<String>) -> Option<String> {
    let blocks: Vec<String> = blocks.into_iter().filter(|b| !b.is_empty()).collect();
    if blocks.is_empty() {
        return None;
    }
    Some(format!("{}\n\n{}", banner(title), blocks.join("\n\n")))
}

fn labelled(label: &str, lines: Vec<String>) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("% {}\n{}", label, lines.join("\n"))
    }
}

/// Commentary echoing the source rules
pub fn header(program: &Program) -> String {
    let mut lines = vec![
        RULE_LINE.to_string(),
        "% SLEEC to Clingo Conversion".to_string(),
        RULE_LINE.to_string(),
        "%".to_string(),
        "% This file was automatically generated from SLEEC rules.".to_string(),
        "% Format: antecedent/consequent structure with rule satisfaction logic".to_string(),
    ];
    if !program.rules.is_empty() {
        lines.push("%".to_string());
        lines.push("% Generated Rules:".to_string());
    }
    for rule in &program.rules {
        let within = rule
            .within
            .map(|w| format!(" within {}", w))
            .unwrap_or_default();
        lines.push(format!(
            "% {}: {} -> {}{}",
            rule.id, rule.condition, rule.action, within
        ));
        for exception in &rule.exceptions {
            lines.push(format!(
                "%   unless {} -> {}",
                exception.condition, exception.action
            ));
        }
        if let Some(default) = &rule.otherwise {
            lines.push(format!("%   otherwise -> {}", default));
        }
    }
    lines.join("\n")
}

/// Time horizon plus event, measure and constant facts
pub fn domain(program: &Program, events: &EventPartition, config: &ConverterConfig) -> Option<String> {
    let time = format!("time(0..{}).", config.max_time);
    let event_facts = events
        .declared()
        .iter()
        .map(|e| asp::fact(&Atom::new("event", vec![Term::name(e)])))
        .collect();
    let measure_facts = program
        .measures
        .iter()
        .map(|m| asp::fact(&Atom::new("measure", vec![Term::name(&m.name)])))
        .collect();
    let constant_facts = program
        .constants
        .iter()
        .map(|c| {
            asp::fact(&Atom::new(
                "constant",
                vec![Term::name(&c.name), value_term(&c.value)],
            ))
        })
        .collect();

    section(
        "DOMAIN DEFINITIONS",
        vec![
            time,
            labelled("Events", event_facts),
            labelled("Measures", measure_facts),
            labelled("Constants", constant_facts),
        ],
    )
}

/// Antecedent/consequent definitions of every rule
pub fn rule_definitions(program: &Program, encodings: &[RuleEncoding]) -> Option<String> {
    let blocks = program
        .rules
        .iter()
        .zip(encodings)
        .map(|(rule, encoding)| encoding.render(rule))
        .collect();
    section("SLEEC RULE DEFINITIONS", blocks)
}

/// `holds/2` over both satisfaction modes, per-branch definitions, and the hard constraint
pub fn satisfaction(encodings: &[RuleEncoding]) -> Option<String> {
    let ids: Vec<&str> = encodings.iter().flat_map(|e| e.branch_ids()).collect();
    if ids.is_empty() {
        return None;
    }

    let general = ["holds_nv", "holds_v"]
        .iter()
        .map(|mode| format!("holds(G, T):-\n    time(T),\n    exp(G),\n    {mode}(G, T)."))
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut blocks = vec![format!("% General holds logic\n{general}")];
    for id in ids {
        let antecedent = Atom::of_branch("antecedent", id);
        let consequent = Atom::of_branch("consequent", id);
        blocks.push(format!(
            "% Non-vacuous satisfaction for {id}\n{}:-\n    time(T),\n    {antecedent},\n    {consequent}.",
            Atom::of_branch("holds_nv", id)
        ));
        blocks.push(format!(
            "% Vacuous satisfaction for {id}\n{}:-\n    time(T),\n    {},\n    {}.",
            Atom::of_branch("holds_v", id),
            not(&antecedent),
            not(&consequent)
        ));
    }
    blocks.push(
        "% Hard constraint: every rule must be satisfied at every time point\n\
         :- exp(R), time(T), not holds(R,T)."
            .to_string(),
    );
    section("RULE SATISFACTION LOGIC", blocks)
}

fn choice(atom: &Atom) -> String {
    format!("{{ {} }} :- {}.", atom, Atom::time(T))
}

fn exactly_one(elements: &str) -> String {
    format!("1 {{ {} }} 1 :- {}.", elements, Atom::time(T))
}

/// Free choice rules for triggers, actions and measures
pub fn choices(program: &Program, events: &EventPartition, config: &ConverterConfig) -> Option<String> {
    let triggers = events
        .triggers()
        .iter()
        .map(|e| choice(&Atom::happens(e, false)))
        .collect();

    let mut actions: Vec<String> = events
        .instant_actions()
        .map(|e| choice(&Atom::happens(e, false)))
        .collect();
    actions.extend(events.windowed_actions().map(|(e, window)| {
        format!(
            "{{ {} : {}, {T2} >= {T}, {T2} <= {T} + {} }} :- {}.",
            Atom::happens(e, true),
            Atom::time(T2),
            window,
            Atom::time(T)
        )
    }));

    let measures = program
        .measures
        .iter()
        .map(|m| match &m.kind {
            MeasureKind::Boolean => choice(&Atom::holds_at(&m.name)),
            MeasureKind::Numeric => exactly_one(&format!(
                "{} : V = {}..{}",
                Atom::holds_at_value(&m.name, Term::Variable("V")),
                config.numeric_min,
                config.numeric_max
            )),
            MeasureKind::Scale(values) => exactly_one(
                &values
                    .iter()
                    .map(|v| Atom::holds_at_value(&m.name, value_term(v)).to_string())
                    .collect::<Vec<_>>()
                    .join(" ; "),
            ),
        })
        .collect();

    section(
        "ACTION GENERATION AND CONSTRAINTS",
        vec![
            labelled("Triggering event instantiation", triggers),
            labelled("Action event instantiation", actions),
            labelled("Measure instantiation", measures),
        ],
    )
}

/// `#show` directives
pub fn output(config: &ConverterConfig) -> Option<String> {
    let shows = config
        .show_predicates
        .iter()
        .map(|p| format!("#show {}.", p))
        .collect::<Vec<_>>()
        .join("\n");
    section("OUTPUT SPECIFICATION", vec![shows])
}
