//! Condition to rule-body translation
//!
//! Names are case-folded, then:
//!
//! - `{m}` becomes `holds_at(m, T)` and `{m} = v` becomes `holds_at(m, v, T)`
//! - a declared event becomes `happens(e, T, T)`, or `happens(e, T, T2)` when the
//!   event has a bounded window; any other name stays a bare atom
//! - `and` joins with `, `, `or` joins with `; `, `not` stays a prefix
//!
//! Grouping parentheses from the source do not survive: the condition tree already
//! carries the grouping, and relation argument lists are produced by [`Atom`] itself.
//! Time-domain conjuncts are added once, by [`close`], for the whole body.
//!
//! Negating a compound fragment wraps it whole (`not (...)`). That is not an
//! equivalent negation for bodies with `;` and is logged as a warning.

use crate::sleec::ast::Condition;
use crate::sleec::encoding::asp::{normalize, value_term, Atom, T, T2};
use crate::sleec::encoding::events::{EventPartition, Timing};
use tracing::warn;

/// A translated condition, before time-domain conjuncts are added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    /// A single (possibly negated) literal
    pub literal: bool,
    /// Mentions `T2`
    pub windowed: bool,
}

pub struct Translator<'a> {
    events: &'a EventPartition,
}

impl<'a> Translator<'a> {
    pub fn new(events: &'a EventPartition) -> Self {
        Self { events }
    }

    pub fn translate(&self, condition: &Condition) -> Fragment {
        match condition {
            Condition::Name(name) => match self.events.timing(name) {
                Some(timing) => {
                    let windowed = matches!(timing, Timing::Window(_));
                    literal(Atom::happens(name, windowed).to_string(), windowed)
                }
                None => literal(normalize(name), false),
            },
            Condition::Measure(measure) => literal(Atom::holds_at(measure).to_string(), false),
            Condition::MeasureEquals { measure, value } => literal(
                Atom::holds_at_value(measure, value_term(value)).to_string(),
                false,
            ),
            Condition::Not(inner) => negate(&self.translate(inner)),
            Condition::And(items) => self.join(items, ", "),
            Condition::Or(items) => self.join(items, "; "),
        }
    }

    fn join(&self, items: &[Condition], separator: &str) -> Fragment {
        let parts: Vec<Fragment> = items.iter().map(|item| self.translate(item)).collect();
        Fragment {
            text: parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(separator),
            literal: false,
            windowed: parts.iter().any(|p| p.windowed),
        }
    }
}

fn literal(text: String, windowed: bool) -> Fragment {
    Fragment {
        text,
        literal: true,
        windowed,
    }
}

/// Negate a fragment as one block
pub fn negate(fragment: &Fragment) -> Fragment {
    if fragment.literal {
        return Fragment {
            text: format!("not {}", fragment.text),
            ..fragment.clone()
        };
    }
    warn!(
        body = %fragment.text,
        "negating a compound condition as a whole; the result is not an equivalent negation"
    );
    Fragment {
        text: format!("not ({})", fragment.text),
        literal: false,
        windowed: fragment.windowed,
    }
}

/// Conjoin fragments and append `time(T)`, plus `time(T2)` if any part is windowed
pub fn close(parts: &[Fragment]) -> String {
    let mut body: Vec<String> = parts.iter().map(|p| p.text.clone()).collect();
    body.push(Atom::time(T).to_string());
    if parts.iter().any(|p| p.windowed) {
        body.push(Atom::time(T2).to_string());
    }
    body.join(", ")
}
