//! The parsed SLEEC model
//!
//! A [`Program`] owns four ordered lists: events, measures, constants and rules. The
//! parser builds it once per source and nothing mutates it afterwards; the encoder
//! only derives read-only views from it.
//!
//! Names are stored exactly as written. Case folding happens at encoding time.

use serde::Serialize;
use std::fmt;

/// A named atomic occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub line: usize,
}

/// The value domain of a measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum MeasureKind {
    /// Present or absent at each time point
    Boolean,
    /// One integer from the configured range at each time point
    Numeric,
    /// Exactly one of the listed values at each time point. Never empty.
    Scale(Vec<String>),
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureKind::Boolean => write!(f, "boolean"),
            MeasureKind::Numeric => write!(f, "numeric"),
            MeasureKind::Scale(values) => write!(f, "scale({})", values.join(", ")),
        }
    }
}

/// A named observable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measure {
    pub name: String,
    pub kind: MeasureKind,
    pub line: usize,
}

/// A named literal binding, carried through to the domain facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    pub name: String,
    /// Source text of the value, as written after `=`
    pub value: String,
    pub line: usize,
}

/// A trigger condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// A bare name, normally an event
    Name(String),
    /// `{measure}`
    Measure(String),
    /// `{measure} = value`
    MeasureEquals { measure: String, value: String },
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    /// Every name used in event position, in source order
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit(&mut |c| {
            if let Condition::Name(name) = c {
                out.push(name.as_str());
            }
        });
        out
    }

    /// Every `{measure}` reference, in source order
    pub fn measures(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit(&mut |c| match c {
            Condition::Measure(m) | Condition::MeasureEquals { measure: m, .. } => {
                out.push(m.as_str())
            }
            _ => {}
        });
        out
    }

    fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Condition)) {
        f(self);
        match self {
            Condition::Not(inner) => inner.visit(f),
            Condition::And(items) | Condition::Or(items) => {
                for item in items {
                    item.visit(f);
                }
            }
            _ => {}
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent_binds_tighter: bool) -> fmt::Result {
        let needs_parens = match self {
            Condition::Or(_) => parent_binds_tighter,
            Condition::And(_) => parent_binds_tighter,
            _ => false,
        };
        if needs_parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Renders the condition back in SLEEC syntax, adding parentheses only where needed
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Name(name) => write!(f, "{}", name),
            Condition::Measure(m) => write!(f, "{{{}}}", m),
            Condition::MeasureEquals { measure, value } => write!(f, "{{{}}} = {}", measure, value),
            Condition::Not(inner) => {
                write!(f, "not ")?;
                inner.fmt_operand(f, true)
            }
            Condition::And(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    item.fmt_operand(f, matches!(item, Condition::Or(_)))?;
                }
                Ok(())
            }
            Condition::Or(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    item.fmt_operand(f, false)?;
                }
                Ok(())
            }
        }
    }
}

/// The event a rule branch requires, or forbids when negated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub event: String,
    pub negated: bool,
}

impl Action {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            negated: false,
        }
    }

    pub fn negated(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            negated: true,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "not {}", self.event)
        } else {
            write!(f, "{}", self.event)
        }
    }
}

/// An `unless (<condition>) then <action>` clause.
///
/// Priority is the position in [`Rule::exceptions`]: later clauses win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exception {
    pub condition: Condition,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// `R` followed by digits
    pub id: String,
    pub condition: Condition,
    pub action: Action,
    pub line: usize,
    /// Bound in base time units within which the action must follow the trigger
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Action>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<Exception>,
}

impl Rule {
    /// Every action in the rule: primary, default, then exceptions
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        std::iter::once(&self.action)
            .chain(self.otherwise.iter())
            .chain(self.exceptions.iter().map(|e| &e.action))
    }

    /// The rule condition followed by every exception condition
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        std::iter::once(&self.condition).chain(self.exceptions.iter().map(|e| &e.condition))
    }
}

/// A parsed SLEEC document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Program {
    pub events: Vec<Event>,
    pub measures: Vec<Measure>,
    pub constants: Vec<Constant>,
    pub rules: Vec<Rule>,
}

impl Program {
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.name == name)
    }
}
