//! A small model of the clingo syntax the encoder emits
//!
//! Only what the encoding needs: atoms over constants, variables and integers,
//! default-negated literals, facts and normal rules.

use std::fmt;

/// Primary time variable
pub const T: &str = "T";
/// Occurrence time inside a bounded window
pub const T2: &str = "T2";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Constant(String),
    Variable(&'static str),
    Integer(i64),
}

impl Term {
    /// A source name as an ASP constant
    pub fn name(name: &str) -> Self {
        Term::Constant(normalize(name))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{c}"),
            Term::Variable(v) => write!(f, "{v}"),
            Term::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// A predicate applied to terms
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub predicate: &'static str,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: &'static str, args: Vec<Term>) -> Self {
        Self { predicate, args }
    }

    /// `happens(e, T, T)`, or `happens(e, T, T2)` for a bounded window
    pub fn happens(event: &str, windowed: bool) -> Self {
        let end = if windowed { T2 } else { T };
        Self::new(
            "happens",
            vec![Term::name(event), Term::Variable(T), Term::Variable(end)],
        )
    }

    /// `holds_at(m, T)`
    pub fn holds_at(measure: &str) -> Self {
        Self::new("holds_at", vec![Term::name(measure), Term::Variable(T)])
    }

    /// `holds_at(m, v, T)`
    pub fn holds_at_value(measure: &str, value: Term) -> Self {
        Self::new(
            "holds_at",
            vec![Term::name(measure), value, Term::Variable(T)],
        )
    }

    pub fn time(var: &'static str) -> Self {
        Self::new("time", vec![Term::Variable(var)])
    }

    /// `pred(id, T)` for the per-branch predicates
    pub fn of_branch(predicate: &'static str, branch: &str) -> Self {
        Self::new(
            predicate,
            vec![Term::Constant(branch.to_string()), Term::Variable(T)],
        )
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.predicate)
        } else {
            write!(
                f,
                "{}({})",
                self.predicate,
                self.args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }
}

/// `not atom`
pub fn not(atom: &Atom) -> String {
    format!("not {atom}")
}

/// `atom.`
pub fn fact(atom: &Atom) -> String {
    format!("{atom}.")
}

/// `head :- b1, b2, ... .`
pub fn rule<S: AsRef<str>>(head: &Atom, body: &[S]) -> String {
    let body: Vec<&str> = body.iter().map(AsRef::as_ref).collect();
    format!("{} :- {}.", head, body.join(", "))
}

/// Case-fold a source name into an ASP constant
pub fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// A source value as a term: integers stay numeric, names are case-folded and
/// anything else becomes a quoted string.
pub fn value_term(value: &str) -> Term {
    if let Ok(number) = value.parse::<i64>() {
        return Term::Integer(number);
    }
    let is_name = value.starts_with(|c: char| c.is_ascii_alphabetic())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_name {
        return Term::name(value);
    }
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Term::Constant(format!("\"{}\"", inner.replace('"', "\\\"")))
}
