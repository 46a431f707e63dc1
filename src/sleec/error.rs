//! Error types for every stage of a conversion
//!
//! Structural and configuration errors abort at the first problem. Reference errors
//! are collected across the whole rule set and reported together in one
//! [`ValidationError`]. Solver errors belong to the external check and never come out
//! of the translation itself.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The accepted declaration forms, listed in structural errors
pub const DECLARATION_FORMS: &[&str] = &[
    "event <Name>",
    "measure <Name>: boolean|numeric|scale(<v1>, <v2>, ...)",
    "constant <Name> = <value>",
];

/// The accepted rule forms, listed in structural errors
pub const RULE_FORMS: &[&str] = &[
    "R<n> when <condition> then <action> [within <int> <unit>] [unless (<condition>) then <action>]*",
    "R<n> when <condition> then <action> [within <int> <unit>] [otherwise <action>]",
];

/// A source that does not match the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized {what} '{text}'; expected one of:\n{}", bullet_list(.expected))]
    Syntax {
        line: usize,
        what: &'static str,
        text: String,
        expected: Vec<String>,
    },

    #[error("line {line}: '{marker}' has no matching end marker")]
    UnclosedSection { marker: &'static str, line: usize },

    #[error("line {line}: invalid duration: {reason}")]
    InvalidDuration { line: usize, reason: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Syntax { line, .. }
            | ParseError::UnclosedSection { line, .. }
            | ParseError::InvalidDuration { line, .. } => *line,
        }
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// What an undeclared reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReferenceKind {
    Event,
    Measure,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Event => write!(f, "event"),
            ReferenceKind::Measure => write!(f, "measure"),
        }
    }
}

/// One undeclared name, reported at its first use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ReferenceKind,
    pub name: String,
    pub rule: String,
    pub line: usize,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error: Undefined {} '{}' referenced in rule {} at line {}",
            self.kind, self.name, self.rule, self.line
        )
    }
}

/// Every undeclared reference in a program, with declarations ready to paste
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    /// Sorted, deduplicated
    pub missing_events: Vec<String>,
    /// Sorted, deduplicated
    pub missing_measures: Vec<String>,
}

impl ValidationError {
    /// The declaration lines that would fix every violation
    pub fn suggestions(&self) -> Vec<String> {
        self.missing_events
            .iter()
            .map(|name| format!("event {}", name))
            .chain(
                self.missing_measures
                    .iter()
                    .map(|name| format!("measure {}: boolean", name)),
            )
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed:")?;
        for violation in &self.violations {
            writeln!(f, "{}", violation)?;
        }
        writeln!(f)?;
        write!(f, "Please add these definitions to your SLEEC file:")?;
        if !self.missing_events.is_empty() {
            write!(f, "\nEvents:")?;
            for name in &self.missing_events {
                write!(f, "\nevent {}", name)?;
            }
        }
        if !self.missing_measures.is_empty() {
            write!(f, "\nMeasures:")?;
            for name in &self.missing_measures {
                write!(f, "\nmeasure {}: boolean", name)?;
            }
        }
        Ok(())
    }
}

/// Invalid configuration, rejected before any conversion starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Failure of the external solver check
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to run solver '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("solver did not finish within {seconds}s")]
    TimedOut { seconds: u64 },

    #[error("solver reported a problem (exit status {}):\n{output}", status_text(.status))]
    Failed { status: Option<i32>, output: String },
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

/// Any failure of a conversion call
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
