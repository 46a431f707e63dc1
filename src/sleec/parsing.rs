//! Parsing SLEEC sources into a [`Program`]
//!
//! Parsing runs in three steps over the token stream from [`lexing`](crate::sleec::lexing):
//!
//! 1. [`sections`] finds the `def_start`/`def_end` and `rule_start`/`rule_end` blocks
//! 2. [`declarations`] parses the definitions block one line at a time
//! 3. [`rules`] splits the rules block at rule identifiers and parses each rule,
//!    using [`condition`] for trigger and exception conditions
//!
//! The grammar pieces are chumsky parsers over [`Token`]s. Structural errors abort the
//! parse at the first problem and carry the 1-based line of the offending token.
//! Reference checks are not done here; see [`validation`](crate::sleec::validation).

pub mod condition;
pub mod declarations;
pub mod rules;
pub mod sections;

use crate::sleec::ast::Program;
use crate::sleec::config::TimeUnit;
use crate::sleec::error::ParseError;
use crate::sleec::lexing::{tokenize, Spanned, Token};
use crate::sleec::location::SourceLocation;
use chumsky::error::Simple;
use chumsky::Stream;
use tracing::debug;

/// Parses SLEEC text, normalizing `within` durations to a base unit
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParser {
    base_unit: TimeUnit,
}

impl SourceParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_unit(base_unit: TimeUnit) -> Self {
        Self { base_unit }
    }

    pub fn parse(&self, source: &str) -> Result<Program, ParseError> {
        let location = SourceLocation::new(source);
        let tokens = tokenize(source);
        let sections = sections::extract(&tokens, &location)?;
        debug!(
            definitions = sections.definitions.map_or(0, <[Spanned]>::len),
            rules = sections.rules.map_or(0, <[Spanned]>::len),
            "extracted sections"
        );

        let mut program = Program::default();
        if let Some(definitions) = sections.definitions {
            declarations::parse_declarations(definitions, &location, &mut program)?;
        }
        if let Some(rule_tokens) = sections.rules {
            program.rules = rules::parse_rules(rule_tokens, &location, self.base_unit)?;
        }
        debug!(
            events = program.events.len(),
            measures = program.measures.len(),
            constants = program.constants.len(),
            rules = program.rules.len(),
            "parsed program"
        );
        Ok(program)
    }
}

/// Parse with seconds as the base time unit
pub fn parse(source: &str) -> Result<Program, ParseError> {
    SourceParser::new().parse(source)
}

/// Run a token parser over a slice, keeping only the first error
pub(crate) fn run_parser<O, P>(parser: P, tokens: &[Spanned]) -> Result<O, Simple<Token>>
where
    P: chumsky::Parser<Token, O, Error = Simple<Token>>,
{
    let end = tokens.last().map(|(_, span)| span.end).unwrap_or(0);
    let stream = Stream::from_iter(end..end, tokens.iter().cloned());
    parser.parse(stream).map_err(|errors| {
        errors
            .into_iter()
            .next()
            .unwrap_or_else(|| Simple::custom(end..end, "invalid input"))
    })
}
