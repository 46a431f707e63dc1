//! Rule parsing
//!
//! The rules block is split at every rule identifier (`R` followed by digits) and each
//! piece is parsed on its own:
//!
//! ```text
//! R<n> when <condition> then <action> [within <int> <unit>]
//!      [ (unless <condition> then <action>)+ [otherwise <action>]
//!      | otherwise <action> ]
//! <action> = ["not"] <Name>
//! ```
//!
//! Exceptions take precedence over a default: an `otherwise` that follows `unless`
//! clauses is dropped with a warning. Durations are converted to the base time unit
//! here so the encoder only ever sees whole base units.

use crate::sleec::ast::{Action, Exception, Rule};
use crate::sleec::config::TimeUnit;
use crate::sleec::error::{ParseError, RULE_FORMS};
use crate::sleec::lexing::{Spanned, Token};
use crate::sleec::location::SourceLocation;
use crate::sleec::parsing::condition::condition;
use crate::sleec::parsing::run_parser;
use chumsky::prelude::*;
use std::num::{IntErrorKind, ParseIntError};
use std::ops::Range;
use tracing::{debug, warn};

/// `within <amount> <unit>` as written
#[derive(Debug, Clone, PartialEq)]
struct Duration {
    amount: String,
    unit: String,
    span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct ParsedRule {
    id: String,
    condition: crate::sleec::ast::Condition,
    action: Action,
    within: Option<Duration>,
    exceptions: Vec<Exception>,
    otherwise: Option<Action>,
    dropped_otherwise: bool,
}

fn action() -> impl Parser<Token, Action, Error = Simple<Token>> + Clone {
    just(Token::Not)
        .or_not()
        .then(select! { Token::Ident(event) => event })
        .map(|(not, event)| Action {
            event,
            negated: not.is_some(),
        })
}

fn rule() -> impl Parser<Token, ParsedRule, Error = Simple<Token>> {
    let id = select! { Token::RuleId(id) => id };
    let amount = select! { Token::Number(amount) => amount };
    let unit = select! { Token::Ident(unit) => unit };

    let within = just(Token::Within)
        .ignore_then(amount.then(unit))
        .map_with_span(|(amount, unit), span| Duration { amount, unit, span });

    let exception = just(Token::Unless)
        .ignore_then(condition())
        .then_ignore(just(Token::Then))
        .then(action())
        .map(|(condition, action)| Exception { condition, action });

    let otherwise = just(Token::Otherwise).ignore_then(action());

    let clauses = choice((
        exception
            .repeated()
            .at_least(1)
            .then(otherwise.clone().or_not())
            .map(|(exceptions, otherwise)| (exceptions, None, otherwise.is_some())),
        otherwise.map(|action| (Vec::new(), Some(action), false)),
    ))
    .or_not()
    .map(|clauses| clauses.unwrap_or((Vec::new(), None, false)));

    id.then_ignore(just(Token::When))
        .then(condition())
        .then_ignore(just(Token::Then))
        .then(action())
        .then(within.or_not())
        .then(clauses)
        .then_ignore(end())
        .map(
            |((((id, condition), action), within), (exceptions, otherwise, dropped_otherwise))| {
                ParsedRule {
                    id,
                    condition,
                    action,
                    within,
                    exceptions,
                    otherwise,
                    dropped_otherwise,
                }
            },
        )
}

/// Parse the rules block. Newlines carry no meaning here.
pub fn parse_rules(
    tokens: &[Spanned],
    location: &SourceLocation<'_>,
    base_unit: TimeUnit,
) -> Result<Vec<Rule>, ParseError> {
    let tokens: Vec<Spanned> = tokens
        .iter()
        .filter(|(token, _)| *token != Token::Newline)
        .cloned()
        .collect();

    let mut rules = Vec::new();
    for segment in segments(&tokens) {
        let (_, first_span) = &segment[0];
        let line = location.line_of(first_span.start);

        let parsed = run_parser(rule(), segment).map_err(|error| {
            let segment_end = segment.last().map_or(first_span.end, |(_, s)| s.end);
            ParseError::Syntax {
                line: location.line_of(error.span().start.min(segment_end)),
                what: "rule",
                text: location.snippet(first_span.start..segment_end),
                expected: RULE_FORMS.iter().map(|f| f.to_string()).collect(),
            }
        })?;

        if parsed.dropped_otherwise {
            warn!(rule = %parsed.id, line, "otherwise clause ignored because the rule has unless clauses");
        }

        let within = match parsed.within {
            Some(duration) => Some(normalize(&duration, location, base_unit)?),
            None => None,
        };

        debug!(rule = %parsed.id, line, exceptions = parsed.exceptions.len(), "parsed rule");
        rules.push(Rule {
            id: parsed.id,
            condition: parsed.condition,
            action: parsed.action,
            line,
            within,
            otherwise: parsed.otherwise,
            exceptions: parsed.exceptions,
        });
    }
    Ok(rules)
}

/// Split at rule identifiers. Every segment starts with one; stray leading tokens
/// form a segment of their own and fail to parse.
fn segments(tokens: &[Spanned]) -> Vec<&[Spanned]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (index, (token, _)) in tokens.iter().enumerate() {
        if matches!(token, Token::RuleId(_)) && index > start {
            out.push(&tokens[start..index]);
            start = index;
        }
    }
    if start < tokens.len() {
        out.push(&tokens[start..]);
    }
    out
}

fn normalize(
    duration: &Duration,
    location: &SourceLocation<'_>,
    base_unit: TimeUnit,
) -> Result<u64, ParseError> {
    let line = location.line_of(duration.span.start);
    let invalid = |reason: String| ParseError::InvalidDuration { line, reason };

    let too_large = || invalid(format!("{} {} is too large", duration.amount, duration.unit));

    let amount: u64 = duration.amount.parse().map_err(|e: ParseIntError| {
        if *e.kind() == IntErrorKind::PosOverflow {
            too_large()
        } else {
            invalid(format!("'{}' is not a whole number", duration.amount))
        }
    })?;
    if amount == 0 {
        return Err(invalid("a duration must be positive".to_string()));
    }
    let unit = TimeUnit::from_word(&duration.unit)
        .ok_or_else(|| invalid(format!("unknown time unit '{}'", duration.unit)))?;
    let seconds = unit.to_seconds(amount).ok_or_else(too_large)?;
    base_unit.from_seconds(seconds).ok_or_else(|| {
        invalid(format!(
            "{} {} is not a whole number of {}",
            amount, duration.unit, base_unit
        ))
    })
}
