//! Section extraction
//!
//! A SLEEC document has at most one definitions block and one rules block, in either
//! order. Tokens outside both blocks are ignored, so stray prose or headers around
//! the sections do not matter; each such run is logged at debug level. A start
//! marker without its end marker is an error.

use crate::sleec::error::ParseError;
use crate::sleec::lexing::{Spanned, Token};
use crate::sleec::location::SourceLocation;
use tracing::debug;

/// Token slices of the two blocks, markers excluded
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sections<'t> {
    pub definitions: Option<&'t [Spanned]>,
    pub rules: Option<&'t [Spanned]>,
}

pub fn extract<'t>(
    tokens: &'t [Spanned],
    location: &SourceLocation<'_>,
) -> Result<Sections<'t>, ParseError> {
    let mut sections = Sections::default();
    let mut stray = StrayText::default();
    let mut index = 0;

    while index < tokens.len() {
        let (token, span) = &tokens[index];
        let (slot, end_marker, marker) = match token {
            Token::DefStart => (&mut sections.definitions, Token::DefEnd, "def_start"),
            Token::RuleStart => (&mut sections.rules, Token::RuleEnd, "rule_start"),
            Token::Newline => {
                index += 1;
                continue;
            }
            _ => {
                stray.push(span.start);
                index += 1;
                continue;
            }
        };
        stray.flush(location);

        let body_start = index + 1;
        let Some(offset) = tokens[body_start..]
            .iter()
            .position(|(t, _)| *t == end_marker)
        else {
            return Err(ParseError::UnclosedSection {
                marker,
                line: location.line_of(span.start),
            });
        };
        let body_end = body_start + offset;

        if slot.is_none() {
            *slot = Some(&tokens[body_start..body_end]);
        } else {
            debug!(marker, line = location.line_of(span.start), "ignoring repeated section");
        }
        index = body_end + 1;
    }
    stray.flush(location);

    Ok(sections)
}

/// A run of tokens outside both sections
#[derive(Debug, Default)]
struct StrayText {
    start: Option<usize>,
    tokens: usize,
}

impl StrayText {
    fn push(&mut self, offset: usize) {
        self.start.get_or_insert(offset);
        self.tokens += 1;
    }

    fn flush(&mut self, location: &SourceLocation<'_>) {
        if let Some(start) = self.start.take() {
            debug!(
                line = location.line_of(start),
                tokens = self.tokens,
                "ignoring text outside sections"
            );
        }
        self.tokens = 0;
    }
}
