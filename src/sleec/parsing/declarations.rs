//! Declaration parsing
//!
//! Each non-blank line of the definitions block is exactly one of:
//!
//! ```text
//! event <Name>
//! measure <Name>: boolean | numeric | scale(<v1>, <v2>, ...)
//! constant <Name> = <value>
//! ```
//!
//! Measure types are matched without regard to case. Anything else on a line is a
//! structural error listing the three forms.

use crate::sleec::ast::{Constant, Event, Measure, MeasureKind, Program};
use crate::sleec::error::{ParseError, DECLARATION_FORMS};
use crate::sleec::lexing::{Spanned, Token};
use crate::sleec::location::SourceLocation;
use crate::sleec::parsing::run_parser;
use chumsky::prelude::*;
use std::ops::Range;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
enum Declaration {
    Event(String),
    Measure(String, MeasureKind),
    Constant(String, Range<usize>),
}

fn keyword(word: &'static str) -> impl Parser<Token, (), Error = Simple<Token>> + Clone {
    filter_map(move |span, token: Token| {
        if matches!(&token, Token::Ident(text) if text.eq_ignore_ascii_case(word)) {
            Ok(())
        } else {
            Err(Simple::expected_input_found(span, Vec::new(), Some(token)))
        }
    })
}

fn measure_kind() -> impl Parser<Token, MeasureKind, Error = Simple<Token>> + Clone {
    let value = select! { Token::Ident(value) => value };
    let scale = keyword("scale").ignore_then(
        value
            .separated_by(just(Token::Comma))
            .at_least(1)
            .delimited_by(just(Token::OpenParen), just(Token::CloseParen)),
    );

    choice((
        keyword("boolean").to(MeasureKind::Boolean),
        keyword("numeric").to(MeasureKind::Numeric),
        scale.map(MeasureKind::Scale),
    ))
}

fn declaration() -> impl Parser<Token, Declaration, Error = Simple<Token>> {
    let name = select! { Token::Ident(name) => name };

    let event = just(Token::Event)
        .ignore_then(name.clone())
        .map(Declaration::Event);

    let measure = just(Token::Measure)
        .ignore_then(name.clone())
        .then_ignore(just(Token::Colon))
        .then(measure_kind())
        .map(|(name, kind)| Declaration::Measure(name, kind));

    let constant = just(Token::Constant)
        .ignore_then(name)
        .then_ignore(just(Token::Equals))
        .then(
            filter(|token: &Token| !matches!(token, Token::Unknown(_)))
                .repeated()
                .at_least(1)
                .map_with_span(|_, span| span),
        )
        .map(|(name, span)| Declaration::Constant(name, span));

    choice((event, measure, constant)).then_ignore(end())
}

/// Parse the definitions block into `program`
pub fn parse_declarations(
    tokens: &[Spanned],
    location: &SourceLocation<'_>,
    program: &mut Program,
) -> Result<(), ParseError> {
    for line_tokens in tokens.split(|(token, _)| *token == Token::Newline) {
        let Some((_, first_span)) = line_tokens.first() else {
            continue;
        };
        let line = location.line_of(first_span.start);

        let declaration =
            run_parser(declaration(), line_tokens).map_err(|_| ParseError::Syntax {
                line,
                what: "declaration",
                text: location.line_text(line).trim().to_string(),
                expected: DECLARATION_FORMS.iter().map(|f| f.to_string()).collect(),
            })?;

        match declaration {
            Declaration::Event(name) => {
                if program.event(&name).is_some() {
                    warn!(event = %name, line, "duplicate event declaration");
                }
                program.events.push(Event { name, line });
            }
            Declaration::Measure(name, kind) => {
                if program.measure(&name).is_some() {
                    warn!(measure = %name, line, "duplicate measure declaration");
                }
                program.measures.push(Measure { name, kind, line });
            }
            Declaration::Constant(name, span) => {
                let value = location.snippet(span);
                program.constants.push(Constant { name, value, line });
            }
        }
    }
    Ok(())
}
