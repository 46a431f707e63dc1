//! Condition grammar
//!
//! ```text
//! <condition>   = <conjunction> ("or" <conjunction>)*
//! <conjunction> = <negation> ("and" <negation>)*
//! <negation>    = "not"* <atom>
//! <atom>        = "(" <condition> ")" | "{" <name> "}" ["=" <value>] | <name>
//! ```
//!
//! `not` binds tighter than `and`, which binds tighter than `or`. Parentheses only
//! group; they leave no trace in the tree. Runs of the same connective are flattened,
//! so `(A and B) and C` becomes one three-way conjunction.

use crate::sleec::ast::Condition;
use crate::sleec::lexing::Token;
use chumsky::prelude::*;

pub fn condition() -> impl Parser<Token, Condition, Error = Simple<Token>> + Clone {
    recursive(|condition| {
        let name = select! { Token::Ident(name) => name };
        let value = select! {
            Token::Ident(value) => value,
            Token::Number(value) => value,
            Token::Str(value) => value
        };

        let measure = name
            .clone()
            .delimited_by(just(Token::OpenBrace), just(Token::CloseBrace))
            .then(just(Token::Equals).ignore_then(value).or_not())
            .map(|(measure, value)| match value {
                Some(value) => Condition::MeasureEquals { measure, value },
                None => Condition::Measure(measure),
            });

        let atom = choice((
            condition.delimited_by(just(Token::OpenParen), just(Token::CloseParen)),
            measure,
            name.map(Condition::Name),
        ));

        let negation = just(Token::Not)
            .repeated()
            .then(atom)
            .foldr(|_, inner| Condition::Not(Box::new(inner)));

        let conjunction = negation
            .separated_by(just(Token::And))
            .at_least(1)
            .map(|items| combine(items, Connective::And));

        conjunction
            .separated_by(just(Token::Or))
            .at_least(1)
            .map(|items| combine(items, Connective::Or))
    })
}

#[derive(Clone, Copy)]
enum Connective {
    And,
    Or,
}

fn combine(items: Vec<Condition>, connective: Connective) -> Condition {
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match (connective, item) {
            (Connective::And, Condition::And(inner)) | (Connective::Or, Condition::Or(inner)) => {
                flat.extend(inner)
            }
            (_, item) => flat.push(item),
        }
    }
    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }
    match connective {
        Connective::And => Condition::And(flat),
        Connective::Or => Condition::Or(flat),
    }
}
