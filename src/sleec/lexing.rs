//! Token definitions and tokenization for SLEEC sources
//!
//! The lexer is derived with logos. Horizontal whitespace and `//` line comments are
//! skipped, but every token keeps the byte span it occupies in the original text, so
//! diagnostics always point at real source lines.
//!
//! Newlines are kept as tokens: declarations are one per line, while the rules block
//! drops them before parsing.
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// A token paired with its byte range in the source.
pub type Spanned = (Token, Range<usize>);

/// All tokens of the SLEEC surface syntax
#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // Section markers
    #[token("def_start")]
    DefStart,
    #[token("def_end")]
    DefEnd,
    #[token("rule_start")]
    RuleStart,
    #[token("rule_end")]
    RuleEnd,

    // Declaration keywords
    #[token("event")]
    Event,
    #[token("measure")]
    Measure,
    #[token("constant")]
    Constant,

    // Rule keywords
    #[token("when")]
    When,
    #[token("then")]
    Then,
    #[token("unless")]
    Unless,
    #[token("otherwise")]
    Otherwise,
    #[token("within")]
    Within,

    // Connectives are accepted in any case
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,

    #[regex(r"R[0-9]+", |lex| lex.slice().to_string())]
    RuleId(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r#""[^"\n]*""#, |lex| lex.slice().to_string())]
    Str(String),

    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,

    #[token("\n")]
    Newline,

    // Anything the grammar has no use for. Also produced for input logos rejects.
    #[regex(r#"[^A-Za-z0-9_ \t\r\f\n{}():,="/\-]"#, |lex| lex.slice().to_string())]
    Unknown(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::DefStart => "def_start",
            Token::DefEnd => "def_end",
            Token::RuleStart => "rule_start",
            Token::RuleEnd => "rule_end",
            Token::Event => "event",
            Token::Measure => "measure",
            Token::Constant => "constant",
            Token::When => "when",
            Token::Then => "then",
            Token::Unless => "unless",
            Token::Otherwise => "otherwise",
            Token::Within => "within",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::RuleId(s)
            | Token::Ident(s)
            | Token::Number(s)
            | Token::Str(s)
            | Token::Unknown(s) => s,
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Equals => "=",
            Token::Newline => "\\n",
        };
        write!(f, "{}", text)
    }
}

/// Tokenize a SLEEC source with byte locations
///
/// Never fails: input the lexer cannot classify becomes [`Token::Unknown`] and is
/// reported by the parser only when it sits inside a section.
pub fn tokenize(source: &str) -> Vec<Spanned> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let token = match result {
            Ok(token) => token,
            Err(()) => Token::Unknown(lexer.slice().to_string()),
        };
        tokens.push((token, lexer.span()));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_section_markers() {
        assert_eq!(
            kinds("def_start\ndef_end"),
            vec![Token::DefStart, Token::Newline, Token::DefEnd]
        );
    }

    #[test]
    fn test_rule_id_outranks_identifier() {
        assert_eq!(kinds("R12"), vec![Token::RuleId("R12".to_string())]);
        assert_eq!(kinds("R12x"), vec![Token::Ident("R12x".to_string())]);
        assert_eq!(kinds("Ready"), vec![Token::Ident("Ready".to_string())]);
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        assert_eq!(kinds("events"), vec![Token::Ident("events".to_string())]);
        assert_eq!(kinds("notify"), vec![Token::Ident("notify".to_string())]);
        assert_eq!(kinds("order"), vec![Token::Ident("order".to_string())]);
    }

    #[test]
    fn test_connectives_ignore_case() {
        assert_eq!(
            kinds("A AND not B Or C"),
            vec![
                Token::Ident("A".to_string()),
                Token::And,
                Token::Not,
                Token::Ident("B".to_string()),
                Token::Or,
                Token::Ident("C".to_string()),
            ]
        );
    }

    #[test]
    fn test_measure_reference() {
        assert_eq!(
            kinds("{level} = high"),
            vec![
                Token::OpenBrace,
                Token::Ident("level".to_string()),
                Token::CloseBrace,
                Token::Equals,
                Token::Ident("high".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped_but_spans_stay_exact() {
        let source = "event A // trailing note\nevent B";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[2].0, Token::Newline);
        let (token, span) = &tokens[4];
        assert_eq!(token, &Token::Ident("B".to_string()));
        assert_eq!(&source[span.clone()], "B");
    }

    #[test]
    fn test_numbers_and_strings() {
        assert_eq!(
            kinds(r#"5 -3 2.5 "hello world""#),
            vec![
                Token::Number("5".to_string()),
                Token::Number("-3".to_string()),
                Token::Number("2.5".to_string()),
                Token::Str("\"hello world\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_characters_do_not_stop_tokenizing() {
        let tokens = kinds("A # B");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("A".to_string()),
                Token::Unknown("#".to_string()),
                Token::Ident("B".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), vec![]);
    }
}
