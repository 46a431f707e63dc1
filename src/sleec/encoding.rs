//! Generation of clingo programs from validated SLEEC programs
//!
//! The output has six sections, in this order:
//!
//! 1. header commentary echoing the source rules
//! 2. domain facts: `time/1`, `event/1`, `measure/1`, `constant/2`
//! 3. rule definitions: `exp/1`, `antecedent/2`, `consequent/2` per branch
//! 4. satisfaction logic: `holds/2`, `holds_nv/2`, `holds_v/2` and the hard constraint
//! 5. choice rules for trigger events, action events and measures
//! 6. `#show` directives
//!
//! Empty sections are left out. Generation is a pure function of the program and the
//! configuration; the same input always yields byte-identical output.

pub mod asp;
pub mod events;
pub mod rules;
pub mod sections;
pub mod translate;

use crate::sleec::ast::Program;
use crate::sleec::config::ConverterConfig;
use events::EventPartition;
use rules::{RuleEncoder, RuleEncoding};
use translate::Translator;

pub struct Encoder<'c> {
    config: &'c ConverterConfig,
}

impl<'c> Encoder<'c> {
    pub fn new(config: &'c ConverterConfig) -> Self {
        Self { config }
    }

    /// Render a program. Call [`validate`](crate::sleec::validation::validate) first;
    /// undeclared names are emitted as they are.
    pub fn encode(&self, program: &Program) -> String {
        let events = EventPartition::from_program(program);
        let translator = Translator::new(&events);
        let encoder = RuleEncoder::new(&translator);
        let encodings: Vec<RuleEncoding> = program.rules.iter().map(|r| encoder.encode(r)).collect();

        let parts = [
            Some(sections::header(program)),
            sections::domain(program, &events, self.config),
            sections::rule_definitions(program, &encodings),
            sections::satisfaction(&encodings),
            sections::choices(program, &events, self.config),
            sections::output(self.config),
        ];
        let mut text = parts
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(self.config.section_separator.as_str());
        text.push('\n');
        text
    }
}

/// Encode with the given configuration
pub fn encode(program: &Program, config: &ConverterConfig) -> String {
    Encoder::new(config).encode(program)
}
