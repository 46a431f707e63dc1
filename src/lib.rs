//! # sleec
//!
//! A compiler from SLEEC rule documents to clingo answer-set programs.
//!
//! A SLEEC document declares events, measures and constants, then states rules of the
//! form `R1 when <condition> then <action>`, optionally bounded in time (`within 5
//! seconds`) and refined by `unless` exceptions or an `otherwise` default. The compiler
//! turns every rule into antecedent/consequent predicates plus the satisfaction logic
//! and choice rules a solver needs to search for compliant traces.
//!
//! The pipeline is one-way:
//!
//! ```text
//! source text -> tokens -> Program -> validated Program -> clingo program text
//! ```
//!
//! See [`sleec::convert::Converter`] for the entry point most callers want.

pub mod sleec;
