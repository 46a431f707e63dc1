//! Main module for the SLEEC compiler
//!
//! The modules mirror the stages of a conversion:
//!
//! - [`lexing`] turns source text into tokens
//! - [`parsing`] builds the [`ast::Program`] from those tokens
//! - [`validation`] cross-checks references against the declarations
//! - [`encoding`] renders the program as clingo text
//! - [`convert`] ties the stages together for strings, files and directories

pub mod ast;
pub mod config;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod lexing;
pub mod location;
pub mod parsing;
pub mod solver;
pub mod validation;

pub use ast::Program;
pub use config::ConverterConfig;
pub use convert::Converter;
pub use error::{ConfigError, ConvertError, ParseError, SolverError, ValidationError};
pub use parsing::parse;
