//! Conversion entry points
//!
//! [`Converter`] runs parse, validate and encode in sequence, for strings, single
//! files and whole directories. Files are read before the core runs and written only
//! after it succeeds, so a failed conversion never leaves a partial output behind.

use crate::sleec::ast::Program;
use crate::sleec::config::ConverterConfig;
use crate::sleec::encoding::Encoder;
use crate::sleec::error::{ConfigError, ConvertError};
use crate::sleec::parsing::SourceParser;
use crate::sleec::solver::{Solver, SolverReport};
use crate::sleec::validation::validate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extension of SLEEC sources picked up by [`Converter::convert_dir`]
pub const SOURCE_EXTENSION: &str = "sleec";

#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    /// Fails if the configuration does not validate
    pub fn new(config: ConverterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Parse and validate without encoding
    pub fn parse(&self, source: &str) -> Result<Program, ConvertError> {
        let program = SourceParser::with_base_unit(self.config.base_unit).parse(source)?;
        validate(&program)?;
        Ok(program)
    }

    pub fn convert_str(&self, source: &str) -> Result<String, ConvertError> {
        let program = self.parse(source)?;
        Ok(Encoder::new(&self.config).encode(&program))
    }

    /// Read and convert one file, returning the program text
    pub fn convert_file(&self, input: impl AsRef<Path>) -> Result<String, ConvertError> {
        let input = input.as_ref();
        let source = fs::read_to_string(input).map_err(|e| ConvertError::io(input, e))?;
        self.convert_str(&source)
    }

    /// Convert one file and write the result, by default to `<stem>_converted.lp`
    /// beside the input. Returns the path written.
    pub fn convert_file_to(
        &self,
        input: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> Result<PathBuf, ConvertError> {
        let input = input.as_ref();
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| output_path(input, "_converted"));
        let text = self.convert_file(input)?;
        fs::write(&output, text).map_err(|e| ConvertError::io(&output, e))?;
        info!(input = %input.display(), output = %output.display(), "converted");
        Ok(output)
    }

    /// Convert every `*.sleec` file directly inside `dir` to `<stem>_auto_generated.lp`.
    ///
    /// A failing file does not stop the batch; each file gets its own outcome, in
    /// path order. Only an unreadable directory fails the call.
    pub fn convert_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<BatchOutcome>, ConvertError> {
        let dir = dir.as_ref();
        let mut inputs = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))? {
            let path = entry.map_err(|e| ConvertError::io(dir, e))?.path();
            let is_source = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION);
            if is_source {
                inputs.push(path);
            }
        }
        inputs.sort();

        let outcomes: Vec<BatchOutcome> = inputs
            .into_iter()
            .map(|input| {
                let output = output_path(&input, "_auto_generated");
                let result = self.convert_file_to(&input, Some(&output));
                if let Err(error) = &result {
                    warn!(input = %input.display(), %error, "conversion failed");
                }
                BatchOutcome { input, result }
            })
            .collect();
        info!(
            dir = %dir.display(),
            converted = outcomes.iter().filter(|o| o.result.is_ok()).count(),
            failed = outcomes.iter().filter(|o| o.result.is_err()).count(),
            "batch finished"
        );
        Ok(outcomes)
    }

    /// Convert, then hand the program to a solver
    pub fn check(&self, source: &str, solver: &dyn Solver) -> Result<SolverReport, ConvertError> {
        let program = self.convert_str(source)?;
        Ok(solver.check(&program)?)
    }
}

/// Result of converting one file of a batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    /// The output path on success
    pub result: Result<PathBuf, ConvertError>,
}

/// `dir/<stem><suffix>.lp` for `dir/<stem>.<ext>`
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}.lp", stem, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleec::error::SolverError;
    use crate::sleec::solver::FnSolver;

    const VALID: &str = "def_start\nevent A\nevent B\ndef_end\nrule_start\nR1 when A then B\nrule_end\n";

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/tmp/rules/door.sleec"), "_converted"),
            PathBuf::from("/tmp/rules/door_converted.lp")
        );
        assert_eq!(
            output_path(Path::new("plain"), "_auto_generated"),
            PathBuf::from("plain_auto_generated.lp")
        );
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ConverterConfig {
            numeric_min: 9,
            numeric_max: 1,
            ..ConverterConfig::default()
        };
        assert!(Converter::new(config).is_err());
    }

    #[test]
    fn test_validation_runs_before_encoding() {
        let source = "def_start\nevent A\ndef_end\nrule_start\nR1 when A then Missing\nrule_end";
        match Converter::default().convert_str(source) {
            Err(ConvertError::Validation(err)) => {
                assert_eq!(err.missing_events, vec!["Missing".to_string()])
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_uses_injected_solver() {
        let solver = FnSolver(|program: &str| {
            assert!(program.contains("exp(r1)."));
            Ok::<_, SolverError>(SolverReport {
                status: Some(10),
                output: "SATISFIABLE".to_string(),
            })
        });
        let report = Converter::default()
            .check(VALID, &solver)
            .expect("stub accepts");
        assert_eq!(report.status, Some(10));
    }

    #[test]
    fn test_check_surfaces_solver_failure() {
        let solver = FnSolver(|_: &str| {
            Err::<SolverReport, _>(SolverError::Failed {
                status: Some(65),
                output: "error: parsing failed".to_string(),
            })
        });
        let result = Converter::default().check(VALID, &solver);
        assert!(matches!(
            result,
            Err(ConvertError::Solver(SolverError::Failed { .. }))
        ));
    }
}
