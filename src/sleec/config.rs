//! Converter configuration
//!
//! `defaults/sleec.default.toml` is embedded into the crate so documentation and
//! runtime defaults stay in sync. [`Loader`] layers user files and single-key
//! overrides on top of it and validates the result. Programmatic callers can use
//! [`ConverterConfig::builder`] instead.
//!
//! A [`ConverterConfig`] is always validated before a conversion sees it; there is no
//! shared global instance.

use crate::sleec::error::ConfigError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/sleec.default.toml");

/// The unit `within` durations are normalized to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn seconds(self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3_600,
            TimeUnit::Days => 86_400,
        }
    }

    /// Recognize a unit word as written in a `within` clause
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hour" | "hours" => Some(TimeUnit::Hours),
            "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    /// `amount` of this unit in seconds; `None` on overflow
    pub fn to_seconds(self, amount: u64) -> Option<u64> {
        amount.checked_mul(self.seconds())
    }

    /// `seconds` in this unit, if it divides evenly
    pub fn from_seconds(self, seconds: u64) -> Option<u64> {
        (seconds % self.seconds() == 0).then(|| seconds / self.seconds())
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        write!(f, "{}", word)
    }
}

/// Settings for the external solver check. Unused by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub binary: String,
    pub models: u32,
    pub check_models: u32,
    pub time_limit_secs: u64,
    pub timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            binary: "clingo".to_string(),
            models: 3,
            check_models: 1,
            time_limit_secs: 5,
            timeout_secs: 10,
        }
    }
}

/// Everything a conversion needs besides the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Upper bound of `time(0..max_time)`
    pub max_time: u32,
    pub numeric_min: i64,
    pub numeric_max: i64,
    pub base_unit: TimeUnit,
    pub show_predicates: Vec<String>,
    pub section_separator: String,
    pub solver: SolverConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_time: 10,
            numeric_min: 0,
            numeric_max: 10,
            base_unit: TimeUnit::Seconds,
            show_predicates: vec![
                "holds_at/2".to_string(),
                "holds_at/3".to_string(),
                "happens/3".to_string(),
            ],
            section_separator: "\n\n".to_string(),
            solver: SolverConfig::default(),
        }
    }
}

impl ConverterConfig {
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder::default()
    }

    /// Reject values no conversion could use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.numeric_min > self.numeric_max {
            return Err(ConfigError::Invalid {
                parameter: "numeric_min",
                reason: format!(
                    "range is inverted ({} > {})",
                    self.numeric_min, self.numeric_max
                ),
            });
        }
        if self.solver.binary.trim().is_empty() {
            return Err(ConfigError::Invalid {
                parameter: "solver.binary",
                reason: "must not be empty".to_string(),
            });
        }
        if self.solver.time_limit_secs == 0 {
            return Err(ConfigError::Invalid {
                parameter: "solver.time_limit_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.solver.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                parameter: "solver.timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if let Some(bad) = self
            .show_predicates
            .iter()
            .find(|p| !is_predicate_signature(p))
        {
            return Err(ConfigError::Invalid {
                parameter: "show_predicates",
                reason: format!("'{}' is not of the form name/arity", bad),
            });
        }
        Ok(())
    }
}

fn is_predicate_signature(text: &str) -> bool {
    let Some((name, arity)) = text.split_once('/') else {
        return false;
    };
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !arity.is_empty()
        && arity.chars().all(|c| c.is_ascii_digit())
}

/// Programmatic construction with validation at the end
#[derive(Debug, Clone, Default)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn max_time(mut self, max_time: u32) -> Self {
        self.config.max_time = max_time;
        self
    }

    pub fn numeric_range(mut self, min: i64, max: i64) -> Self {
        self.config.numeric_min = min;
        self.config.numeric_max = max;
        self
    }

    pub fn base_unit(mut self, unit: TimeUnit) -> Self {
        self.config.base_unit = unit;
        self
    }

    pub fn show_predicates<I, S>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.show_predicates = predicates.into_iter().map(Into::into).collect();
        self
    }

    pub fn section_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.section_separator = separator.into();
        self
    }

    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.config.solver = solver;
        self
    }

    pub fn build(self) -> Result<ConverterConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `max_time` from the command line.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize, deserialize and validate the configuration.
    pub fn build(self) -> Result<ConverterConfig, ConfigError> {
        let config: ConverterConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ConverterConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_defaults_match_default_impl() {
        let loaded = load_defaults().expect("defaults to deserialize");
        assert_eq!(loaded, ConverterConfig::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("max_time", 20i64)
            .expect("override to apply")
            .set_override("solver.models", 7i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.max_time, 20);
        assert_eq!(config.solver.models, 7);
        assert_eq!(config.numeric_max, 10);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "numeric_min = -5\nbase_unit = \"minutes\"").expect("write");
        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.numeric_min, -5);
        assert_eq!(config.base_unit, TimeUnit::Minutes);
        assert_eq!(config.max_time, 10);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here.toml")
            .build()
            .expect("config to build");
        assert_eq!(config, ConverterConfig::default());
    }

    #[test]
    fn rejects_inverted_range_on_load() {
        let result = Loader::new()
            .set_override("numeric_min", 11i64)
            .expect("override to apply")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                parameter: "numeric_min",
                ..
            })
        ));
    }

    #[test]
    fn builder_validates() {
        assert!(ConverterConfig::builder().numeric_range(5, 1).build().is_err());
        assert!(ConverterConfig::builder()
            .show_predicates(["holds_at"])
            .build()
            .is_err());
        let solver = SolverConfig {
            timeout_secs: 0,
            ..SolverConfig::default()
        };
        assert!(ConverterConfig::builder().solver(solver).build().is_err());

        let config = ConverterConfig::builder()
            .max_time(0)
            .numeric_range(3, 3)
            .build()
            .expect("valid config");
        assert_eq!(config.max_time, 0);
    }

    #[test]
    fn unit_conversion() {
        assert_eq!(TimeUnit::Minutes.to_seconds(2), Some(120));
        assert_eq!(TimeUnit::Hours.to_seconds(1), Some(3_600));
        assert_eq!(TimeUnit::Days.to_seconds(u64::MAX / 1_000), None);
        assert_eq!(TimeUnit::Minutes.from_seconds(3_600), Some(60));
        assert_eq!(TimeUnit::Minutes.from_seconds(90), None);
        assert_eq!(TimeUnit::Minutes.from_seconds(120), Some(2));
        assert_eq!(TimeUnit::from_word("Mins"), Some(TimeUnit::Minutes));
        assert_eq!(TimeUnit::from_word("fortnights"), None);
    }
}
