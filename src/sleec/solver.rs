//! External solver check
//!
//! The converter hands generated programs to a [`Solver`] and only looks at whether
//! the solver accepted them. [`ClingoSolver`] runs the clingo binary as a subprocess
//! with a hard timeout; [`FnSolver`] wraps a closure so tests can stand in for it.

use crate::sleec::config::SolverConfig;
use crate::sleec::error::SolverError;
use std::io::Write;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// What the solver printed, for a run it accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverReport {
    pub status: Option<i32>,
    pub output: String,
}

/// Text in, verdict out
pub trait Solver {
    fn check(&self, program: &str) -> Result<SolverReport, SolverError>;
}

/// Adapts a closure to [`Solver`]
pub struct FnSolver<F>(pub F);

impl<F> Solver for FnSolver<F>
where
    F: Fn(&str) -> Result<SolverReport, SolverError>,
{
    fn check(&self, program: &str) -> Result<SolverReport, SolverError> {
        (self.0)(program)
    }
}

/// clingo exit codes for a finished search (satisfiable 10, unsatisfiable 20,
/// exhausted 30), also with the interrupt bit set by `--time-limit`.
const ACCEPTED_STATUS: [i32; 8] = [0, 1, 10, 11, 20, 21, 30, 31];

#[derive(Debug, Clone)]
pub struct ClingoSolver {
    binary: String,
    models: u32,
    time_limit_secs: u64,
    timeout: Duration,
}

impl ClingoSolver {
    /// A solver for syntax checks, requesting `check_models` models
    pub fn for_check(config: &SolverConfig) -> Self {
        Self::with_models(config, config.check_models)
    }

    /// A solver requesting `models` models
    pub fn for_solving(config: &SolverConfig) -> Self {
        Self::with_models(config, config.models)
    }

    fn with_models(config: &SolverConfig, models: u32) -> Self {
        Self {
            binary: config.binary.clone(),
            models,
            time_limit_secs: config.time_limit_secs,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> SolverError {
        SolverError::Spawn {
            binary: self.binary.clone(),
            source,
        }
    }

    async fn run(&self, path: &std::path::Path) -> Result<std::process::Output, SolverError> {
        let child = Command::new(&self.binary)
            .arg(path)
            .arg(format!("--models={}", self.models))
            .arg(format!("--time-limit={}", self.time_limit_secs))
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(output) => output.map_err(|e| self.spawn_error(e)),
            Err(_) => Err(SolverError::TimedOut {
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

impl Solver for ClingoSolver {
    fn check(&self, program: &str) -> Result<SolverReport, SolverError> {
        let mut file = tempfile::Builder::new()
            .prefix("sleec-")
            .suffix(".lp")
            .tempfile()
            .map_err(|e| self.spawn_error(e))?;
        file.write_all(program.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| self.spawn_error(e))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.spawn_error(e))?;
        debug!(binary = %self.binary, models = self.models, "running solver");
        let output = runtime.block_on(self.run(file.path()))?;

        let status = output.status.code();
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let report = SolverReport {
            status,
            output: format!("{}{}", stdout, stderr),
        };
        info!(?status, "solver finished");

        judge(report, &stderr)
    }
}

/// Accept a finished run unless its status or diagnostics say otherwise
fn judge(report: SolverReport, stderr: &str) -> Result<SolverReport, SolverError> {
    let status_ok = report
        .status
        .is_some_and(|code| ACCEPTED_STATUS.contains(&code));
    if status_ok && !stderr.to_lowercase().contains("error") {
        Ok(report)
    } else {
        Err(SolverError::Failed {
            status: report.status,
            output: report.output,
        })
    }
}
