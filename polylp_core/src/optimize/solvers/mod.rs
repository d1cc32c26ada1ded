//! Provides the interface to the external solver backend

use std::path::PathBuf;

use derive_builder::Builder;
use thiserror::Error;

use crate::io::iis::Iis;
use crate::io::lp_write::LpWriteError;
use crate::optimize::Solution;

pub mod highs;

pub use highs::solve;

/// Options recognized by the solve orchestrator
///
/// # Examples
/// ```rust
/// use polylp_core::optimize::solvers::SolverOptionsBuilder;
/// let options = SolverOptionsBuilder::default()
///     .time_limit(30.0)
///     .compute_iis(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Debug, Clone, Default, PartialEq)]
pub struct SolverOptions {
    /// Time limit in seconds; also bounds the wait for a requested IIS pass
    #[builder(setter(strip_option), default = "None")]
    pub time_limit: Option<f64>,
    /// Run a concurrent second solver pass that computes an IIS on infeasibility
    #[builder(default = "false")]
    pub compute_iis: bool,
    /// Relative MIP gap at which the solver may stop
    #[builder(setter(strip_option), default = "None")]
    pub mip_rel_gap: Option<f64>,
    /// Stall-node limit forwarded to the solver
    #[builder(setter(strip_option), default = "None")]
    pub mip_max_stall_nodes: Option<i64>,
    /// Whether the solver logs to its console
    #[builder(setter(strip_option), default = "None")]
    pub log_to_console: Option<bool>,
    /// Solver binary to invoke; defaults to the configured path
    #[builder(setter(strip_option, into), default = "None")]
    pub solver_path: Option<PathBuf>,
}

/// The outcome of a solve
///
/// Solver-side failures are values here, not panics or early returns; use
/// [`SolveOutcome::into_result`] for the raising form.
#[derive(Debug)]
pub enum SolveOutcome {
    /// Proven optimum
    Optimal(Solution),
    /// Feasible, stopped by the time limit
    TimeLimit(Solution),
    /// Feasible, stopped by the iteration limit
    IterationLimit(Solution),
    /// Feasible, objective bound reached
    ObjectiveBound(Solution),
    /// Feasible, objective target reached
    ObjectiveTarget(Solution),
    /// Feasible, solution-count limit reached
    SolutionLimit(Solution),
    /// No feasible point exists; `iis` is present iff requested and computed
    Infeasible { output: String, iis: Option<Iis> },
    /// An unbounded direction exists
    Unbounded { output: String },
    /// The solver failed to produce an interpretable artifact
    Error(SolveFailure),
}

impl SolveOutcome {
    /// The solution carried by a success-like outcome
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Optimal(solution)
            | SolveOutcome::TimeLimit(solution)
            | SolveOutcome::IterationLimit(solution)
            | SolveOutcome::ObjectiveBound(solution)
            | SolveOutcome::ObjectiveTarget(solution)
            | SolveOutcome::SolutionLimit(solution) => Some(solution),
            _ => None,
        }
    }

    /// Convert the outcome into a Result, raising the terminal tags
    ///
    /// Infeasible, unbounded, and error outcomes become [`SolveError`]s
    /// carrying the same payloads.
    pub fn into_result(self) -> Result<Solution, SolveError> {
        match self {
            SolveOutcome::Optimal(solution)
            | SolveOutcome::TimeLimit(solution)
            | SolveOutcome::IterationLimit(solution)
            | SolveOutcome::ObjectiveBound(solution)
            | SolveOutcome::ObjectiveTarget(solution)
            | SolveOutcome::SolutionLimit(solution) => Ok(solution),
            SolveOutcome::Infeasible { output, iis } => {
                Err(SolveError::Infeasible { output, iis })
            }
            SolveOutcome::Unbounded { output } => Err(SolveError::Unbounded { output }),
            SolveOutcome::Error(failure) => Err(SolveError::Failure(failure)),
        }
    }
}

/// Ways the solver can fail without producing a usable result
#[derive(Error, Debug)]
pub enum SolveFailure {
    /// The solver exited with a code outside {0, 1}
    #[error("solver exited with code {exit_code}")]
    SolverError {
        exit_code: i32,
        output: String,
        model: String,
    },
    /// The solver exited cleanly but wrote no solution file
    #[error("solver produced no solution file")]
    NoSolution { output: String, model: String },
    /// The solution file was present but unparseable
    #[error("could not parse the solution file")]
    ParseError { raw: String, output: String },
    /// The model status was absent and the output matched no known status
    #[error("could not determine the model status")]
    UnknownStatus { raw: String, output: String },
    /// The problem could not be written in LP format
    #[error(transparent)]
    InvalidModel(#[from] LpWriteError),
    /// An io failure while driving the solver
    #[error("io failure while driving the solver: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised form of the terminal solve outcomes
#[derive(Error, Debug)]
pub enum SolveError {
    /// The problem has no feasible point
    #[error("problem is infeasible")]
    Infeasible { output: String, iis: Option<Iis> },
    /// The problem is unbounded
    #[error("problem is unbounded")]
    Unbounded { output: String },
    /// The solver failed outright
    #[error(transparent)]
    Failure(#[from] SolveFailure),
}
