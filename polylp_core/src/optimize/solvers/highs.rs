//! Implements the solve orchestrator driving the external HiGHS binary
//!
//! Each solve serializes the problem to LP text in a private temp directory,
//! runs the solver as a child process, and classifies what came back. When an
//! IIS is requested, a second solver pass runs concurrently against the same
//! model file with its own artifacts, and is awaited only when the main solve
//! comes back infeasible.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, LazyLock, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::configuration::CONFIGURATION;
use crate::io::iis::{self, Iis};
use crate::io::lp_write::write_problem;
use crate::io::solution::{parse_solution, ParsedSolution};
use crate::optimize::problem::Problem;
use crate::optimize::solvers::{SolveFailure, SolveOutcome, SolverOptions};
use crate::optimize::{Solution, SolutionStatus};

static RELATIVE_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Relative gap:\s*([\d.]+)").unwrap());
static PERCENT_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Gap:\s*([\d.]+)%").unwrap());
static OUTPUT_INFEASIBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Status\s+Infeasible\s*$").unwrap());
static OUTPUT_PRIMAL_INFEASIBLE_OR_UNBOUNDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Status\s+Primal infeasible or unbounded\s*$").unwrap());
static OUTPUT_UNBOUNDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Status\s+Unbounded\s*$").unwrap());

/// Solve a problem with the external solver
///
/// Every failure mode is returned as a [`SolveOutcome`] value; nothing is
/// raised. Temp files are released on every exit path.
pub fn solve(problem: &Problem, options: &SolverOptions) -> SolveOutcome {
    match run(problem, options) {
        Ok(outcome) => outcome,
        Err(failure) => SolveOutcome::Error(failure),
    }
}

fn run(problem: &Problem, options: &SolverOptions) -> Result<SolveOutcome, SolveFailure> {
    let binary = options
        .solver_path
        .clone()
        .unwrap_or_else(|| CONFIGURATION.read().unwrap().solver_path.clone());

    let dir = tempfile::Builder::new().prefix("polylp").tempdir()?;
    let model_path = dir.path().join("model.lp");
    let solution_path = dir.path().join("solution.lp");
    let options_path = dir.path().join("options.txt");

    let model_text = write_problem(problem)?;
    fs::write(&model_path, &model_text)?;
    debug!(model = %model_path.display(), bytes = model_text.len(), "wrote LP model");

    // Spawned after the model file is written and before the main solver is
    // invoked, so both children read a stable input
    let iis_task = if options.compute_iis {
        Some(IisTask::spawn(
            &binary,
            &model_path,
            dir.path(),
            options.time_limit,
        )?)
    } else {
        None
    };

    let mut command = Command::new(&binary);
    command
        .arg(&model_path)
        .arg("--solution_file")
        .arg(&solution_path);
    if let Some(limit) = options.time_limit {
        command.arg("--time_limit").arg(limit.to_string());
    }
    let file_options = render_options_file(options);
    if !file_options.is_empty() {
        fs::write(&options_path, file_options)?;
        command.arg("--options_file").arg(&options_path);
    }

    debug!(
        binary = %binary.display(),
        mip = problem.has_integer_variables(),
        quadratic = problem.has_quadratic_terms(),
        "invoking solver"
    );
    let output = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;
    let exit_code = output.status.code().unwrap_or(-1);
    let mut merged = String::from_utf8_lossy(&output.stdout).into_owned();
    merged.push_str(&String::from_utf8_lossy(&output.stderr));
    debug!(exit_code, "solver finished");

    if exit_code != 0 && exit_code != 1 {
        return Err(SolveFailure::SolverError {
            exit_code,
            output: merged,
            model: model_text,
        });
    }

    let solution_text = fs::read_to_string(&solution_path).ok();
    let outcome = interpret(problem, merged, solution_text, model_text)?;
    match outcome {
        SolveOutcome::Infeasible { output, .. } => {
            let wait = options
                .time_limit
                .unwrap_or_else(|| CONFIGURATION.read().unwrap().iis_wait);
            let iis = iis_task
                .and_then(|task| task.await_within(Duration::from_secs_f64(wait.max(0.))));
            Ok(SolveOutcome::Infeasible { output, iis })
        }
        // Dropping the task kills the second pass and discards its artifacts
        other => Ok(other),
    }
}

/// Classify the solver's artifacts into an outcome
fn interpret(
    problem: &Problem,
    output: String,
    solution_text: Option<String>,
    model_text: String,
) -> Result<SolveOutcome, SolveFailure> {
    let Some(text) = solution_text else {
        return match classify_output(&output) {
            Some(outcome) => Ok(outcome),
            None => Err(SolveFailure::NoSolution {
                output,
                model: model_text,
            }),
        };
    };
    let parsed = match parse_solution(&text) {
        Ok(parsed) => parsed,
        Err(_) => return Err(SolveFailure::ParseError { raw: text, output }),
    };
    let Some(status_text) = parsed.status.clone() else {
        return match classify_output(&output) {
            Some(outcome) => Ok(outcome),
            None => Err(SolveFailure::UnknownStatus { raw: text, output }),
        };
    };
    match classify_status(&status_text) {
        Some(StatusClass::Solution(status)) => {
            let mip_gap = extract_mip_gap(&output);
            Ok(success_outcome(
                status,
                build_solution(problem, status, parsed, mip_gap),
            ))
        }
        Some(StatusClass::Infeasible) => Ok(SolveOutcome::Infeasible { output, iis: None }),
        Some(StatusClass::Unbounded) => Ok(SolveOutcome::Unbounded { output }),
        None => match classify_output(&output) {
            Some(outcome) => Ok(outcome),
            None => Err(SolveFailure::UnknownStatus { raw: text, output }),
        },
    }
}

enum StatusClass {
    Solution(SolutionStatus),
    Infeasible,
    Unbounded,
}

/// Map the solution file's status string to an internal status
fn classify_status(status: &str) -> Option<StatusClass> {
    match status {
        "Optimal" => Some(StatusClass::Solution(SolutionStatus::Optimal)),
        "Bound on objective reached" => Some(StatusClass::Solution(SolutionStatus::ObjectiveBound)),
        "Target for objective reached" => {
            Some(StatusClass::Solution(SolutionStatus::ObjectiveTarget))
        }
        "Time limit reached" => Some(StatusClass::Solution(SolutionStatus::TimeLimit)),
        "Iteration limit reached" => Some(StatusClass::Solution(SolutionStatus::IterationLimit)),
        "Solution limit reached" => Some(StatusClass::Solution(SolutionStatus::SolutionLimit)),
        "Infeasible" | "Primal infeasible or unbounded" => Some(StatusClass::Infeasible),
        "Unbounded" => Some(StatusClass::Unbounded),
        _ => None,
    }
}

/// Fall back to matching the captured output when the solution file is unusable
fn classify_output(output: &str) -> Option<SolveOutcome> {
    if OUTPUT_INFEASIBLE.is_match(output) || OUTPUT_PRIMAL_INFEASIBLE_OR_UNBOUNDED.is_match(output)
    {
        Some(SolveOutcome::Infeasible {
            output: output.to_string(),
            iis: None,
        })
    } else if OUTPUT_UNBOUNDED.is_match(output) {
        Some(SolveOutcome::Unbounded {
            output: output.to_string(),
        })
    } else {
        None
    }
}

fn success_outcome(status: SolutionStatus, solution: Solution) -> SolveOutcome {
    match status {
        SolutionStatus::Optimal => SolveOutcome::Optimal(solution),
        SolutionStatus::TimeLimit => SolveOutcome::TimeLimit(solution),
        SolutionStatus::IterationLimit => SolveOutcome::IterationLimit(solution),
        SolutionStatus::ObjectiveBound => SolveOutcome::ObjectiveBound(solution),
        SolutionStatus::ObjectiveTarget => SolveOutcome::ObjectiveTarget(solution),
        SolutionStatus::SolutionLimit => SolveOutcome::SolutionLimit(solution),
    }
}

/// Assemble a solution, mapping mangled LP names back to the human names
fn build_solution(
    problem: &Problem,
    status: SolutionStatus,
    parsed: ParsedSolution,
    mip_gap: Option<f64>,
) -> Solution {
    let variable_values = parsed
        .variable_values
        .into_iter()
        .map(|(id, value)| {
            let name = problem
                .variable(&id)
                .map(|variable| variable.name.clone())
                .unwrap_or(id);
            (name, value)
        })
        .collect();
    let constraint_values = parsed
        .constraint_values
        .into_iter()
        .map(|(id, value)| {
            let name = problem
                .constraint(&id)
                .map(|constraint| constraint.name.clone())
                .unwrap_or(id);
            (name, value)
        })
        .collect();
    Solution {
        status,
        feasible: parsed.feasible,
        objective_value: parsed.objective,
        variable_values,
        constraint_values,
        mip_gap,
    }
}

/// Extract the relative MIP gap from the solver's log output
fn extract_mip_gap(output: &str) -> Option<f64> {
    if let Some(captures) = RELATIVE_GAP.captures(output) {
        return captures[1].parse().ok();
    }
    if let Some(captures) = PERCENT_GAP.captures(output) {
        return captures[1].parse::<f64>().ok().map(|percent| percent / 100.);
    }
    None
}

/// Lines of the `--options_file`, one per recognized file-only option
fn render_options_file(options: &SolverOptions) -> String {
    let mut lines = String::new();
    if let Some(gap) = options.mip_rel_gap {
        lines.push_str(&format!("mip_rel_gap = {}\n", gap));
    }
    if let Some(log) = options.log_to_console {
        lines.push_str(&format!("log_to_console = {}\n", log));
    }
    if let Some(nodes) = options.mip_max_stall_nodes {
        lines.push_str(&format!("mip_max_stall_nodes = {}\n", nodes));
    }
    lines
}

/// The concurrent IIS pass: a child process supervised by a watcher thread
///
/// The pass reads the shared model file but writes only to its own options
/// and IIS files, so a misbehaving solver cannot corrupt the main solve.
/// Dropping the task kills the child, which covers every path that discards
/// the pass.
struct IisTask {
    child: Arc<Mutex<Child>>,
    done: Receiver<()>,
    watcher: Option<JoinHandle<()>>,
    iis_path: PathBuf,
}

impl IisTask {
    fn spawn(
        binary: &Path,
        model_path: &Path,
        dir: &Path,
        time_limit: Option<f64>,
    ) -> std::io::Result<IisTask> {
        let options_path = dir.join("iis_options.txt");
        let iis_path = dir.join("iis.lp");
        fs::write(
            &options_path,
            format!(
                "write_iis_model_file = {}\niis_strategy = 2\npresolve = off\n",
                iis_path.display()
            ),
        )?;

        let mut command = Command::new(binary);
        command.arg(model_path).arg("--options_file").arg(&options_path);
        if let Some(limit) = time_limit {
            command.arg("--time_limit").arg(limit.to_string());
        }
        command.stdout(Stdio::null()).stderr(Stdio::null());
        let child = Arc::new(Mutex::new(command.spawn()?));
        debug!("spawned IIS pass");

        let (sender, done) = mpsc::channel();
        let watched = Arc::clone(&child);
        let watcher = thread::spawn(move || loop {
            let finished = watched
                .lock()
                .map(|mut child| !matches!(child.try_wait(), Ok(None)))
                .unwrap_or(true);
            if finished {
                let _ = sender.send(());
                break;
            }
            thread::sleep(Duration::from_millis(20));
        });

        Ok(IisTask {
            child,
            done,
            watcher: Some(watcher),
            iis_path,
        })
    }

    /// Wait up to `limit` for the pass, then parse the IIS model it wrote
    fn await_within(self, limit: Duration) -> Option<Iis> {
        match self.done.recv_timeout(limit) {
            Ok(()) => iis::from_file(&self.iis_path),
            Err(RecvTimeoutError::Timeout) => {
                warn!("IIS pass did not finish within the time limit");
                None
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for IisTask {
    fn drop(&mut self) {
        if let Ok(mut child) = self.child.lock() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::constraint::Constraint;
    use crate::optimize::variable::VariableSpec;
    use indexmap::IndexMap;

    #[test]
    fn status_strings_map_to_internal_statuses() {
        assert!(matches!(
            classify_status("Optimal"),
            Some(StatusClass::Solution(SolutionStatus::Optimal))
        ));
        assert!(matches!(
            classify_status("Time limit reached"),
            Some(StatusClass::Solution(SolutionStatus::TimeLimit))
        ));
        assert!(matches!(
            classify_status("Bound on objective reached"),
            Some(StatusClass::Solution(SolutionStatus::ObjectiveBound))
        ));
        assert!(matches!(
            classify_status("Primal infeasible or unbounded"),
            Some(StatusClass::Infeasible)
        ));
        assert!(matches!(
            classify_status("Unbounded"),
            Some(StatusClass::Unbounded)
        ));
        assert!(classify_status("Something new").is_none());
    }

    #[test]
    fn output_fallback_matching() {
        let log = "iterations 5\n  Status  Infeasible\n";
        assert!(matches!(
            classify_output(log),
            Some(SolveOutcome::Infeasible { .. })
        ));
        let log = "Status  Unbounded\n";
        assert!(matches!(
            classify_output(log),
            Some(SolveOutcome::Unbounded { .. })
        ));
        assert!(classify_output("Status  Optimal\n").is_none());
        // The status must sit on its own line
        assert!(classify_output("some Status Infeasible marker\n").is_none());
    }

    #[test]
    fn gap_extraction() {
        assert_eq!(extract_mip_gap("...\nRelative gap: 0.0125\n"), Some(0.0125));
        assert_eq!(extract_mip_gap("Gap: 2.5%"), Some(0.025));
        assert_eq!(extract_mip_gap("no gap here"), None);
        // The absolute form wins when both appear
        assert_eq!(
            extract_mip_gap("Relative gap: 0.5\nGap: 2.5%"),
            Some(0.5)
        );
    }

    #[test]
    fn options_file_rendering() {
        let empty = SolverOptions::default();
        assert!(render_options_file(&empty).is_empty());

        let options = SolverOptions {
            mip_rel_gap: Some(0.01),
            log_to_console: Some(false),
            mip_max_stall_nodes: Some(100),
            ..SolverOptions::default()
        };
        assert_eq!(
            render_options_file(&options),
            "mip_rel_gap = 0.01\nlog_to_console = false\nmip_max_stall_nodes = 100\n"
        );
    }

    #[test]
    fn solutions_are_reported_under_human_names() {
        let mut problem = Problem::new_maximization();
        let x = problem
            .new_variable("width", VariableSpec::continuous(0., 10.))
            .unwrap();
        problem
            .add_constraint(Constraint::less_equal("cap", x.clone(), 10.))
            .unwrap();
        problem.maximize(x).unwrap();

        let parsed = ParsedSolution {
            status: Some("Optimal".to_string()),
            feasible: true,
            objective: 10.,
            variable_values: IndexMap::from([("v000000_width".to_string(), 10.)]),
            constraint_values: IndexMap::from([("c000000_cap".to_string(), 10.)]),
        };
        let solution = build_solution(&problem, SolutionStatus::Optimal, parsed, None);
        assert_eq!(solution.variable_values["width"], 10.);
        assert_eq!(solution.constraint_values["cap"], 10.);
        assert!(solution.feasible);
    }

    #[test]
    fn missing_artifacts_are_classified() {
        let problem = Problem::new_minimization();
        // No solution file, output carries an infeasible status line
        let outcome = interpret(
            &problem,
            "  Status  Infeasible\n".to_string(),
            None,
            String::new(),
        )
        .unwrap();
        assert!(matches!(outcome, SolveOutcome::Infeasible { .. }));

        // No solution file and nothing recognizable in the output
        let failure = interpret(&problem, "garbled".to_string(), None, String::new());
        assert!(matches!(failure, Err(SolveFailure::NoSolution { .. })));

        // Solution file present but with no model status header
        let failure = interpret(
            &problem,
            "garbled".to_string(),
            Some("just text\n".to_string()),
            String::new(),
        );
        assert!(matches!(failure, Err(SolveFailure::UnknownStatus { .. })));
    }
}
