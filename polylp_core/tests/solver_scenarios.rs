//! End-to-end scenarios driving a real solver binary
//!
//! These tests exercise the whole pipeline: model serialization, child
//! process invocation, solution parsing, and IIS extraction. They are
//! skipped when no solver binary is available on the PATH.

use std::process::Command;

use polylp_core::configuration::CONFIGURATION;
use polylp_core::optimize::constraint::Constraint;
use polylp_core::optimize::problem::Problem;
use polylp_core::optimize::solvers::{solve, SolveOutcome, SolverOptions, SolverOptionsBuilder};
use polylp_core::optimize::variable::VariableSpec;

fn solver_available() -> bool {
    let path = CONFIGURATION.read().unwrap().solver_path.clone();
    Command::new(path)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[test]
fn conflicting_constraints_are_infeasible_and_carry_an_iis() {
    if !solver_available() {
        eprintln!("skipping: no solver binary on PATH");
        return;
    }
    let mut problem = Problem::new_minimization();
    let x = problem.new_variable("x", VariableSpec::default()).unwrap();
    problem
        .add_constraint(Constraint::greater_equal("at_least_ten", x.clone(), 10.))
        .unwrap();
    problem
        .add_constraint(Constraint::less_equal("at_most_five", x.clone(), 5.))
        .unwrap();
    problem.minimize(x).unwrap();

    let options = SolverOptionsBuilder::default()
        .compute_iis(true)
        .time_limit(30.0)
        .build()
        .unwrap();
    match solve(&problem, &options) {
        SolveOutcome::Infeasible { iis, .. } => {
            let iis = iis.expect("IIS was requested but not computed");
            assert!(
                iis.constraints.len() >= 2,
                "expected at least two conflicting constraints, got {:?}",
                iis.constraints
            );
            assert!(
                !iis.variables.is_empty(),
                "expected at least one participating variable"
            );
        }
        other => panic!("expected infeasible, got {:?}", other),
    }
}

#[test]
fn missing_upper_bound_is_unbounded() {
    if !solver_available() {
        eprintln!("skipping: no solver binary on PATH");
        return;
    }
    let mut problem = Problem::new_maximization();
    let x = problem
        .new_variable("x", VariableSpec::continuous(0., None))
        .unwrap();
    problem.maximize(x).unwrap();

    match solve(&problem, &SolverOptions::default()) {
        SolveOutcome::Unbounded { .. } => {}
        other => panic!("expected unbounded, got {:?}", other),
    }
}

#[test]
fn bounded_maximization_reaches_the_upper_bound() {
    if !solver_available() {
        eprintln!("skipping: no solver binary on PATH");
        return;
    }
    let mut problem = Problem::new_maximization();
    let x = problem
        .new_variable("x", VariableSpec::continuous(0., 10.))
        .unwrap();
    problem.maximize(x).unwrap();

    match solve(&problem, &SolverOptions::default()) {
        SolveOutcome::Optimal(solution) => {
            assert!(solution.feasible);
            assert!((solution.objective_value - 10.).abs() < 1e-6);
            assert!((solution.variable_values["x"] - 10.).abs() < 1e-6);
        }
        other => panic!("expected optimal, got {:?}", other),
    }
}

#[test]
fn joint_capacity_conflict_reports_all_participants() {
    if !solver_available() {
        eprintln!("skipping: no solver binary on PATH");
        return;
    }
    let mut problem = Problem::new_minimization();
    let x = problem.new_variable("x", VariableSpec::default()).unwrap();
    let y = problem.new_variable("y", VariableSpec::default()).unwrap();
    problem
        .add_constraint(Constraint::greater_equal("demand", x.plus(&y), 20.))
        .unwrap();
    problem
        .add_constraint(Constraint::less_equal("x_cap", x.clone(), 5.))
        .unwrap();
    problem
        .add_constraint(Constraint::less_equal("y_cap", y.clone(), 10.))
        .unwrap();
    problem.minimize(x.plus(&y)).unwrap();

    let options = SolverOptionsBuilder::default()
        .compute_iis(true)
        .time_limit(30.0)
        .build()
        .unwrap();
    match solve(&problem, &options) {
        SolveOutcome::Infeasible { iis, .. } => {
            let iis = iis.expect("IIS was requested but not computed");
            // Three user constraints plus the objective placeholder row
            assert_eq!(iis.constraints.len(), 4, "constraints: {:?}", iis.constraints);
            assert_eq!(iis.variables.len(), 2, "variables: {:?}", iis.variables);
        }
        other => panic!("expected infeasible, got {:?}", other),
    }
}

#[test]
fn equality_split_puts_everything_in_the_center() {
    if !solver_available() {
        eprintln!("skipping: no solver binary on PATH");
        return;
    }
    let mut problem = Problem::new_maximization();
    let left = problem
        .new_variable("left", VariableSpec::continuous(0., None))
        .unwrap();
    let center = problem
        .new_variable("center", VariableSpec::continuous(0., None))
        .unwrap();
    let right = problem
        .new_variable("right", VariableSpec::continuous(0., None))
        .unwrap();
    problem
        .add_constraint(Constraint::equal(
            "total",
            left.plus(&center).plus(&right),
            300.,
        ))
        .unwrap();
    problem
        .maximize(center.minus(&left).minus(&right))
        .unwrap();

    match solve(&problem, &SolverOptions::default()) {
        SolveOutcome::Optimal(solution) => {
            assert_eq!(solution.constraint_values.len(), 1);
            assert_eq!(solution.variable_values.len(), 3);
            assert!((solution.objective_value - 300.).abs() < 1e-6);
            assert!((solution.variable_values["center"] - 300.).abs() < 1e-6);
        }
        other => panic!("expected optimal, got {:?}", other),
    }
}

#[test]
fn integer_demand_beyond_capacity_is_infeasible() {
    if !solver_available() {
        eprintln!("skipping: no solver binary on PATH");
        return;
    }
    let mut problem = Problem::new_maximization();
    let x = problem
        .new_variable("x", VariableSpec::integer(0., 10.))
        .unwrap();
    let y = problem
        .new_variable("y", VariableSpec::integer(0., 10.))
        .unwrap();
    problem
        .add_constraint(Constraint::greater_equal("demand", x.plus(&y), 25.))
        .unwrap();
    problem.maximize(x.plus(&y)).unwrap();

    match solve(&problem, &SolverOptions::default()) {
        SolveOutcome::Infeasible { .. } => {}
        other => panic!("expected infeasible, got {:?}", other),
    }
}
