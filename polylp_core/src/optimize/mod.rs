//! Module for constructing and solving optimization problems

pub mod constraint;
pub mod problem;
pub mod solvers;
pub mod variable;

use indexmap::IndexMap;

/// Struct representing the solution to an optimization problem
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// How the solver finished (proven optimum, or which limit stopped it)
    pub status: SolutionStatus,
    /// Whether the reported point is feasible
    pub feasible: bool,
    /// Objective value at the reported point
    pub objective_value: f64,
    /// Values of the variables at the reported point, keyed by variable name
    pub variable_values: IndexMap<String, f64>,
    /// Evaluated constraint left-hand sides, keyed by constraint name
    pub constraint_values: IndexMap<String, f64>,
    /// Relative MIP gap reported by the solver, when one was reported
    pub mip_gap: Option<f64>,
}

/// Status of a solve that produced a solution
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Proven optimum
    Optimal,
    /// Feasible, stopped by the time limit
    TimeLimit,
    /// Feasible, stopped by the iteration limit
    IterationLimit,
    /// Feasible, objective bound reached
    ObjectiveBound,
    /// Feasible, objective target reached
    ObjectiveTarget,
    /// Feasible, solution-count limit reached
    SolutionLimit,
}
