//! Provides struct for representing a constraint in an optimization problem
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::algebra::{AlgebraError, Polynomial};

/// A linear or quadratic constraint: `lhs op rhs`
///
/// The left-hand side is a polynomial of degree at most two; the right-hand
/// side is a number. The problem enforces the degree limit and variable
/// registration when the constraint is added.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Human name of the constraint, used in solution and IIS reporting
    pub name: String,
    /// Left-hand side polynomial
    pub lhs: Polynomial,
    /// Comparison between the left- and right-hand sides
    pub op: ComparisonOp,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    /// Create a new constraint
    pub fn new(name: impl Into<String>, lhs: Polynomial, op: ComparisonOp, rhs: f64) -> Self {
        Constraint {
            name: name.into(),
            lhs,
            op,
            rhs,
        }
    }

    /// Create a `lhs <= rhs` constraint
    pub fn less_equal(name: impl Into<String>, lhs: Polynomial, rhs: f64) -> Self {
        Constraint::new(name, lhs, ComparisonOp::Le, rhs)
    }

    /// Create a `lhs >= rhs` constraint
    pub fn greater_equal(name: impl Into<String>, lhs: Polynomial, rhs: f64) -> Self {
        Constraint::new(name, lhs, ComparisonOp::Ge, rhs)
    }

    /// Create a `lhs = rhs` constraint
    pub fn equal(name: impl Into<String>, lhs: Polynomial, rhs: f64) -> Self {
        Constraint::new(name, lhs, ComparisonOp::Eq, rhs)
    }

    /// Evaluate the left-hand side under a full variable assignment
    pub fn evaluate(&self, assignment: &HashMap<String, f64>) -> Result<f64, AlgebraError> {
        self.lhs.evaluate(assignment)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} {} {}", self.name, self.lhs, self.op, self.rhs)
    }
}

/// Comparison operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Less than or equal
    Le,
    /// Greater than or equal
    Ge,
    /// Equal
    Eq,
}

impl Display for ComparisonOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonOp::Le => write!(f, "<="),
            ComparisonOp::Ge => write!(f, ">="),
            ComparisonOp::Eq => write!(f, "="),
        }
    }
}
