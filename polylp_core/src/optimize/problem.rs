//! Provides struct representing an optimization problem
use indexmap::IndexMap;
use thiserror::Error;

use crate::algebra::{AlgebraError, Monomial, Polynomial};
use crate::optimize::constraint::Constraint;
use crate::optimize::variable::{Variable, VariableSpec, VariableType};

/// An optimization problem: a direction, an objective polynomial, and a set
/// of named variables and constraints
///
/// Variables and constraints are registered under mangled identifiers built
/// from a monotonically increasing counter, so that identifiers are unique
/// across the problem, legal LP names, and sort in insertion order. The
/// mangled identifier is what appears in the LP text; solutions are reported
/// back under the human names.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Whether the objective is maximized or minimized
    direction: Direction,
    /// Variables of the problem, keyed by mangled id
    variables: IndexMap<String, Variable>,
    /// Constraints of the problem, keyed by mangled id
    constraints: IndexMap<String, Constraint>,
    /// Objective polynomial, zero until a directional helper adds to it
    objective: Polynomial,
    /// Counter backing variable id mangling
    next_variable: usize,
    /// Counter backing constraint id mangling
    next_constraint: usize,
}

impl Problem {
    // region Creation Functions
    /// Create a new empty problem
    pub fn new(direction: Direction) -> Self {
        Problem {
            direction,
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            objective: Polynomial::zero(),
            next_variable: 0,
            next_constraint: 0,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(Direction::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(Direction::Minimize)
    }
    // endregion Creation Functions

    // region Accessors
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Variables keyed by mangled id, in registration order
    pub fn variables(&self) -> &IndexMap<String, Variable> {
        &self.variables
    }

    /// Constraints keyed by mangled id, in registration order
    pub fn constraints(&self) -> &IndexMap<String, Constraint> {
        &self.constraints
    }

    pub fn objective(&self) -> &Polynomial {
        &self.objective
    }

    /// Look up a variable by its mangled id
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Look up a constraint by its mangled id
    pub fn constraint(&self, id: &str) -> Option<&Constraint> {
        self.constraints.get(id)
    }
    // endregion Accessors

    // region Adding Variables
    /// Create a new variable and return the polynomial standing for it
    ///
    /// The returned polynomial is the handle used to build objective and
    /// constraint expressions.
    ///
    /// # Examples
    /// ```rust
    /// use polylp_core::optimize::problem::Problem;
    /// use polylp_core::optimize::variable::VariableSpec;
    /// let mut problem = Problem::new_maximization();
    /// let x = problem
    ///     .new_variable("x", VariableSpec::continuous(0.0, 10.0))
    ///     .unwrap();
    /// problem.maximize(x).unwrap();
    /// ```
    pub fn new_variable(
        &mut self,
        name: &str,
        spec: VariableSpec,
    ) -> Result<Polynomial, ProblemError> {
        if let (Some(lower), Some(upper)) = (spec.min, spec.max) {
            if lower > upper {
                return Err(ProblemError::InvalidVariableBounds { lower, upper });
            }
        }
        let id = format!("v{:06}_{}", self.next_variable, sanitize_identifier(name));
        self.next_variable += 1;
        self.variables.insert(
            id.clone(),
            Variable {
                id: id.clone(),
                name: name.to_string(),
                lower_bound: spec.min,
                upper_bound: spec.max,
                variable_type: spec.variable_type,
            },
        );
        Ok(Polynomial::term(Monomial::from_identifier(id), 1.))
    }

    /// Update the bounds of a variable, by mangled id
    pub fn update_variable_bounds(
        &mut self,
        id: &str,
        lower_bound: Option<f64>,
        upper_bound: Option<f64>,
    ) -> Result<(), ProblemError> {
        if let (Some(lower), Some(upper)) = (lower_bound, upper_bound) {
            if lower > upper {
                return Err(ProblemError::InvalidVariableBounds { lower, upper });
            }
        }
        match self.variables.get_mut(id) {
            Some(variable) => {
                variable.lower_bound = lower_bound;
                variable.upper_bound = upper_bound;
                Ok(())
            }
            None => Err(ProblemError::NonExistentVariable(id.to_string())),
        }
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ProblemError> {
        let degree = constraint.lhs.degree();
        if degree > 2 {
            return Err(ProblemError::ConstraintDegreeTooHigh {
                name: constraint.name,
                degree,
            });
        }
        let missing = self.unknown_variables(&constraint.lhs);
        if !missing.is_empty() {
            return Err(ProblemError::UnknownVariablesInConstraint {
                name: constraint.name,
                missing,
            });
        }
        let id = format!(
            "c{:06}_{}",
            self.next_constraint,
            sanitize_identifier(&constraint.name)
        );
        self.next_constraint += 1;
        self.constraints.insert(id, constraint);
        Ok(())
    }

    /// Remove a constraint (by mangled id) from the problem
    pub fn remove_constraint(&mut self, id: &str) {
        self.constraints.shift_remove(id);
    }
    // endregion Adding Constraints

    // region Objective
    /// Add an expression to be maximized
    ///
    /// Respects the problem direction: in a minimization problem the
    /// expression is subtracted instead, so that larger values of the
    /// expression are still preferred.
    pub fn maximize(&mut self, polynomial: Polynomial) -> Result<(), ProblemError> {
        match self.direction {
            Direction::Maximize => self.increment_objective(polynomial),
            Direction::Minimize => self.decrement_objective(polynomial),
        }
    }

    /// Add an expression to be minimized
    ///
    /// The directional mirror of [`Problem::maximize`].
    pub fn minimize(&mut self, polynomial: Polynomial) -> Result<(), ProblemError> {
        match self.direction {
            Direction::Minimize => self.increment_objective(polynomial),
            Direction::Maximize => self.decrement_objective(polynomial),
        }
    }

    /// Add an expression to the objective
    pub fn increment_objective(&mut self, polynomial: Polynomial) -> Result<(), ProblemError> {
        self.validate_objective_part(&polynomial)?;
        self.objective = self.objective.plus(&polynomial);
        Ok(())
    }

    /// Subtract an expression from the objective
    pub fn decrement_objective(&mut self, polynomial: Polynomial) -> Result<(), ProblemError> {
        self.validate_objective_part(&polynomial)?;
        self.objective = self.objective.minus(&polynomial);
        Ok(())
    }
    // endregion Objective

    // region Validation Functions
    /// Identifiers of the polynomial that are not registered variables
    fn unknown_variables(&self, polynomial: &Polynomial) -> Vec<String> {
        polynomial
            .variables()
            .into_iter()
            .filter(|identifier| !self.variables.contains_key(identifier))
            .collect()
    }

    fn validate_objective_part(&self, polynomial: &Polynomial) -> Result<(), ProblemError> {
        let degree = self.objective.plus(polynomial).degree();
        if degree > 2 {
            return Err(ProblemError::ObjectiveDegreeTooHigh { degree });
        }
        let missing = self.unknown_variables(polynomial);
        if !missing.is_empty() {
            return Err(ProblemError::UnknownVariablesInObjective { missing });
        }
        Ok(())
    }
    // endregion Validation Functions

    // region Check Problem
    /// Whether any variable is integer or binary
    pub fn has_integer_variables(&self) -> bool {
        self.variables.values().any(|variable| {
            matches!(
                variable.variable_type,
                VariableType::Integer | VariableType::Binary
            )
        })
    }

    /// Whether the objective or any constraint has a quadratic term
    pub fn has_quadratic_terms(&self) -> bool {
        self.objective.degree() == 2
            || self
                .constraints
                .values()
                .any(|constraint| constraint.lhs.degree() == 2)
    }
    // endregion Check Problem
}

fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Whether the objective is maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Errors associated with building a Problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Error when trying to add a variable with lower_bound > upper_bound
    #[error("variable bounds are invalid: lower bound {lower} exceeds upper bound {upper}")]
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// Error when a constraint left-hand side exceeds degree 2
    #[error("constraint `{name}` has degree {degree}, but the LP format supports at most degree 2")]
    ConstraintDegreeTooHigh { name: String, degree: usize },
    /// Error when the objective would exceed degree 2
    #[error("objective has degree {degree}, but the LP format supports at most degree 2")]
    ObjectiveDegreeTooHigh { degree: usize },
    /// Error when a constraint references variables not in the problem
    #[error("constraint `{name}` references unregistered variables: {missing:?}")]
    UnknownVariablesInConstraint { name: String, missing: Vec<String> },
    /// Error when the objective references variables not in the problem
    #[error("objective references unregistered variables: {missing:?}")]
    UnknownVariablesInObjective { missing: Vec<String> },
    /// Error when trying to update a variable that doesn't exist
    #[error("no variable with id `{0}` exists")]
    NonExistentVariable(String),
    /// Error raised by the underlying polynomial algebra
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}
