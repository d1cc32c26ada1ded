//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A named decision variable registered in a problem
///
/// The `id` is the mangled identifier the problem assigned at registration;
/// it is the name used in the LP text, and it is unique across the problem.
/// The `name` is the human name the variable was created with.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub variable_type: VariableType,
}

/// The user-facing description of a variable to be created
///
/// # Examples
/// ```rust
/// use polylp_core::optimize::variable::{VariableSpecBuilder, VariableType};
/// let spec = VariableSpecBuilder::default()
///     .min(0.0)
///     .max(10.0)
///     .variable_type(VariableType::Integer)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct VariableSpec {
    /// Lower bound, None leaves the variable unbounded below
    #[builder(setter(strip_option), default = "None")]
    pub min: Option<f64>,
    /// Upper bound, None leaves the variable unbounded above
    #[builder(setter(strip_option), default = "None")]
    pub max: Option<f64>,
    /// Type of variable, Continuous, Integer, or Binary
    #[builder(default = "VariableType::Continuous")]
    pub variable_type: VariableType,
}

impl Default for VariableSpec {
    fn default() -> Self {
        VariableSpec {
            min: None,
            max: None,
            variable_type: VariableType::Continuous,
        }
    }
}

impl VariableSpec {
    /// A continuous variable with the given bounds
    pub fn continuous(min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> Self {
        VariableSpec {
            min: min.into(),
            max: max.into(),
            variable_type: VariableType::Continuous,
        }
    }

    /// An integer variable with the given bounds
    pub fn integer(min: impl Into<Option<f64>>, max: impl Into<Option<f64>>) -> Self {
        VariableSpec {
            min: min.into(),
            max: max.into(),
            variable_type: VariableType::Integer,
        }
    }

    /// A binary variable; the type tag fully specifies its bounds
    pub fn binary() -> Self {
        VariableSpec {
            min: None,
            max: None,
            variable_type: VariableType::Binary,
        }
    }
}

/// Represents the type of variable in an optimization problem
#[derive(Debug, PartialEq, Clone, Copy, Hash, Eq)]
pub enum VariableType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable
    Binary,
}

impl Display for VariableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "CONTINUOUS"),
            VariableType::Integer => write!(f, "INTEGER"),
            VariableType::Binary => write!(f, "BINARY"),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.variable_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_defaults() {
        let spec = VariableSpecBuilder::default().build().unwrap();
        assert_eq!(spec, VariableSpec::default());
        assert_eq!(spec.variable_type, VariableType::Continuous);
        assert!(spec.min.is_none());
        assert!(spec.max.is_none());
    }

    #[test]
    fn spec_builder_sets_fields() {
        let spec = VariableSpecBuilder::default()
            .min(0.)
            .max(5.)
            .variable_type(VariableType::Integer)
            .build()
            .unwrap();
        assert_eq!(spec.min, Some(0.));
        assert_eq!(spec.max, Some(5.));
        assert_eq!(spec.variable_type, VariableType::Integer);
    }

    #[test]
    fn spec_shorthands() {
        assert_eq!(
            VariableSpec::continuous(0., 1.),
            VariableSpecBuilder::default().min(0.).max(1.).build().unwrap()
        );
        assert_eq!(VariableSpec::binary().variable_type, VariableType::Binary);
        assert_eq!(VariableSpec::integer(None, 9.).min, None);
    }
}
