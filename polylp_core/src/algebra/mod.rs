//! Polynomial algebra used to build objective and constraint expressions

pub mod monomial;
pub mod polynomial;

pub use monomial::Monomial;
pub use polynomial::{sum_linear, AlgebraError, Polynomial};
