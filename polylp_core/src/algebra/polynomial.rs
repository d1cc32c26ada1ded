//! Provides the normalized multivariate polynomial underlying objectives and
//! constraint left-hand sides
//!
//! A polynomial is a finite mapping from [`Monomial`] to nonzero coefficient.
//! The representation is always normalized: monomial keys hold their
//! identifiers sorted, and entries with a numerically zero coefficient are
//! absent. Polynomials are immutable values; every operation returns a new
//! normalized polynomial.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{Display, Formatter};
use std::ops::{Add, Div, Mul, Neg, Sub};

use thiserror::Error;

use crate::algebra::monomial::Monomial;

/// A normalized multivariate polynomial with `f64` coefficients
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    // region Creation Functions
    /// The zero polynomial
    pub fn zero() -> Self {
        Polynomial {
            terms: BTreeMap::new(),
        }
    }

    /// A constant polynomial
    pub fn constant(value: f64) -> Self {
        let mut terms = BTreeMap::new();
        if value != 0. {
            terms.insert(Monomial::unit(), value);
        }
        Polynomial { terms }
    }

    /// A polynomial consisting of a single variable with coefficient one
    ///
    /// Fails if the identifier parses as a number, since a numeric identifier
    /// would be ambiguous with a constant term.
    pub fn variable(identifier: impl Into<String>) -> Result<Self, AlgebraError> {
        let identifier = identifier.into();
        if identifier.trim().parse::<f64>().is_ok() {
            return Err(AlgebraError::NumericIdentifier(identifier));
        }
        Ok(Polynomial::term(Monomial::from_identifier(identifier), 1.))
    }

    /// A polynomial consisting of a single term
    pub fn term(monomial: Monomial, coefficient: f64) -> Self {
        let mut terms = BTreeMap::new();
        if coefficient != 0. {
            terms.insert(monomial, coefficient);
        }
        Polynomial { terms }
    }
    // endregion Creation Functions

    // region Inspection
    /// Iterate over the (monomial, coefficient) terms in key order
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, f64)> {
        self.terms.iter().map(|(monomial, coeff)| (monomial, *coeff))
    }

    /// Number of terms with nonzero coefficient
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Maximum degree over all monomial keys; the zero polynomial has degree 0
    pub fn degree(&self) -> usize {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    /// Whether the polynomial has no variable terms
    pub fn is_constant(&self) -> bool {
        self.degree() == 0
    }

    /// Whether the polynomial is identically zero
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The constant value of a degree-0 polynomial
    pub fn to_number(&self) -> Result<f64, AlgebraError> {
        if !self.is_constant() {
            return Err(AlgebraError::NonConstant(self.to_string()));
        }
        Ok(self.terms.get(&Monomial::unit()).copied().unwrap_or(0.))
    }

    /// Sorted unique list of variable identifiers appearing anywhere
    pub fn variables(&self) -> Vec<String> {
        self.terms
            .keys()
            .flat_map(|monomial| monomial.identifiers().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
    // endregion Inspection

    // region Arithmetic
    /// Sum of two polynomials
    pub fn plus(&self, other: &Polynomial) -> Polynomial {
        let mut terms = self.terms.clone();
        for (monomial, coeff) in &other.terms {
            *terms.entry(monomial.clone()).or_insert(0.) += coeff;
        }
        terms.retain(|_, coeff| *coeff != 0.);
        Polynomial { terms }
    }

    /// Difference of two polynomials
    pub fn minus(&self, other: &Polynomial) -> Polynomial {
        let mut terms = self.terms.clone();
        for (monomial, coeff) in &other.terms {
            *terms.entry(monomial.clone()).or_insert(0.) -= coeff;
        }
        terms.retain(|_, coeff| *coeff != 0.);
        Polynomial { terms }
    }

    /// Product of two polynomials
    ///
    /// Distributes over all term pairs; the result monomial of each pair is
    /// the sorted concatenation of the input monomials. Like monomials are
    /// combined and zero coefficients pruned.
    pub fn times(&self, other: &Polynomial) -> Polynomial {
        let mut terms: BTreeMap<Monomial, f64> = BTreeMap::new();
        for (left_key, left_coeff) in &self.terms {
            for (right_key, right_coeff) in &other.terms {
                *terms.entry(left_key.product(right_key)).or_insert(0.) +=
                    left_coeff * right_coeff;
            }
        }
        terms.retain(|_, coeff| *coeff != 0.);
        Polynomial { terms }
    }

    /// Multiply every coefficient by a scalar; zero collapses the polynomial
    pub fn scale(&self, multiplier: f64) -> Polynomial {
        if multiplier == 0. {
            return Polynomial::zero();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|(monomial, coeff)| (monomial.clone(), coeff * multiplier))
                .collect(),
        }
    }

    /// Divide by a constant polynomial
    ///
    /// Equivalent to multiplying by the reciprocal of the divisor's constant
    /// value. Fails when the divisor has any variable term.
    pub fn divide(&self, divisor: &Polynomial) -> Result<Polynomial, AlgebraError> {
        if !divisor.is_constant() {
            return Err(AlgebraError::NonConstantDivisor {
                divisor: divisor.to_string(),
            });
        }
        let value = divisor.terms.get(&Monomial::unit()).copied().unwrap_or(0.);
        Ok(self.scale(1. / value))
    }

    /// Raise to a nonnegative integer power by repeated multiplication
    pub fn powi(&self, exponent: u32) -> Polynomial {
        let mut result = Polynomial::constant(1.);
        for _ in 0..exponent {
            result = result.times(self);
        }
        result
    }
    // endregion Arithmetic

    // region Substitution and Evaluation
    /// Replace variable identifiers with polynomial images
    ///
    /// Each identifier inside every monomial is replaced with its image under
    /// the mapping (identifiers without an image stay themselves), the
    /// per-monomial products are scaled by the original coefficients, and the
    /// results are summed.
    pub fn substitute(&self, substitutions: &HashMap<String, Polynomial>) -> Polynomial {
        let parts = self.terms.iter().map(|(monomial, coeff)| {
            let mut product = Polynomial::constant(*coeff);
            for identifier in monomial.identifiers() {
                let image = match substitutions.get(identifier) {
                    Some(polynomial) => polynomial.clone(),
                    None => Polynomial::term(Monomial::from_identifier(identifier.clone()), 1.),
                };
                product = product.times(&image);
            }
            product
        });
        sum_linear(parts)
    }

    /// Evaluate under a full variable assignment
    ///
    /// Fails listing the free variables when the assignment does not cover
    /// every identifier in the polynomial.
    pub fn evaluate(&self, assignment: &HashMap<String, f64>) -> Result<f64, AlgebraError> {
        let free: Vec<String> = self
            .variables()
            .into_iter()
            .filter(|identifier| !assignment.contains_key(identifier))
            .collect();
        if !free.is_empty() {
            return Err(AlgebraError::FreeVariables(free));
        }
        Ok(self
            .terms
            .iter()
            .map(|(monomial, coeff)| {
                monomial
                    .identifiers()
                    .iter()
                    .fold(*coeff, |product, identifier| product * assignment[identifier])
            })
            .sum())
    }
    // endregion Substitution and Evaluation
}

/// Sum a sequence of polynomials (or numbers) in bulk
///
/// Produces the same polynomial as folding the sequence with addition, but
/// builds the result in one accumulation pass over the flat sequence of
/// terms instead of merging an intermediate polynomial per element. Summing
/// an objective with tens of thousands of terms stays well under a second
/// this way.
pub fn sum_linear<I>(items: I) -> Polynomial
where
    I: IntoIterator,
    I::Item: Into<Polynomial>,
{
    let mut terms: BTreeMap<Monomial, f64> = BTreeMap::new();
    for item in items {
        for (monomial, coeff) in item.into().terms {
            *terms.entry(monomial).or_insert(0.) += coeff;
        }
    }
    terms.retain(|_, coeff| *coeff != 0.);
    Polynomial { terms }
}

/// Errors from polynomial construction and value-domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraError {
    /// A numeric value was used where a variable identifier is required
    #[error("numeric value `{0}` cannot be used as a variable identifier")]
    NumericIdentifier(String),
    /// Division by a polynomial that is not a constant
    #[error("cannot divide by the non-constant polynomial `{divisor}`")]
    NonConstantDivisor { divisor: String },
    /// A non-constant polynomial was used where a number is required
    #[error("polynomial `{0}` is not a constant")]
    NonConstant(String),
    /// Evaluation was attempted with an incomplete variable assignment
    #[error("evaluation left free variables: {0:?}")]
    FreeVariables(Vec<String>),
}

impl From<f64> for Polynomial {
    fn from(value: f64) -> Self {
        Polynomial::constant(value)
    }
}

impl From<i32> for Polynomial {
    fn from(value: i32) -> Self {
        Polynomial::constant(value as f64)
    }
}

impl From<&Polynomial> for Polynomial {
    fn from(polynomial: &Polynomial) -> Self {
        polynomial.clone()
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let rendered = self
            .terms
            .iter()
            .map(|(monomial, coeff)| {
                if monomial.is_unit() {
                    format!("{}", coeff)
                } else if *coeff == 1. {
                    monomial.to_string()
                } else {
                    format!("{} {}", coeff, monomial)
                }
            })
            .collect::<Vec<_>>()
            .join(" + ");
        write!(f, "{}", rendered)
    }
}

// region Operator Overloading
/*
Operator impls cover owned and borrowed polynomials and f64 scalars on either
side, so expressions read the way they are written mathematically:
    let objective = &x * 2. + &y - 1.;
*/
impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: &Polynomial) -> Polynomial {
        self.plus(rhs)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        self.plus(&rhs)
    }
}

impl Add<f64> for &Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: f64) -> Polynomial {
        self.plus(&Polynomial::constant(rhs))
    }
}

impl Add<f64> for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: f64) -> Polynomial {
        self.plus(&Polynomial::constant(rhs))
    }
}

impl Add<Polynomial> for f64 {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        Polynomial::constant(self).plus(&rhs)
    }
}

impl Sub<&Polynomial> for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: &Polynomial) -> Polynomial {
        self.minus(rhs)
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        self.minus(&rhs)
    }
}

impl Sub<f64> for &Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: f64) -> Polynomial {
        self.minus(&Polynomial::constant(rhs))
    }
}

impl Sub<f64> for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: f64) -> Polynomial {
        self.minus(&Polynomial::constant(rhs))
    }
}

impl Sub<Polynomial> for f64 {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        Polynomial::constant(self).minus(&rhs)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        self.times(rhs)
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        self.times(&rhs)
    }
}

impl Mul<f64> for &Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: f64) -> Polynomial {
        self.scale(rhs)
    }
}

impl Mul<f64> for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: f64) -> Polynomial {
        self.scale(rhs)
    }
}

impl Mul<Polynomial> for f64 {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        rhs.scale(self)
    }
}

impl Mul<&Polynomial> for f64 {
    type Output = Polynomial;
    fn mul(self, rhs: &Polynomial) -> Polynomial {
        rhs.scale(self)
    }
}

impl Div<f64> for &Polynomial {
    type Output = Polynomial;
    fn div(self, rhs: f64) -> Polynomial {
        self.scale(1. / rhs)
    }
}

impl Div<f64> for Polynomial {
    type Output = Polynomial;
    fn div(self, rhs: f64) -> Polynomial {
        self.scale(1. / rhs)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        self.scale(-1.)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        self.scale(-1.)
    }
}
// endregion Operator Overloading
