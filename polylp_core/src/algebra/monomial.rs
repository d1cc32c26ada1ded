//! Provides the monomial keys of the polynomial representation
use std::fmt::{Display, Formatter};

/// A product of decision variables, stored as a sorted multiset of variable
/// identifiers
///
/// A repeated identifier raises that variable's exponent, so `[x, x]` is x².
/// The empty multiset is the key of the constant term. Keeping the
/// identifiers sorted means `x·y` and `y·x` share a single key, which is what
/// lets polynomial operations combine like terms by key equality alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Monomial(Vec<String>);

impl Monomial {
    /// The key of the constant term
    pub fn unit() -> Self {
        Monomial(Vec::new())
    }

    /// Create a monomial from variable identifiers given in any order
    pub fn new(mut identifiers: Vec<String>) -> Self {
        identifiers.sort();
        Monomial(identifiers)
    }

    /// Create the degree-one monomial of a single variable
    pub fn from_identifier(identifier: impl Into<String>) -> Self {
        Monomial(vec![identifier.into()])
    }

    /// Total degree of the monomial, counting repeated identifiers
    pub fn degree(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the constant term's key
    pub fn is_unit(&self) -> bool {
        self.0.is_empty()
    }

    /// The identifiers of the monomial, in sorted order
    pub fn identifiers(&self) -> &[String] {
        &self.0
    }

    /// Merge two monomials into the key of their product
    pub fn product(&self, other: &Monomial) -> Monomial {
        let mut identifiers = Vec::with_capacity(self.0.len() + other.0.len());
        identifiers.extend_from_slice(&self.0);
        identifiers.extend_from_slice(&other.0);
        identifiers.sort();
        Monomial(identifiers)
    }

    /// Collapse the sorted identifiers into (identifier, exponent) runs
    pub fn powers(&self) -> Vec<(&str, usize)> {
        let mut runs: Vec<(&str, usize)> = Vec::new();
        for identifier in &self.0 {
            match runs.last_mut() {
                Some((name, count)) if *name == identifier.as_str() => *count += 1,
                _ => runs.push((identifier.as_str(), 1)),
            }
        }
        runs
    }
}

impl Display for Monomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_unit() {
            return write!(f, "1");
        }
        let rendered = self
            .powers()
            .iter()
            .map(|(name, power)| {
                if *power == 1 {
                    (*name).to_string()
                } else {
                    format!("{}^{}", name, power)
                }
            })
            .collect::<Vec<_>>()
            .join("*");
        write!(f, "{}", rendered)
    }
}
