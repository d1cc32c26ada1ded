//! Serializes a problem to the LP text format consumed by the solver
//!
//! The output is deterministic: two calls with equal problem values emit
//! identical bytes. Variables and constraints appear in sorted-by-mangled-id
//! order, and polynomial terms in monomial key order.

use thiserror::Error;

use crate::algebra::{Monomial, Polynomial};
use crate::optimize::problem::{Direction, Problem};
use crate::optimize::variable::VariableType;

/// How quadratic coefficients are written inside the bracketed block
///
/// The solver applies its `/ 2` convention to the objective only, so the
/// objective doubles each quadratic coefficient inside the brackets while
/// constraints write them as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuadraticScaling {
    Objective,
    Constraint,
}

/// Serialize a problem to LP text
pub fn write_problem(problem: &Problem) -> Result<String, LpWriteError> {
    let mut out = String::new();

    match problem.direction() {
        Direction::Maximize => out.push_str("Maximize\n"),
        Direction::Minimize => out.push_str("Minimize\n"),
    }
    out.push_str("  ");
    out.push_str(&write_polynomial(
        problem.objective(),
        QuadraticScaling::Objective,
    )?);
    out.push('\n');

    out.push_str("Subject To\n");
    let mut constraints: Vec<_> = problem.constraints().iter().collect();
    constraints.sort_by_key(|(id, _)| id.as_str());
    for (id, constraint) in constraints {
        out.push_str(&format!(
            "  {}: {} {} {}\n",
            id,
            write_polynomial(&constraint.lhs, QuadraticScaling::Constraint)?,
            constraint.op,
            format_number(constraint.rhs),
        ));
    }

    let mut variables: Vec<_> = problem.variables().iter().collect();
    variables.sort_by_key(|(id, _)| id.as_str());

    out.push_str("Bounds\n");
    for (id, variable) in &variables {
        // Binary variables are fully specified by their type declaration
        if variable.variable_type == VariableType::Binary {
            continue;
        }
        match (variable.lower_bound, variable.upper_bound) {
            (None, None) => out.push_str(&format!("  {} free\n", id)),
            (None, Some(upper)) => {
                out.push_str(&format!("  {} <= {}\n", id, format_number(upper)))
            }
            (Some(lower), None) => {
                out.push_str(&format!("  {} <= {}\n", format_number(lower), id))
            }
            (Some(lower), Some(upper)) => {
                out.push_str(&format!("  {} <= {}\n", format_number(lower), id));
                out.push_str(&format!("  {} <= {}\n", id, format_number(upper)));
            }
        }
    }

    let integers: Vec<&str> = variables
        .iter()
        .filter(|(_, v)| v.variable_type == VariableType::Integer)
        .map(|(id, _)| id.as_str())
        .collect();
    if !integers.is_empty() {
        out.push_str("General\n");
        for id in integers {
            out.push_str(&format!("  {}\n", id));
        }
    }

    let binaries: Vec<&str> = variables
        .iter()
        .filter(|(_, v)| v.variable_type == VariableType::Binary)
        .map(|(id, _)| id.as_str())
        .collect();
    if !binaries.is_empty() {
        out.push_str("Binary\n");
        for id in binaries {
            out.push_str(&format!("  {}\n", id));
        }
    }

    out.push_str("End\n");
    Ok(out)
}

/// Render a polynomial as an LP expression
///
/// Degree-0 and degree-1 terms are written first in key order, each signed;
/// degree-2 terms follow in a single `+ [ ... ] / 2` block.
fn write_polynomial(
    polynomial: &Polynomial,
    scaling: QuadraticScaling,
) -> Result<String, LpWriteError> {
    let mut linear: Vec<String> = Vec::new();
    let mut quadratic: Vec<String> = Vec::new();
    for (monomial, coefficient) in polynomial.terms() {
        match monomial.degree() {
            0 => linear.push(signed_term(coefficient, None)),
            1 => linear.push(signed_term(coefficient, Some(&monomial_text(monomial)))),
            2 => {
                let coefficient = match scaling {
                    QuadraticScaling::Objective => coefficient * 2.,
                    QuadraticScaling::Constraint => coefficient,
                };
                quadratic.push(signed_term(coefficient, Some(&monomial_text(monomial))));
            }
            degree => return Err(LpWriteError::DegreeTooHigh { degree }),
        }
    }
    let mut parts = linear;
    if !quadratic.is_empty() {
        parts.push(format!("+ [ {} ] / 2", quadratic.join(" ")));
    }
    if parts.is_empty() {
        parts.push("0".to_string());
    }
    Ok(parts.join(" "))
}

/// `+ |c| term` or `- |c| term`; a missing term renders the bare constant
fn signed_term(coefficient: f64, term: Option<&str>) -> String {
    let sign = if coefficient < 0. { '-' } else { '+' };
    match term {
        Some(term) => format!("{} {} {}", sign, format_number(coefficient.abs()), term),
        None => format!("{} {}", sign, format_number(coefficient.abs())),
    }
}

/// Variables of a quadratic monomial joined by ` * `, squares as `name^2`
fn monomial_text(monomial: &Monomial) -> String {
    monomial
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
        .join(" * ")
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Errors from LP serialization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpWriteError {
    /// A polynomial of degree above 2 cannot be written in LP format
    #[error("polynomial has degree {degree}, but the LP format supports at most degree 2")]
    DegreeTooHigh { degree: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::sum_linear;
    use crate::optimize::constraint::Constraint;
    use crate::optimize::variable::VariableSpec;

    fn small_problem() -> Problem {
        let mut problem = Problem::new_maximization();
        let x = problem
            .new_variable("x", VariableSpec::continuous(0., 10.))
            .unwrap();
        let y = problem
            .new_variable("y", VariableSpec::continuous(None, 4.))
            .unwrap();
        problem
            .add_constraint(Constraint::less_equal("cap", x.plus(&y), 12.))
            .unwrap();
        problem.maximize(x.plus(&y.scale(2.))).unwrap();
        problem
    }

    #[test]
    fn emits_expected_sections() {
        let text = write_problem(&small_problem()).unwrap();
        let expected = "Maximize\n\
                        \x20 + 1 v000000_x + 2 v000001_y\n\
                        Subject To\n\
                        \x20 c000000_cap: + 1 v000000_x + 1 v000001_y <= 12\n\
                        Bounds\n\
                        \x20 0 <= v000000_x\n\
                        \x20 v000000_x <= 10\n\
                        \x20 v000001_y <= 4\n\
                        End\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn output_is_deterministic() {
        let first = write_problem(&small_problem()).unwrap();
        let second = write_problem(&small_problem()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn iterated_add_and_bulk_sum_emit_identical_bytes() {
        let build = |bulk: bool| {
            let mut problem = Problem::new_minimization();
            let vars: Vec<_> = (0..6)
                .map(|i| {
                    problem
                        .new_variable(&format!("x{}", i), VariableSpec::continuous(0., 1.))
                        .unwrap()
                })
                .collect();
            let objective = if bulk {
                sum_linear(vars.iter().map(|v| v.scale(3.)))
            } else {
                vars.iter()
                    .map(|v| v.scale(3.))
                    .fold(Polynomial::zero(), |acc, p| acc.plus(&p))
            };
            problem.minimize(objective).unwrap();
            write_problem(&problem).unwrap()
        };
        assert_eq!(build(true), build(false));
    }

    #[test]
    fn free_and_one_sided_bounds() {
        let mut problem = Problem::new_minimization();
        let free = problem.new_variable("f", VariableSpec::default()).unwrap();
        let low = problem
            .new_variable("lo", VariableSpec::continuous(2., None))
            .unwrap();
        problem.minimize(free.plus(&low)).unwrap();
        let text = write_problem(&problem).unwrap();
        assert!(text.contains("  v000000_f free\n"));
        assert!(text.contains("  2 <= v000001_lo\n"));
        assert!(!text.contains("v000001_lo <="));
    }

    #[test]
    fn binary_variables_skip_bounds() {
        let mut problem = Problem::new_maximization();
        let b = problem.new_variable("b", VariableSpec::binary()).unwrap();
        let n = problem
            .new_variable("n", VariableSpec::integer(0., 3.))
            .unwrap();
        problem.maximize(b.plus(&n)).unwrap();
        let text = write_problem(&problem).unwrap();
        assert!(text.contains("Binary\n  v000000_b\n"));
        assert!(text.contains("General\n  v000001_n\n"));
        assert!(!text.contains("v000000_b free"));
        assert!(!text.contains("v000000_b <="));
    }

    #[test]
    fn quadratic_objective_doubles_inside_brackets() {
        let mut problem = Problem::new_minimization();
        let x = problem
            .new_variable("x", VariableSpec::continuous(0., 1.))
            .unwrap();
        problem.minimize(x.powi(2).scale(3.)).unwrap();
        let text = write_problem(&problem).unwrap();
        assert!(text.contains("+ [ + 6 v000000_x^2 ] / 2"));
    }

    #[test]
    fn quadratic_constraint_keeps_raw_coefficients() {
        let mut problem = Problem::new_minimization();
        let x = problem
            .new_variable("x", VariableSpec::continuous(0., 1.))
            .unwrap();
        let y = problem
            .new_variable("y", VariableSpec::continuous(0., 1.))
            .unwrap();
        problem.minimize(x.plus(&y)).unwrap();
        problem
            .add_constraint(Constraint::less_equal("q", x.times(&y).scale(3.), 5.))
            .unwrap();
        let text = write_problem(&problem).unwrap();
        assert!(text.contains("c000000_q: + [ + 3 v000000_x * v000001_y ] / 2 <= 5"));
    }

    #[test]
    fn degree_three_is_rejected() {
        let x = Polynomial::variable("x").unwrap();
        match write_polynomial(&x.powi(3), QuadraticScaling::Constraint) {
            Err(LpWriteError::DegreeTooHigh { degree: 3 }) => {}
            other => panic!("cubic not rejected: {:?}", other),
        }
    }

    #[test]
    fn negative_coefficients_use_minus_sign() {
        let x = Polynomial::variable("x").unwrap();
        let rendered = write_polynomial(&x.scale(-2.5), QuadraticScaling::Constraint).unwrap();
        assert_eq!(rendered, "- 2.5 x");
    }

    #[test]
    fn zero_polynomial_renders_zero() {
        let rendered =
            write_polynomial(&Polynomial::zero(), QuadraticScaling::Objective).unwrap();
        assert_eq!(rendered, "0");
    }
}
