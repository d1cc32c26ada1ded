//! Parses the solution file written by the solver
//!
//! The file is plain text with labeled blocks. Only the primal section is of
//! interest; the dual and basis sections the solver appends afterwards are
//! ignored. A missing block yields an empty mapping rather than an error.

use indexmap::IndexMap;
use thiserror::Error;

/// The parts of a solution file this layer consumes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSolution {
    /// The status string following the `Model status` header, verbatim
    pub status: Option<String>,
    /// Whether the primal section declared itself feasible
    pub feasible: bool,
    /// Objective value, 0 when the file carries none
    pub objective: f64,
    /// Variable values keyed by LP name, in file order
    pub variable_values: IndexMap<String, f64>,
    /// Constraint values keyed by LP name, in file order
    pub constraint_values: IndexMap<String, f64>,
}

/// Parse a solution file's content
pub fn parse_solution(content: &str) -> Result<ParsedSolution, SolutionParseError> {
    let lines: Vec<&str> = content.lines().collect();
    let mut parsed = ParsedSolution::default();
    let mut seen_columns = false;
    let mut seen_rows = false;

    let mut index = 0;
    while index < lines.len() {
        let line = lines[index].trim();
        if line == "Model status" && parsed.status.is_none() {
            if let Some(status) = lines.get(index + 1) {
                parsed.status = Some(status.trim().to_string());
                index += 2;
                continue;
            }
        } else if line == "Feasible" {
            parsed.feasible = true;
        } else if let Some(rest) = line.strip_prefix("Objective") {
            parsed.objective = parse_number(rest.trim(), line)?;
        } else if let Some(rest) = line.strip_prefix("# Columns") {
            if !seen_columns {
                seen_columns = true;
                let count = rest.trim().parse::<usize>().unwrap_or(0);
                let next = read_value_block(&lines, index + 1, count, &mut parsed.variable_values)?;
                index = next;
                continue;
            }
        } else if let Some(rest) = line.strip_prefix("# Rows") {
            if !seen_rows {
                seen_rows = true;
                let count = rest.trim().parse::<usize>().unwrap_or(0);
                let next =
                    read_value_block(&lines, index + 1, count, &mut parsed.constraint_values)?;
                index = next;
                continue;
            }
        }
        index += 1;
    }
    Ok(parsed)
}

/// Read up to `count` `name value` lines starting at `start`
///
/// Stops early at end of file or a line that is not a name-value pair, so a
/// truncated block degrades to a shorter mapping instead of an error.
fn read_value_block(
    lines: &[&str],
    start: usize,
    count: usize,
    into: &mut IndexMap<String, f64>,
) -> Result<usize, SolutionParseError> {
    let mut index = start;
    for _ in 0..count {
        let Some(line) = lines.get(index) else { break };
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(name), Some(value)) => {
                into.insert(name.to_string(), parse_number(value, line)?);
            }
            _ => break,
        }
        index += 1;
    }
    Ok(index)
}

fn parse_number(text: &str, line: &str) -> Result<f64, SolutionParseError> {
    text.parse().map_err(|_| SolutionParseError::InvalidNumber {
        line: line.to_string(),
    })
}

/// Errors from solution-file parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolutionParseError {
    /// A value in the file could not be parsed as a number
    #[error("could not parse number in solution line `{line}`")]
    InvalidNumber { line: String },
}
