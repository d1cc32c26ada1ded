//! Parses the LP-format IIS model the solver writes on request
//!
//! The IIS model is structurally an LP file, but only two things matter to
//! callers: which constraints participate in the conflict, and which
//! variables appear in conflicting bound lines. A single pass over the lines
//! classifies each one.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

static FREE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]*) free$").unwrap());
static UPPER_BOUNDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<=\s*([A-Za-z][A-Za-z0-9_]*)").unwrap());
static LOWER_BOUNDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*<=").unwrap());

/// An Irreducible Infeasible Subsystem extracted from the solver's IIS model
#[derive(Debug, Clone, PartialEq)]
pub struct Iis {
    /// Names of the conflicting constraints, in first-occurrence order
    pub constraints: Vec<String>,
    /// Names of the variables with conflicting bounds, in first-occurrence order
    pub variables: Vec<String>,
    /// The IIS model text as the solver wrote it, for operator inspection
    pub raw_content: String,
}

/// Parse an IIS model
pub fn parse_iis(content: &str) -> Iis {
    let mut constraints: IndexSet<String> = IndexSet::new();
    let mut variables: IndexSet<String> = IndexSet::new();
    for raw_line in content.lines() {
        let line = raw_line.trim();
        // LP comment
        if line.starts_with('\\') {
            continue;
        }
        if let Some((name, _)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() {
                constraints.insert(name.to_string());
            }
            continue;
        }
        if let Some(captures) = FREE_LINE.captures(line) {
            variables.insert(captures[1].to_string());
        } else if let Some(captures) = UPPER_BOUNDED.captures(line) {
            variables.insert(captures[1].to_string());
        } else if let Some(captures) = LOWER_BOUNDED.captures(line) {
            variables.insert(captures[1].to_string());
        }
    }
    Iis {
        constraints: constraints.into_iter().collect(),
        variables: variables.into_iter().collect(),
        raw_content: content.to_string(),
    }
}

/// Parse an IIS model file; None when the file is missing, unreadable, or empty
pub fn from_file(path: &Path) -> Option<Iis> {
    let content = fs::read_to_string(path).ok()?;
    if content.trim().is_empty() {
        return None;
    }
    Some(parse_iis(&content))
}
