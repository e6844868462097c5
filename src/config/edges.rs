// src/config/edges.rs

//! Parser for edge lines of the form `parent >> child` or
//! `[parent1, parent2] >> child`.

use crate::errors::{Result, ShelldagError};

/// One parsed edge line: a child and the parents it waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLine {
    pub child: String,
    pub parents: Vec<String>,
}

pub fn parse_edge_line(line: &str) -> Result<EdgeLine> {
    let invalid = |why: &str| ShelldagError::ConfigError(format!("invalid edge line '{line}': {why}"));

    let mut parts = line.split(">>");
    let (Some(lhs), Some(rhs), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid("expected exactly one '>>'"));
    };

    let child = rhs.trim();
    if child.is_empty() {
        return Err(invalid("missing child name"));
    }

    let lhs = lhs.trim();
    let parents: Vec<String> = match lhs.strip_prefix('[') {
        Some(rest) => {
            let inner = rest
                .strip_suffix(']')
                .ok_or_else(|| invalid("unterminated '[' list"))?;
            inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }
        None => vec![lhs.to_string()],
    };

    if parents.is_empty() || parents.iter().any(String::is_empty) {
        return Err(invalid("missing parent name"));
    }

    Ok(EdgeLine {
        child: child.to_string(),
        parents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_parent() {
        let edge = parse_edge_line("extract >> load").unwrap();
        assert_eq!(edge.child, "load");
        assert_eq!(edge.parents, vec!["extract"]);
    }

    #[test]
    fn bracket_list_of_parents() {
        let edge = parse_edge_line("  [a, b ,c] >>  d ").unwrap();
        assert_eq!(edge.child, "d");
        assert_eq!(edge.parents, vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_lines_are_config_errors() {
        for line in ["a > b", "a >> b >> c", ">> b", "a >>", "[a, b >> c", "[] >> c"] {
            let err = parse_edge_line(line).unwrap_err();
            assert!(
                matches!(err, ShelldagError::ConfigError(ref msg) if msg.contains("invalid edge line")),
                "line {line:?} gave {err:?}"
            );
        }
    }
}
