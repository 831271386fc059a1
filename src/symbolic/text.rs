//! Symbolic clause text format
//!
//! One clause per line. `#` starts a comment, `HEAD <- BODY...` is the
//! implication `HEAD | ~BODY1 | ... | ~BODYn`, anything else is a
//! space-separated disjunction of literals.

use super::clause::Clause;
use super::literal::Literal;
use crate::error::Result;
use std::io::{BufRead, Write};

/// Token separating the head of an implication from its body.
pub const IMPLIED_BY: &str = "<-";

/// Parse one line of symbolic text.
pub fn parse_line(line: &str) -> Result<Clause> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        let text = line.strip_prefix('#').unwrap_or(line);
        let text = text.strip_prefix(' ').unwrap_or(text);
        return Ok(Clause::comment(text));
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() >= 2 && tokens[1] == IMPLIED_BY {
        let mut literals = vec![Literal::parse(tokens[0])?];
        for token in &tokens[2..] {
            literals.push(Literal::parse(token)?.negate());
        }
        return Ok(Clause::Disjunction(literals));
    }

    tokens
        .iter()
        .map(|token| Literal::parse(token))
        .collect::<Result<Vec<_>>>()
        .map(Clause::Disjunction)
}

/// Parse a block of symbolic text, one clause per line.
pub fn parse_lines(text: &str) -> Result<Vec<Clause>> {
    text.trim().split('\n').map(parse_line).collect()
}

/// Parse a whitespace-separated list of literals.
pub fn parse_literals(text: &str) -> Result<Vec<Literal>> {
    text.split_whitespace().map(Literal::parse).collect()
}

/// Render a clause, in implication form when it contains the consequent.
pub fn clause_to_string(literals: &[Literal], consequent: Option<&str>) -> String {
    let head: Vec<&Literal> = match consequent {
        Some(name) => literals.iter().filter(|l| l.name() == name).collect(),
        None => Vec::new(),
    };

    if head.is_empty() {
        return join_literals(literals);
    }

    let mut parts: Vec<String> = head.iter().map(|l| l.to_string()).collect();
    parts.push(IMPLIED_BY.to_string());
    parts.extend(
        literals
            .iter()
            .filter(|l| Some(l.name()) != consequent)
            .map(|l| l.negate().to_string()),
    );
    parts.join(" ")
}

pub(crate) fn join_literals(literals: &[Literal]) -> String {
    literals
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read clauses in symbolic form.
pub fn read_symbolic<R: BufRead>(reader: R) -> Result<Vec<Clause>> {
    let mut clauses = Vec::new();
    for line in reader.lines() {
        clauses.push(parse_line(&line?)?);
    }
    Ok(clauses)
}

/// Write clauses in symbolic form.
pub fn write_symbolic<W: Write>(clauses: &[Clause], out: &mut W) -> Result<()> {
    for clause in clauses {
        match clause {
            Clause::Comment(text) => {
                let space = if text.starts_with(' ') { "" } else { " " };
                writeln!(out, "#{}{}", space, text)?;
            }
            Clause::Disjunction(literals) => writeln!(out, "{}", join_literals(literals))?,
        }
    }
    Ok(())
}
