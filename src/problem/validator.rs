//! Re-checking solver assignments against the clauses they should satisfy

use crate::sat::dimacs::{CnfFormula, CnfLine};
use std::collections::HashSet;
use std::fmt;

/// Checks assignments against a numbered formula
pub struct AssignmentValidator {
    clauses: Vec<Vec<i32>>,
    comments: Vec<Option<String>>,
}

/// Result of checking one assignment
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub clauses_checked: usize,
    pub violations: Vec<ClauseViolation>,
}

/// A clause no literal of the assignment satisfies
#[derive(Debug, Clone)]
pub struct ClauseViolation {
    pub clause_index: usize,
    pub clause: Vec<i32>,
    /// Closest preceding comment, usually naming the template line
    pub context: Option<String>,
}

impl AssignmentValidator {
    pub fn new(formula: &CnfFormula) -> Self {
        let mut clauses = Vec::new();
        let mut comments = Vec::new();
        let mut last_comment = None;
        for line in &formula.lines {
            match line {
                CnfLine::Comment(text) => last_comment = Some(text.clone()),
                CnfLine::Clause(clause) => {
                    clauses.push(clause.clone());
                    comments.push(last_comment.clone());
                }
            }
        }
        Self { clauses, comments }
    }

    /// Check signed literals; variables missing from the assignment satisfy nothing
    pub fn validate(&self, assignment: &[i32]) -> ValidationResult {
        let truth: HashSet<i32> = assignment.iter().copied().collect();
        let violations: Vec<ClauseViolation> = self
            .clauses
            .iter()
            .enumerate()
            .filter(|(_, clause)| !clause.iter().any(|ix| truth.contains(ix)))
            .map(|(i, clause)| ClauseViolation {
                clause_index: i,
                clause: clause.clone(),
                context: self.comments[i].clone(),
            })
            .collect();

        ValidationResult {
            is_valid: violations.is_empty(),
            clauses_checked: self.clauses.len(),
            violations,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", self.is_valid)?;
        writeln!(f, "  Clauses checked: {}", self.clauses_checked)?;
        if !self.violations.is_empty() {
            writeln!(f, "  Violations: {}", self.violations.len())?;
            for violation in self.violations.iter().take(5) {
                write!(f, "    clause {}: {:?}", violation.clause_index, violation.clause)?;
                if let Some(context) = &violation.context {
                    write!(f, " ({})", context)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
