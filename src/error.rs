//! Error types for clause compilation and result decoding

use thiserror::Error;

/// Errors raised while compiling symbolic clauses or decoding solver output.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed literal or clause text.
    #[error("Cannot parse {text:?}: {reason}")]
    Parse { text: String, reason: String },

    /// Template or relation data that cannot be compiled consistently.
    #[error("Inconsistent constraint data: {0}")]
    Consistency(String),

    /// Solver output references a variable index absent from the CNF comments.
    #[error("Variable index {0} has no matching variable comment")]
    UnknownVariable(u32),

    /// Malformed CNF or solver result text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Symmetry closure did not terminate within the iteration cap.
    #[error("Symmetry closure exceeded {0} labelings; basis does not generate a finite group")]
    SymmetryOverflow(usize),

    /// External or in-process solver failure.
    #[error("Solver error: {0}")]
    Solver(String),

    /// Solver did not finish in time.
    #[error("Solver timed out after {0}s")]
    Timeout(u64),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub(crate) fn parse(text: &str, reason: impl Into<String>) -> Self {
        CompileError::Parse {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, CompileError>;
