//! Error types shared by instance construction, loading and solution handling.
//!
//! A search that runs out of budget is not an error; it is reported as
//! [`SearchOutcome::Exhausted`](crate::sat::solver::SearchOutcome::Exhausted).

use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Why a clause was rejected while building a [`Cnf`](crate::sat::cnf::Cnf).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedReason {
    /// The clause contains no literals.
    Empty,
    /// The clause contains the literal `0`, whose polarity is undefined.
    ZeroLiteral,
    /// The clause contains `i32::MIN`, which has no positive counterpart.
    OutOfRange,
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "clause is empty"),
            Self::ZeroLiteral => write!(f, "clause contains the literal 0"),
            Self::OutOfRange => write!(f, "clause contains a literal out of range"),
        }
    }
}

/// Errors raised by the local search crate.
#[derive(Debug, Error)]
pub enum SatError {
    /// A clause was empty or contained a zero literal. The whole instance is rejected.
    #[error("malformed clause #{clause}: {reason}")]
    MalformedClause {
        /// 0-based position of the offending clause in the input.
        clause: usize,
        /// What was wrong with it.
        reason: MalformedReason,
    },

    /// An index outside `[1, num_vars]` was used against an instance or assignment.
    #[error("unknown variable index {index} (instance has {num_vars} variables)")]
    UnknownVariable {
        /// The offending index.
        index: usize,
        /// Number of variables of the instance.
        num_vars: usize,
    },

    /// A solution literal names a variable that does not occur in the instance.
    #[error("literal {0} does not belong to the instance")]
    UnknownLiteral(i32),

    /// A solution leaves a variable of the instance without a value.
    #[error("variable {0} has no value in the solution")]
    MissingVariable(u32),

    /// A token in the clause text could not be read as a signed integer.
    #[error("line {line}: cannot parse '{token}' as a literal")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// The token as it appeared in the input.
        token: String,
    },

    /// Some instance files of a directory run could not be read or were malformed.
    #[error("{failed} of {total} instance files could not be read")]
    UnreadableInstances {
        /// Files that were skipped.
        failed: usize,
        /// Files found.
        total: usize,
    },

    /// A search configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_clause_message() {
        let err = SatError::MalformedClause {
            clause: 3,
            reason: MalformedReason::ZeroLiteral,
        };
        assert_eq!(
            err.to_string(),
            "malformed clause #3: clause contains the literal 0"
        );
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            std::fs::File::open("/definitely/not/here.cnf")?;
            Ok(())
        }
        assert!(matches!(open(), Err(SatError::Io(_))));
    }
}
