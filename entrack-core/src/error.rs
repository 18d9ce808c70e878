use crate::record::CommitNumber;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown tracked field: {0}")]
    UnknownField(String),

    #[error("Duplicate tracked field: {0}")]
    DuplicateField(String),

    #[error("Type mismatch for field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Commit not found: {0}")]
    CommitNotFound(CommitNumber),

    #[error("Nothing to revert")]
    NothingToRevert,

    #[error("Nothing to remake")]
    NothingToRemake,

    #[error("Replay failed: {0}")]
    ReplayFailed(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
