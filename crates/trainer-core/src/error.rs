//! Trainer error types

use thiserror::Error;

/// Failures surfaced by the extractor, the input boundary and the session.
///
/// The `Display` text of each variant is the message shown to the user;
/// the fields carry detail for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrainerError {
    #[error("Invalid PGN format")]
    Parse { reason: String },

    #[error("Invalid move")]
    InvalidInput(String),

    /// A candidate that is not a legal move at all. Recovered inside the
    /// validator and counted as a wrong move.
    #[error("Invalid move")]
    IllegalCandidate(String),

    #[error("Invalid move in PGN")]
    SequenceCorrupt { ply: usize, san: String },

    #[error("Please enter PGN and select a color")]
    MissingInput,
}

impl TrainerError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        TrainerError::Parse {
            reason: reason.into(),
        }
    }

    /// Whether the error ends the active session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrainerError::SequenceCorrupt { .. })
    }
}
