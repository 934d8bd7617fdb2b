//! User-facing notifications emitted by session transitions.

use std::fmt;

use serde::Serialize;

use crate::error::TrainerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Correct,
    Wrong { attempts_left: u8 },
    Revealed { san: String },
    Complete,
    /// A start request whose PGN failed to parse.
    PgnRejected,
    InvalidMoveInPgn,
    InvalidMove,
    MissingInput,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::Correct | Notice::Complete => NoticeLevel::Success,
            _ => NoticeLevel::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Correct => f.write_str("Correct move!"),
            Notice::Wrong { attempts_left } => {
                write!(f, "Wrong move! {attempts_left} attempts left")
            }
            Notice::Revealed { san } => write!(f, "The correct move was: {san}"),
            Notice::Complete => f.write_str("Training complete!"),
            Notice::PgnRejected => f.write_str("Invalid PGN format. Please check your input."),
            Notice::InvalidMoveInPgn => f.write_str("Invalid move in PGN"),
            Notice::InvalidMove => f.write_str("Invalid move"),
            Notice::MissingInput => f.write_str("Please enter PGN and select a color"),
        }
    }
}

impl From<&TrainerError> for Notice {
    fn from(err: &TrainerError) -> Self {
        match err {
            TrainerError::Parse { .. } => Notice::PgnRejected,
            TrainerError::InvalidInput(_) | TrainerError::IllegalCandidate(_) => Notice::InvalidMove,
            TrainerError::SequenceCorrupt { .. } => Notice::InvalidMoveInPgn,
            TrainerError::MissingInput => Notice::MissingInput,
        }
    }
}

/// Wire form: `{"level": "success", "message": "Correct move!"}`.
impl Serialize for Notice {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Notice", 2)?;
        s.serialize_field("level", &self.level())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}
