//! Opening trainer core.
//!
//! Replays a PGN opening ply by ply: the player has to find each of their
//! side's moves, the recorded opponent moves are played back automatically.
//! shakmaty is the rules engine; this crate only sequences and scores.

pub mod candidate;
pub mod error;
pub mod game_data;
pub mod notice;
pub mod pgn;
pub mod session;
pub mod snapshot;
pub mod trainer;
pub mod validate;

pub use candidate::Candidate;
pub use error::TrainerError;
pub use notice::{Notice, NoticeLevel};
pub use pgn::{extract_moves, MoveList};
pub use session::{Event, Phase, Session, Side, TimerKind, TimerTicket, MAX_ATTEMPTS};
pub use snapshot::Snapshot;
pub use trainer::{Command, ScheduledTimer, Trainer, TrainerConfig, Update};
pub use validate::validate;
