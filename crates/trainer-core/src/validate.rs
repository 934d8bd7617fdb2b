//! Move validation against the recorded move.
//!
//! Both sides are normalized to the standard-castling UCI form of the legal
//! move before comparing, since the board reports origin/destination pairs
//! while the move list holds SAN. The live position is only ever borrowed.

use pgn_reader::SanPlus;
use shakmaty::{uci::UciMove, CastlingMode, Chess, Move};
use tracing::{debug, warn};

use crate::candidate::Candidate;
use crate::error::TrainerError;

/// Resolve a candidate to the legal move it denotes in `position`.
pub fn resolve_candidate(position: &Chess, candidate: &Candidate) -> Result<Move, TrainerError> {
    candidate
        .to_uci()
        .to_move(position)
        .map_err(|e| TrainerError::IllegalCandidate(format!("{candidate}: {e}")))
}

/// Canonical origin/destination/promotion of a legal move.
pub fn canonical(mv: &Move) -> UciMove {
    mv.to_uci(CastlingMode::Standard)
}

/// The legal move for `candidate` if it is the same move as `expected`.
pub fn matching_move(position: &Chess, candidate: &Candidate, expected: &SanPlus) -> Option<Move> {
    let played = match resolve_candidate(position, candidate) {
        Ok(mv) => mv,
        Err(e) => {
            debug!(error = ?e, "candidate rejected by rules engine");
            return None;
        }
    };

    let recorded = match expected.san.to_move(position) {
        Ok(mv) => mv,
        Err(e) => {
            warn!(expected = %expected, error = %e, "recorded move is not legal here");
            return None;
        }
    };

    let matched = canonical(&played) == canonical(&recorded);
    debug!(candidate = %candidate, expected = %expected, matched, "validated candidate");
    matched.then_some(played)
}

/// Whether `candidate` is the same move as `expected` in `position`.
pub fn validate(position: &Chess, candidate: &Candidate, expected: &SanPlus) -> bool {
    matching_move(position, candidate, expected).is_some()
}
