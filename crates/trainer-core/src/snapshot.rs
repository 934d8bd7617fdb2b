use serde::Serialize;

use crate::game_data::GameHeaders;
use crate::session::{Phase, Session, Side};

/// Immutable view of a session, rebuilt after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub generation: u64,
    pub player_color: Side,
    pub phase: Phase,
    pub current_ply: usize,
    pub total_plies: usize,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub attempts_remaining: u8,
    pub is_complete: bool,
    pub is_revealing: bool,
    pub is_player_turn: bool,
    pub can_move: bool,
    pub fen: String,
    pub played: Vec<String>,
    pub headers: GameHeaders,
}

impl From<&Session> for Snapshot {
    fn from(session: &Session) -> Self {
        Self {
            generation: session.generation(),
            player_color: session.player(),
            phase: session.phase(),
            current_ply: session.current_ply(),
            total_plies: session.total_plies(),
            correct_count: session.correct_count(),
            wrong_count: session.wrong_count(),
            attempts_remaining: session.attempts_remaining(),
            is_complete: session.is_complete(),
            is_revealing: session.is_revealing(),
            is_player_turn: session.is_player_turn(),
            can_move: session.can_move(),
            fen: session.fen(),
            played: session.played_moves(),
            headers: session.moves().headers().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::extract_moves;

    #[test]
    fn test_snapshot_serializes_for_the_board() {
        let moves = extract_moves("[White \"A\"]\n\n1. e4 e5").unwrap();
        let (session, _) = Session::new(3, moves, Side::Black);
        let json = serde_json::to_value(Snapshot::from(&session)).unwrap();

        assert_eq!(json["generation"], 3);
        assert_eq!(json["player_color"], "black");
        assert_eq!(json["phase"], "auto_playing_opponent");
        assert_eq!(json["total_plies"], 2);
        assert_eq!(json["can_move"], false);
        assert_eq!(json["is_player_turn"], false);
        assert_eq!(json["headers"]["white"], "A");
        assert_eq!(json["played"].as_array().unwrap().len(), 0);
    }
}
