//! Training session state machine.
//!
//! A session walks the recorded move list one ply at a time. On the player's
//! plies it waits for a candidate and scores it; on the opponent's plies it
//! waits for the pacing timer and plays the recorded move itself. After
//! [`MAX_ATTEMPTS`] wrong candidates the recorded move is revealed and played,
//! and the session moves on once the reveal timer fires.

use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, Chess, Color, EnPassantMode, Position};
use tracing::{debug, info, warn};

use crate::candidate::Candidate;
use crate::error::TrainerError;
use crate::notice::Notice;
use crate::pgn::MoveList;
use crate::validate;

/// Attempts the player gets on each ply.
pub const MAX_ATTEMPTS: u8 = 3;

/// The color the user trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[serde(alias = "w")]
    White,
    #[serde(alias = "b")]
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Color {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Side {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingUserMove,
    AutoPlayingOpponent,
    RevealingCorrectMove,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A move attempt from the board.
    Submit(Candidate),
    /// The opponent's pacing delay elapsed.
    PlayOpponent,
    /// The reveal display delay elapsed.
    FinishReveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    AutoPlay,
    FinishReveal,
}

/// Identifies one scheduled delay. A ticket is honored only while it is
/// still the session's pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket {
    pub generation: u64,
    pub ply: usize,
    pub kind: TimerKind,
}

#[derive(Debug, Clone)]
pub struct Session {
    generation: u64,
    moves: MoveList,
    player: Side,
    ply: usize,
    correct: u32,
    wrong: u32,
    attempts_remaining: u8,
    phase: Phase,
    position: Chess,
}

impl Session {
    /// Start a session at ply 0. Returns the notices of the initial routing
    /// (an empty move list completes immediately).
    pub fn new(generation: u64, moves: MoveList, player: Side) -> (Self, Vec<Notice>) {
        let mut session = Self {
            generation,
            position: moves.start().clone(),
            moves,
            player,
            ply: 0,
            correct: 0,
            wrong: 0,
            attempts_remaining: MAX_ATTEMPTS,
            phase: Phase::AwaitingUserMove,
        };

        info!(
            generation,
            player = ?player,
            plies = session.moves.len(),
            "training session started"
        );

        let mut notices = Vec::new();
        session.route(&mut notices);
        (session, notices)
    }

    /// Apply one event. Events that do not fit the current phase are no-ops.
    ///
    /// An `Err` is always `SequenceCorrupt`: the recorded move list cannot be
    /// played on the session's position and the session must be dropped.
    pub fn dispatch(&mut self, event: Event) -> Result<Vec<Notice>, TrainerError> {
        let mut notices = Vec::new();
        match event {
            Event::Submit(candidate) => self.submit(candidate, &mut notices)?,
            Event::PlayOpponent => self.play_opponent(&mut notices)?,
            Event::FinishReveal => self.finish_reveal(&mut notices),
        }
        Ok(notices)
    }

    fn submit(&mut self, candidate: Candidate, notices: &mut Vec<Notice>) -> Result<(), TrainerError> {
        if self.phase != Phase::AwaitingUserMove {
            debug!(phase = ?self.phase, %candidate, "ignoring candidate");
            return Ok(());
        }

        let Some(expected) = self.moves.get(self.ply) else {
            self.complete(notices);
            return Ok(());
        };

        match validate::matching_move(&self.position, &candidate, expected) {
            Some(mv) => {
                self.position.play_unchecked(mv);
                self.ply += 1;
                self.correct += 1;
                self.attempts_remaining = MAX_ATTEMPTS;
                notices.push(Notice::Correct);
                self.route(notices);
            }
            None => {
                let san = expected.to_string();
                self.wrong += 1;
                self.attempts_remaining = self.attempts_remaining.saturating_sub(1);

                if self.attempts_remaining == 0 {
                    self.play_recorded()?;
                    self.phase = Phase::RevealingCorrectMove;
                    debug!(ply = self.ply, %san, "attempts exhausted, revealing");
                    notices.push(Notice::Revealed { san });
                } else {
                    notices.push(Notice::Wrong {
                        attempts_left: self.attempts_remaining,
                    });
                }
            }
        }
        Ok(())
    }

    fn play_opponent(&mut self, notices: &mut Vec<Notice>) -> Result<(), TrainerError> {
        if self.phase != Phase::AutoPlayingOpponent {
            debug!(phase = ?self.phase, "ignoring opponent move");
            return Ok(());
        }
        if self.ply >= self.moves.len() {
            self.complete(notices);
            return Ok(());
        }

        self.play_recorded()?;
        self.ply += 1;
        self.route(notices);
        Ok(())
    }

    fn finish_reveal(&mut self, notices: &mut Vec<Notice>) {
        if self.phase != Phase::RevealingCorrectMove {
            debug!(phase = ?self.phase, "ignoring reveal end");
            return;
        }

        self.ply += 1;
        self.attempts_remaining = MAX_ATTEMPTS;
        self.route(notices);
    }

    /// Play the recorded move at the current ply onto the position.
    fn play_recorded(&mut self) -> Result<(), TrainerError> {
        let ply = self.ply;
        let san_plus = self.moves.get(ply).ok_or(TrainerError::SequenceCorrupt {
            ply,
            san: String::new(),
        })?;

        let mv = san_plus.san.to_move(&self.position).map_err(|e| {
            warn!(generation = self.generation, ply, san = %san_plus, error = %e, "recorded move failed to apply");
            TrainerError::SequenceCorrupt {
                ply,
                san: san_plus.to_string(),
            }
        })?;

        self.position.play_unchecked(mv);
        Ok(())
    }

    /// Enter the phase owed to the current ply.
    fn route(&mut self, notices: &mut Vec<Notice>) {
        if self.ply >= self.moves.len() {
            self.complete(notices);
        } else if self.is_player_turn() {
            self.phase = Phase::AwaitingUserMove;
            self.attempts_remaining = MAX_ATTEMPTS;
        } else {
            self.phase = Phase::AutoPlayingOpponent;
        }
    }

    fn complete(&mut self, notices: &mut Vec<Notice>) {
        if self.phase == Phase::Complete {
            return;
        }
        self.phase = Phase::Complete;
        info!(
            generation = self.generation,
            correct = self.correct,
            wrong = self.wrong,
            "training session complete"
        );
        notices.push(Notice::Complete);
    }

    /// The delay this session is waiting on, if any.
    pub fn pending_timer(&self) -> Option<TimerTicket> {
        let kind = match self.phase {
            Phase::AutoPlayingOpponent => TimerKind::AutoPlay,
            Phase::RevealingCorrectMove => TimerKind::FinishReveal,
            Phase::AwaitingUserMove | Phase::Complete => return None,
        };
        Some(TimerTicket {
            generation: self.generation,
            ply: self.ply,
            kind,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn player(&self) -> Side {
        self.player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn moves(&self) -> &MoveList {
        &self.moves
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn current_ply(&self) -> usize {
        self.ply
    }

    pub fn total_plies(&self) -> usize {
        self.moves.len()
    }

    pub fn correct_count(&self) -> u32 {
        self.correct
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong
    }

    pub fn attempts_remaining(&self) -> u8 {
        self.attempts_remaining
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn is_revealing(&self) -> bool {
        self.phase == Phase::RevealingCorrectMove
    }

    /// Whether the current ply belongs to the player. Derived from ply parity.
    pub fn is_player_turn(&self) -> bool {
        self.ply < self.moves.len() && self.moves.side_at(self.ply) == Color::from(self.player)
    }

    /// Whether the board should accept drags right now.
    pub fn can_move(&self) -> bool {
        self.phase == Phase::AwaitingUserMove
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    /// SAN of every move on the board, including a move being revealed.
    pub fn played_moves(&self) -> Vec<String> {
        let on_board = if self.is_revealing() { self.ply + 1 } else { self.ply };
        self.moves.san_prefix(on_board)
    }
}
