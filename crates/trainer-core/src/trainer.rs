//! Single entry point for the board layer.
//!
//! `Trainer` owns the active session (if any) and a generation counter. Every
//! input goes through [`Trainer::dispatch`], which returns the new snapshot,
//! the notices to show, and the delay the caller must arm next. Timers carry
//! the ticket they were armed with, so a timer from a replaced or reset
//! session is ignored when it fires.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::candidate::Candidate;
use crate::error::TrainerError;
use crate::notice::Notice;
use crate::pgn::extract_moves;
use crate::session::{Event, Session, Side, TimerKind, TimerTicket};
use crate::snapshot::Snapshot;

const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Pacing delays. These only affect how the trainer feels, never which
/// transitions happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    pub auto_play_delay: Duration,
    pub reveal_delay: Duration,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            auto_play_delay: DEFAULT_DELAY,
            reveal_delay: DEFAULT_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { pgn: String, color: Option<Side> },
    Submit(Candidate),
    TimerFired(TimerTicket),
    Reset,
}

/// A delay the caller must wait before sending `TimerFired(ticket)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTimer {
    pub ticket: TimerTicket,
    pub delay: Duration,
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub session: Option<Snapshot>,
    pub notices: Vec<Notice>,
    pub timer: Option<ScheduledTimer>,
}

#[derive(Debug, Default)]
pub struct Trainer {
    config: TrainerConfig,
    session: Option<Session>,
    generation: u64,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            session: None,
            generation: 0,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.session.as_ref().map(Snapshot::from)
    }

    pub fn dispatch(&mut self, command: Command) -> Update {
        let before = self.pending_timer();

        let notices = match command {
            Command::Start { pgn, color } => self.start(&pgn, color),
            Command::Submit(candidate) => self.apply(Event::Submit(candidate)),
            Command::TimerFired(ticket) => self.fire(ticket),
            Command::Reset => {
                self.reset();
                Vec::new()
            }
        };

        let after = self.pending_timer();
        let timer = after.filter(|t| Some(*t) != before).map(|ticket| ScheduledTimer {
            ticket,
            delay: match ticket.kind {
                TimerKind::AutoPlay => self.config.auto_play_delay,
                TimerKind::FinishReveal => self.config.reveal_delay,
            },
        });

        Update {
            session: self.snapshot(),
            notices,
            timer,
        }
    }

    fn pending_timer(&self) -> Option<TimerTicket> {
        self.session.as_ref().and_then(Session::pending_timer)
    }

    fn start(&mut self, pgn: &str, color: Option<Side>) -> Vec<Notice> {
        let Some(color) = color.filter(|_| !pgn.trim().is_empty()) else {
            return vec![Notice::from(&TrainerError::MissingInput)];
        };

        let moves = match extract_moves(pgn) {
            Ok(moves) => moves,
            Err(e) => {
                warn!(error = ?e, "rejected PGN");
                return vec![Notice::from(&e)];
            }
        };

        self.generation += 1;
        let (session, notices) = Session::new(self.generation, moves, color);
        self.session = Some(session);
        notices
    }

    fn fire(&mut self, ticket: TimerTicket) -> Vec<Notice> {
        if self.pending_timer() != Some(ticket) {
            debug!(?ticket, "ignoring stale timer");
            return Vec::new();
        }
        let event = match ticket.kind {
            TimerKind::AutoPlay => Event::PlayOpponent,
            TimerKind::FinishReveal => Event::FinishReveal,
        };
        self.apply(event)
    }

    fn apply(&mut self, event: Event) -> Vec<Notice> {
        let Some(session) = self.session.as_mut() else {
            debug!(?event, "no active session");
            return Vec::new();
        };

        match session.dispatch(event) {
            Ok(notices) => notices,
            Err(e) => {
                warn!(error = ?e, "aborting session");
                if e.is_fatal() {
                    self.session = None;
                }
                vec![Notice::from(&e)]
            }
        }
    }

    fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            info!(
                generation = session.generation(),
                ply = session.current_ply(),
                "training session reset"
            );
        }
    }
}
