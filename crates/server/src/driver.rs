//! The task that owns the trainer.
//!
//! Requests and fired timers arrive on channels and are applied one at a
//! time, so the trainer has a single owner and needs no lock. Timers are
//! plain sleeps that post their ticket back; the trainer drops tickets that
//! no longer match the active session.

use std::mem;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use trainer_core::{Command, Notice, ScheduledTimer, Snapshot, TimerTicket, Trainer};

use crate::error::AppError;

/// Notices kept for the next poll when nobody collects them.
const MAX_PENDING_NOTICES: usize = 32;

/// What the board gets back from every request.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub session: Option<Snapshot>,
    pub notices: Vec<Notice>,
}

enum Request {
    Dispatch {
        command: Command,
        reply: oneshot::Sender<Reply>,
    },
    Current {
        reply: oneshot::Sender<Reply>,
    },
}

#[derive(Clone)]
pub struct TrainerHandle {
    tx: mpsc::Sender<Request>,
}

impl TrainerHandle {
    /// Spawn the owning task on the current runtime.
    pub fn spawn(trainer: Trainer) -> Self {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(run(trainer, rx));
        Self { tx }
    }

    pub async fn dispatch(&self, command: Command) -> Result<Reply, AppError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Dispatch { command, reply })
            .await
            .map_err(|_| AppError::Unavailable)?;
        rx.await.map_err(|_| AppError::Unavailable)
    }

    /// Current snapshot plus any notices produced by timers since the last
    /// request.
    pub async fn current(&self) -> Result<Reply, AppError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Current { reply })
            .await
            .map_err(|_| AppError::Unavailable)?;
        rx.await.map_err(|_| AppError::Unavailable)
    }
}

async fn run(mut trainer: Trainer, mut requests: mpsc::Receiver<Request>) {
    let (timer_tx, mut timers) = mpsc::unbounded_channel::<TimerTicket>();
    let mut pending: Vec<Notice> = Vec::new();

    loop {
        tokio::select! {
            request = requests.recv() => {
                let Some(request) = request else { break };
                let (reply, session) = match request {
                    Request::Dispatch { command, reply } => {
                        let update = trainer.dispatch(command);
                        arm(&timer_tx, update.timer);
                        queue(&mut pending, update.notices);
                        (reply, update.session)
                    }
                    Request::Current { reply } => (reply, trainer.snapshot()),
                };
                let notices = mem::take(&mut pending);
                // The caller may have gone away; the state change still stands.
                let _ = reply.send(Reply { session, notices });
            }
            Some(ticket) = timers.recv() => {
                let update = trainer.dispatch(Command::TimerFired(ticket));
                arm(&timer_tx, update.timer);
                queue(&mut pending, update.notices);
            }
        }
    }

    debug!("trainer task stopped");
}

/// Append notices for the next poll, dropping the oldest past the cap.
fn queue(pending: &mut Vec<Notice>, notices: Vec<Notice>) {
    pending.extend(notices);
    if pending.len() > MAX_PENDING_NOTICES {
        let excess = pending.len() - MAX_PENDING_NOTICES;
        pending.drain(..excess);
    }
}

fn arm(tx: &mpsc::UnboundedSender<TimerTicket>, timer: Option<ScheduledTimer>) {
    let Some(timer) = timer else { return };
    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(timer.delay).await;
        let _ = tx.send(timer.ticket);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trainer_core::{Phase, Side};

    fn start(pgn: &str, color: Side) -> Command {
        Command::Start {
            pgn: pgn.to_string(),
            color: Some(color),
        }
    }

    #[test]
    fn test_queue_keeps_newest_notices() {
        let mut pending = Vec::new();
        for attempts_left in 0..40u8 {
            queue(&mut pending, vec![Notice::Wrong { attempts_left }]);
        }
        assert_eq!(pending.len(), MAX_PENDING_NOTICES);
        assert_eq!(pending[0], Notice::Wrong { attempts_left: 8 });
        assert_eq!(pending.last(), Some(&Notice::Wrong { attempts_left: 39 }));

        queue(&mut pending, vec![Notice::Complete, Notice::Complete]);
        assert_eq!(pending.len(), MAX_PENDING_NOTICES);
        assert_eq!(pending[0], Notice::Wrong { attempts_left: 10 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_opponent_plays_after_delay() {
        let handle = TrainerHandle::spawn(Trainer::default());
        let reply = handle.dispatch(start("1. e4 e5", Side::Black)).await.unwrap();
        assert_eq!(reply.session.unwrap().current_ply, 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        let reply = handle.current().await.unwrap();
        let snapshot = reply.session.unwrap();
        assert_eq!(snapshot.current_ply, 1);
        assert_eq!(snapshot.phase, Phase::AwaitingUserMove);
        assert_eq!(snapshot.played, vec!["e4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_cancels_pending_opponent_move() {
        let handle = TrainerHandle::spawn(Trainer::default());
        handle.dispatch(start("1. e4 e5", Side::Black)).await.unwrap();
        let reply = handle.dispatch(Command::Reset).await.unwrap();
        assert!(reply.session.is_none());

        tokio::time::sleep(Duration::from_millis(600)).await;
        let reply = handle.current().await.unwrap();
        assert!(reply.session.is_none());
        assert!(reply.notices.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_ignores_old_timer() {
        let handle = TrainerHandle::spawn(Trainer::default());
        handle.dispatch(start("1. e4 e5", Side::Black)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.dispatch(start("1. d4 d5", Side::Black)).await.unwrap();

        // The first game's timer fires here and must do nothing
        tokio::time::sleep(Duration::from_millis(300)).await;
        let snapshot = handle.current().await.unwrap().session.unwrap();
        assert_eq!(snapshot.current_ply, 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let snapshot = handle.current().await.unwrap().session.unwrap();
        assert_eq!(snapshot.played, vec!["d4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_then_opponent_then_complete() {
        let handle = TrainerHandle::spawn(Trainer::default());
        handle.dispatch(start("1. e4 e5", Side::White)).await.unwrap();

        for _ in 0..2 {
            handle
                .dispatch(Command::Submit("a2a3".parse().unwrap()))
                .await
                .unwrap();
        }
        let reply = handle
            .dispatch(Command::Submit("a2a3".parse().unwrap()))
            .await
            .unwrap();
        assert_eq!(reply.notices, vec![Notice::Revealed { san: "e4".into() }]);
        assert!(reply.session.unwrap().is_revealing);

        tokio::time::sleep(Duration::from_millis(1200)).await;
        let reply = handle.current().await.unwrap();
        let snapshot = reply.session.unwrap();
        assert!(snapshot.is_complete);
        assert_eq!(snapshot.current_ply, 2);
        assert_eq!(snapshot.wrong_count, 3);
        assert_eq!(reply.notices, vec![Notice::Complete]);

        // Delivered once
        assert!(handle.current().await.unwrap().notices.is_empty());
    }
}
