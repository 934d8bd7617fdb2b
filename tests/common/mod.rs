use trainer_core::{Candidate, Command, Side, Trainer, Update};

/// Start a session on a fresh trainer.
pub fn trainer_with(pgn: &str, color: Side) -> (Trainer, Update) {
    let mut trainer = Trainer::default();
    let update = trainer.dispatch(Command::Start {
        pgn: pgn.to_string(),
        color: Some(color),
    });
    (trainer, update)
}

/// Build a candidate from UCI-style text like "e2e4".
pub fn mv(uci: &str) -> Candidate {
    uci.parse().expect("test move text")
}

pub fn submit(trainer: &mut Trainer, uci: &str) -> Update {
    trainer.dispatch(Command::Submit(mv(uci)))
}

/// Fire whatever timer the update armed.
pub fn fire(trainer: &mut Trainer, update: &Update) -> Update {
    let timer = update.timer.expect("update armed a timer");
    trainer.dispatch(Command::TimerFired(timer.ticket))
}
