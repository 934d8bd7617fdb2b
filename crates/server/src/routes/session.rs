use axum::{Extension, Json};
use serde::Deserialize;
use trainer_core::{Candidate, Command, Notice, Side};

use crate::driver::{Reply, TrainerHandle};
use crate::error::AppError;

/// GET /api/session
/// Current snapshot plus notices queued by timer-driven moves.
pub async fn get_session(
    Extension(trainer): Extension<TrainerHandle>,
) -> Result<Json<Reply>, AppError> {
    Ok(Json(trainer.current().await?))
}

#[derive(Deserialize)]
pub struct StartBody {
    #[serde(default)]
    pub pgn: String,
    pub player_color: Option<Side>,
}

/// POST /api/session
/// Load a PGN and start training as the given color.
pub async fn start_session(
    Extension(trainer): Extension<TrainerHandle>,
    Json(body): Json<StartBody>,
) -> Result<Json<Reply>, AppError> {
    let reply = trainer
        .dispatch(Command::Start {
            pgn: body.pgn,
            color: body.player_color,
        })
        .await?;
    Ok(Json(reply))
}

#[derive(Deserialize)]
pub struct MoveBody {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

/// POST /api/session/move
/// Submit a dragged move. Malformed squares never reach the trainer; they
/// come back as an "Invalid move" notice with the unchanged session.
pub async fn submit_move(
    Extension(trainer): Extension<TrainerHandle>,
    Json(body): Json<MoveBody>,
) -> Result<Json<Reply>, AppError> {
    let candidate = match Candidate::parse(&body.from, &body.to, body.promotion.as_deref()) {
        Ok(candidate) => candidate,
        Err(e) => {
            tracing::warn!(from = %body.from, to = %body.to, error = ?e, "rejected move input");
            let mut reply = trainer.current().await?;
            reply.notices.push(Notice::from(&e));
            return Ok(Json(reply));
        }
    };

    Ok(Json(trainer.dispatch(Command::Submit(candidate)).await?))
}

/// DELETE /api/session
pub async fn reset_session(
    Extension(trainer): Extension<TrainerHandle>,
) -> Result<Json<Reply>, AppError> {
    Ok(Json(trainer.dispatch(Command::Reset).await?))
}
