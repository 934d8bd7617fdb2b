pub mod config;
pub mod driver;
pub mod error;
pub mod routes;

use axum::{routing::{get, post}, Extension, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::driver::TrainerHandle;

/// Build the router. Same paths the board client calls.
pub fn app(trainer: TrainerHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Training session
        .route(
            "/api/session",
            get(routes::session::get_session)
                .post(routes::session::start_session)
                .delete(routes::session::reset_session),
        )
        .route("/api/session/move", post(routes::session::submit_move))
        .layer(Extension(trainer))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value as JsonValue};
    use tower::ServiceExt;
    use trainer_core::Trainer;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(TrainerHandle::spawn(Trainer::default()));
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_start_and_move() {
        let app = app(TrainerHandle::spawn(Trainer::default()));

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/session",
            Some(json!({ "pgn": "1. e4 e5 2. Nf3", "player_color": "w" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["player_color"], "white");
        assert_eq!(body["session"]["can_move"], true);

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/session/move",
            Some(json!({ "from": "e2", "to": "e4" })),
        )
        .await;
        assert_eq!(body["notices"][0]["message"], "Correct move!");
        assert_eq!(body["notices"][0]["level"], "success");
        assert_eq!(body["session"]["correct_count"], 1);
    }

    #[tokio::test]
    async fn test_start_without_pgn_notifies() {
        let app = app(TrainerHandle::spawn(Trainer::default()));
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/session",
            Some(json!({ "player_color": "black" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["session"].is_null());
        assert_eq!(body["notices"][0]["message"], "Please enter PGN and select a color");
    }

    #[tokio::test]
    async fn test_bad_square_is_invalid_move_notice() {
        let app = app(TrainerHandle::spawn(Trainer::default()));
        call(
            &app,
            Method::POST,
            "/api/session",
            Some(json!({ "pgn": "1. e4 e5", "player_color": "white" })),
        )
        .await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/session/move",
            Some(json!({ "from": "z9", "to": "e4" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notices"][0]["message"], "Invalid move");
        assert_eq!(body["notices"][0]["level"], "error");
        assert_eq!(body["session"]["current_ply"], 0);
        assert_eq!(body["session"]["wrong_count"], 0);
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let app = app(TrainerHandle::spawn(Trainer::default()));
        call(
            &app,
            Method::POST,
            "/api/session",
            Some(json!({ "pgn": "1. e4", "player_color": "white" })),
        )
        .await;
        let (_, body) = call(&app, Method::DELETE, "/api/session", None).await;
        assert!(body["session"].is_null());
        let (_, body) = call(&app, Method::GET, "/api/session", None).await;
        assert!(body["session"].is_null());
    }
}
