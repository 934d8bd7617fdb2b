use server::config;
use server::driver::TrainerHandle;
use trainer_core::Trainer;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();
    tracing::info!(
        auto_play_delay_ms = config.auto_play_delay_ms,
        reveal_delay_ms = config.reveal_delay_ms,
        "Starting trainer"
    );

    let trainer = TrainerHandle::spawn(Trainer::new(config.trainer_config()));
    let app = server::app(trainer);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
