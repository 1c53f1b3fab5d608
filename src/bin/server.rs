use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::{run_server, AppState};
use trivia_api::settings::get_settings;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let settings = get_settings().context("Failed to read settings")?;
    let pool = establish_connection(&settings.database)
        .await
        .context("Cannot connect to DB")?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool).await?;

    let state = AppState::new(pool, StdRng::from_entropy());
    run_server(state, &settings.application.address()).await
}
