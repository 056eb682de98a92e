use rocket::*;

mod config;
mod database;
mod leaderboard;
mod score;
mod service;
mod storage_key;
mod submission;
#[cfg(test)]
mod tests;

use config::Config;
use database::{default_catcher, requests, ScoreStore};
use service::LeaderboardService;
use storage_key::{EncodingError, KeyEncoder};

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("invalid maximum score: {0}")]
    MaxScore(#[from] EncodingError),
    #[error("failed to connect to a database: {0}")]
    Database(#[from] sqlx::Error),
}

#[launch]
async fn rocket() -> _ {
    init_tracing();

    let result = match Config::from_env() {
        Ok(config) => build(config).await,
        Err(error) => Err(error.into()),
    };
    match result {
        Ok(rocket) => rocket,
        Err(error) => {
            tracing::error!(%error, "failed to start the leaderboard server");
            std::process::exit(1);
        }
    }
}

/// Connects the store and builds the rocket with every route mounted.
pub async fn build(config: Config) -> Result<Rocket<Build>, StartupError> {
    let encoder = KeyEncoder::new(config.max_score)?;
    let store = ScoreStore::connect(&config.database_url, config.max_connections).await?;

    tracing::info!(
        max_connections = config.max_connections,
        max_score = encoder.max_score(),
        "connected to the score store"
    );

    Ok(rocket::build()
        .mount(
            "/",
            routes![
                requests::health,
                requests::submit_score,
                requests::get_leaderboard,
                requests::get_score_types,
            ],
        )
        .register("/", catchers![default_catcher])
        .manage(LeaderboardService::new(store, encoder)))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("leaderboard_service=info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}
