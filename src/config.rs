use std::str::FromStr;

use crate::storage_key::DEFAULT_MAX_SCORE;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{name} environment variable is not set")]
    Missing { name: &'static str },
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server settings read from the environment and an optional `.env` file.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub max_score: f64,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_score: DEFAULT_MAX_SCORE,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| dotenv::var(name).ok())
    }

    /// Reads the settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let defaults = Self::new(database_url);
        Ok(Self {
            max_connections: optional_var(&lookup, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            max_score: optional_var(&lookup, "LEADERBOARD_MAX_SCORE")?
                .unwrap_or(defaults.max_score),
            ..defaults
        })
    }
}

fn optional_var<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(None),
    }
}
