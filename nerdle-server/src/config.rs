use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use nerdle_core::{DEFAULT_ACK_DELAY, DEFAULT_SUBMISSION_DEADLINE, SessionSettings, demo};
use nerdle_persistence::connection::DEFAULT_DATABASE_URL;
use nerdle_types::CurrentWeekState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected sqlite or memory, got {:?}", other)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}={value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub store_backend: StoreBackend,
    pub seed_demo_data: bool,
    pub current_week: CurrentWeekState,
    pub session: SessionSettings,
    pub connection_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source. Unset variables fall back
    /// to the demo league and local defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_week = demo::demo_week();
        let ack_ms = parse_or(&lookup, "ACK_DISPLAY_MS", DEFAULT_ACK_DELAY.as_millis() as u64)?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            store_backend: parse_or(&lookup, "STORE_BACKEND", StoreBackend::Sqlite)?,
            seed_demo_data: parse_or(&lookup, "SEED_DEMO_DATA", false)?,
            current_week: CurrentWeekState {
                week_number: parse_or(&lookup, "CURRENT_WEEK", default_week.week_number)?,
                word: lookup("CURRENT_WORD")
                    .map(|word| word.to_uppercase())
                    .unwrap_or(default_week.word),
                picker: lookup("CURRENT_PICKER").unwrap_or(default_week.picker),
                next_picker: lookup("NEXT_PICKER").unwrap_or(default_week.next_picker),
            },
            session: SessionSettings {
                ack_delay: Duration::from_millis(ack_ms),
                submission_deadline: lookup("SUBMISSION_DEADLINE")
                    .unwrap_or_else(|| DEFAULT_SUBMISSION_DEADLINE.to_string()),
            },
            connection_timeout_seconds: parse_or(&lookup, "CONNECTION_TIMEOUT_SECONDS", 300)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
