//! Runtime configuration.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_DATABASE_PATH: &str = "dentaldesk.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Settings for opening a clinic database and running the scheduler.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClinicConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// How long a writer waits for the database lock before failing
    pub busy_timeout_ms: u64,
    /// When set, completing an appointment also moves its status to
    /// `completed`. Off by default: status and completion are tracked
    /// independently.
    pub unify_completion_status: bool,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            unify_completion_status: false,
        }
    }
}

impl ClinicConfig {
    /// Read settings from `DENTALDESK_*` environment variables, falling back
    /// to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_path = env::var("DENTALDESK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                warn!(
                    "DENTALDESK_DB_PATH not set, using {}",
                    defaults.database_path.display()
                );
                defaults.database_path.clone()
            });

        let busy_timeout_ms = match env::var("DENTALDESK_BUSY_TIMEOUT_MS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "DENTALDESK_BUSY_TIMEOUT_MS={:?} is not a number, using {}",
                    raw, defaults.busy_timeout_ms
                );
                defaults.busy_timeout_ms
            }),
            Err(_) => defaults.busy_timeout_ms,
        };

        let unify_completion_status = match env::var("DENTALDESK_UNIFY_COMPLETION_STATUS") {
            Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
                warn!(
                    "DENTALDESK_UNIFY_COMPLETION_STATUS={:?} is not a boolean, using false",
                    raw
                );
                false
            }),
            Err(_) => defaults.unify_completion_status,
        };

        Self {
            database_path,
            busy_timeout_ms,
            unify_completion_status,
        }
    }

    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
