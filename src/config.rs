//! Application configuration constants.
//!
//! This module centralizes the tuning values of the selection pipeline and
//! the file/env resolution for everything configurable at startup.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::PracticeMode;

// ==================== Storage Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    storage: Option<StorageConfig>,
    content: Option<ContentConfig>,
    remote: Option<RemoteConfig>,
}

#[derive(Debug, Deserialize)]
struct StorageConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    bank_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteConfig {
    endpoint: Option<String>,
}

fn read_config() -> Option<AppConfig> {
    let contents = std::fs::read_to_string("config.toml").ok()?;
    toml::from_str::<AppConfig>(&contents).ok()
}

/// Load storage path with priority: config.toml > .env > default
pub fn load_storage_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Some(config) = read_config() {
        if let Some(path) = config.storage.and_then(|s| s.path) {
            tracing::info!("Using storage from config.toml: {}", path);
            return PathBuf::from(path);
        }
    }

    // Priority 2: .env STORAGE_PATH
    if let Ok(path) = std::env::var("STORAGE_PATH") {
        tracing::info!("Using storage from STORAGE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/cuet_prep.db");
    tracing::info!("Using default storage path: {}", default.display());
    default
}

/// Load an optional extra question-bank JSON path (config.toml > .env)
pub fn load_bank_path() -> Option<PathBuf> {
    if let Some(config) = read_config() {
        if let Some(path) = config.content.and_then(|c| c.bank_path) {
            return Some(PathBuf::from(path));
        }
    }
    std::env::var("BANK_PATH").ok().map(PathBuf::from)
}

/// Load the optional remote question-generator endpoint (config.toml > .env)
pub fn load_remote_endpoint() -> Option<String> {
    if let Some(config) = read_config() {
        if let Some(endpoint) = config.remote.and_then(|r| r.endpoint) {
            return Some(endpoint);
        }
    }
    std::env::var("REMOTE_GENERATOR_URL").ok()
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Question Configuration ====================

/// Every question carries exactly this many options
pub const OPTION_COUNT: usize = 4;

/// Retire a question from a (subject, chapter) scope after this many showings
pub const EXPOSURE_CAP: u32 = 5;

/// Attempt log retention, most-recent-first
pub const ATTEMPT_HISTORY_CAP: usize = 200;

// ==================== Selection Configuration ====================

/// Minimum acceptable result length: min(count, EMERGENCY_FLOOR)
pub const EMERGENCY_FLOOR: usize = 10;

/// Emergency generation gives up after count * this many attempts
pub const EMERGENCY_ATTEMPT_MULTIPLIER: usize = 3;

/// Options get reshuffled once a question has been seen across more than
/// this many sessions
pub const OPTION_RESHUFFLE_SESSIONS: u32 = 2;

/// Target fraction of a session drawn from each source bucket
#[derive(Debug, Clone, Copy)]
pub struct ModeMix {
    pub mistake: f64,
    pub pyq: f64,
    pub fresh: f64,
}

/// Mixing ratios by practice mode
pub fn mode_mix(mode: PracticeMode) -> ModeMix {
    match mode {
        PracticeMode::Daily => ModeMix { mistake: 0.4, pyq: 0.3, fresh: 0.3 },
        PracticeMode::Chapter => ModeMix { mistake: 0.5, pyq: 0.3, fresh: 0.2 },
        PracticeMode::Pyq => ModeMix { mistake: 0.2, pyq: 0.8, fresh: 0.0 },
        PracticeMode::Mock => ModeMix { mistake: 0.3, pyq: 0.4, fresh: 0.3 },
    }
}
