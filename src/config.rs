//! Runtime configuration for the summarizer.
//!
//! Defaults match the shipped popup. Each value can be overridden with a
//! `BRIEFLY_*` env var (loaded from `.env.local` / `.env` by `load_env`).

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://briefly-backend-gf5a.onrender.com/api/briefly";
pub const DEFAULT_DELAY_THRESHOLD_MS: u64 = 7_000;
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 15;
pub const DEFAULT_REVEAL_CHUNK_CHARS: usize = 2;
pub const DEFAULT_COPIED_MS: u64 = 2_000;

const STORE_DIR: &str = "briefly";
const STORE_FILE: &str = "storage.json";

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerConfig {
    /// Summary endpoint receiving `{ type, content }`.
    pub endpoint: String,
    /// How long a request may run before the "may take a while" notice shows.
    pub delay_threshold: Duration,
    /// Time between two reveal steps.
    pub reveal_interval: Duration,
    /// Characters added per reveal step. Never zero.
    pub reveal_chunk_chars: usize,
    /// How long the "copied" indicator stays on.
    pub copied_duration: Duration,
    /// Backing file for the local store. `None` when no config dir exists.
    pub store_path: Option<PathBuf>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            delay_threshold: Duration::from_millis(DEFAULT_DELAY_THRESHOLD_MS),
            reveal_interval: Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS),
            reveal_chunk_chars: DEFAULT_REVEAL_CHUNK_CHARS,
            copied_duration: Duration::from_millis(DEFAULT_COPIED_MS),
            store_path: default_store_path(),
        }
    }
}

impl SummarizerConfig {
    /// Defaults overlaid with any `BRIEFLY_*` env vars that are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("BRIEFLY_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            log::info!("[CONFIG] Endpoint override: {}", endpoint);
            config.endpoint = endpoint;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BRIEFLY_DELAY_NOTICE_MS") {
            config.delay_threshold = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "BRIEFLY_REVEAL_INTERVAL_MS") {
            config.reveal_interval = Duration::from_millis(ms);
        }
        match parse_var::<usize>(&lookup, "BRIEFLY_REVEAL_CHUNK") {
            Some(0) => log::warn!("[CONFIG] BRIEFLY_REVEAL_CHUNK must be at least 1 — ignored"),
            Some(n) => config.reveal_chunk_chars = n,
            None => {}
        }
        if let Some(path) = lookup("BRIEFLY_STORE_PATH").filter(|v| !v.trim().is_empty()) {
            config.store_path = Some(PathBuf::from(path));
        }

        config
    }
}

/// `<config_dir>/briefly/storage.json`.
pub fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join(STORE_DIR).join(STORE_FILE))
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("[CONFIG] Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
