//! Briefly: quick AI summary of the active browser tab.
//!
//! This file only declares modules, re-exports the public API, and holds
//! the startup helpers. The work is split across:
//!   - bridge.rs: active tab → extracted article text
//!   - service.rs: summary endpoint client
//!   - storage.rs: persistent key-value store
//!   - cache.rs: the single cached result slot
//!   - orchestrator.rs: request state machine + delay notice
//!   - reveal.rs: typewriter reveal of fresh results
//!   - presentation.rs: view projection rendered by the popup
//!   - popup.rs: controller wiring it all together

pub mod bridge;
pub mod cache;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod popup;
pub mod presentation;
pub mod reveal;
pub mod service;
pub mod storage;
pub mod types;

pub use bridge::{Tab, TabContentBridge, TabHost};
pub use cache::ResultCache;
pub use config::SummarizerConfig;
pub use error::{ClipboardError, StoreError, SummarizeError};
pub use orchestrator::{RequestState, SummaryRequestOrchestrator};
pub use popup::Summarizer;
pub use presentation::{PresentationState, ViewBody};
pub use reveal::{RevealHandle, RevealOutcome, TextRevealer};
pub use service::{HttpSummaryService, SummaryService};
pub use types::{CacheEntry, DisplaySource, SummaryStyle};

use std::path::Path;

/// Load `.env.local`, falling back to `.env`, from `dir`. First file found wins.
///
/// Returns the path that was loaded.
pub fn load_env(dir: &Path) -> Option<std::path::PathBuf> {
    for env_file in [".env.local", ".env"] {
        let path = dir.join(env_file);
        if !path.exists() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(_) => {
                log::info!("[STARTUP] Loaded {}", path.display());
                return Some(path);
            }
            Err(e) => log::warn!("[STARTUP] Failed to load {}: {}", path.display(), e),
        }
    }
    None
}

/// Initialise `env_logger` (driven by `RUST_LOG`). Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_env_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "BRIEFLY_TEST_ENV_SOURCE=plain\n").unwrap();
        std::fs::write(dir.path().join(".env.local"), "BRIEFLY_TEST_ENV_SOURCE=local\n").unwrap();

        let loaded = load_env(dir.path()).unwrap();
        assert!(loaded.ends_with(".env.local"));
        assert_eq!(std::env::var("BRIEFLY_TEST_ENV_SOURCE").unwrap(), "local");
    }

    #[test]
    fn load_env_without_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_env(dir.path()), None);
    }
}
