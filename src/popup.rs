//! The popup controller: what the extension UI talks to.
//!
//! Wires the cache, orchestrator, revealer and clipboard together:
//!   - open:      cached entry → shown verbatim, no reveal, no request
//!   - summarize: orchestrated request → fresh result → typewriter reveal
//!   - clear:     cancel everything, reset view, drop the cached entry
//!   - copy:      full result to clipboard, "copied" for a short while

use crate::bridge::{TabContentBridge, TabHost};
use crate::cache::ResultCache;
use crate::clipboard::{ClipboardWriter, SystemClipboard};
use crate::config::SummarizerConfig;
use crate::error::{ClipboardError, StoreError, SummarizeError};
use crate::orchestrator::{RequestState, SummaryRequestOrchestrator};
use crate::presentation::{PresentationState, ViewState};
use crate::reveal::{RevealHandle, RevealSink, TextRevealer};
use crate::service::{HttpSummaryService, SummaryService};
use crate::storage::{JsonFileStore, LocalStore};
use crate::types::{CacheEntry, DisplaySource, SummaryStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub struct Summarizer {
    orchestrator: SummaryRequestOrchestrator,
    cache: Arc<ResultCache>,
    revealer: TextRevealer,
    clipboard: Arc<dyn ClipboardWriter>,
    copied_duration: Duration,
    view: Arc<watch::Sender<ViewState>>,
    copy_generation: Arc<AtomicU64>,
}

impl Summarizer {
    pub fn new(
        config: &SummarizerConfig,
        host: Arc<dyn TabHost>,
        service: Arc<dyn SummaryService>,
        store: Arc<dyn LocalStore>,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Self {
        let cache = Arc::new(ResultCache::new(store));
        let orchestrator = SummaryRequestOrchestrator::new(
            TabContentBridge::new(host),
            service,
            Arc::clone(&cache),
            config.delay_threshold,
        );
        let (view, _) = watch::channel(ViewState::default());
        Self {
            orchestrator,
            cache,
            revealer: TextRevealer::new(config.reveal_interval, config.reveal_chunk_chars),
            clipboard,
            copied_duration: config.copied_duration,
            view: Arc::new(view),
            copy_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Production wiring: HTTP endpoint, file-backed store, system clipboard.
    pub fn from_config(config: &SummarizerConfig, host: Arc<dyn TabHost>) -> Result<Self, StoreError> {
        let store = JsonFileStore::open(config.store_path.clone())?;
        log::info!("[POPUP] Using store {}", store.path().display());
        Ok(Self::new(
            config,
            host,
            Arc::new(HttpSummaryService::new(config.endpoint.clone())),
            Arc::new(store),
            Arc::new(SystemClipboard),
        ))
    }

    /// Popup opened: show the cached result, if any, without animation.
    ///
    /// The cache is not read while a request is loading; the view is left
    /// to that request.
    pub fn open(&self) -> Option<CacheEntry> {
        if self.orchestrator.state().loading {
            log::debug!("[POPUP] Request in flight, cached summary not shown");
            return None;
        }

        let entry = match self.cache.load() {
            Ok(entry) => entry?,
            Err(e) => {
                log::warn!("[POPUP] Could not read cache: {}", e);
                return None;
            }
        };

        self.view.send_modify(|v| {
            v.style = entry.last_type.unwrap_or_default();
            v.display = Some(DisplaySource::Cached(entry.last_summary.clone()));
            v.revealed.clear();
        });
        log::info!("[POPUP] Showing cached summary");
        Some(entry)
    }

    /// Style used by the next summarize.
    pub fn set_style(&self, style: SummaryStyle) {
        self.view.send_modify(|v| v.style = style);
    }

    pub fn style(&self) -> SummaryStyle {
        self.view.borrow().style
    }

    pub fn can_summarize(&self) -> bool {
        !self.orchestrator.state().loading
    }

    /// Summarize the active tab and start revealing the result.
    ///
    /// Returns the reveal handle; awaiting it is optional. Rejected with
    /// `Busy` while a previous request is still loading.
    pub async fn summarize(&self) -> Result<RevealHandle, SummarizeError> {
        if !self.can_summarize() {
            log::debug!("[POPUP] Summarize ignored — request already loading");
            return Err(SummarizeError::Busy);
        }

        self.revealer.stop();
        let style = self.style();
        self.view.send_modify(|v| {
            v.display = None;
            v.revealed.clear();
        });

        let summary = self.orchestrator.run(style).await?;

        self.view.send_modify(|v| {
            v.display = Some(DisplaySource::Fresh(summary.clone()));
            v.revealed.clear();
        });
        let view = Arc::clone(&self.view);
        let sink: Arc<dyn RevealSink> = Arc::new(move |prefix: &str| {
            view.send_modify(|v| v.revealed = prefix.to_string());
        });
        Ok(self.revealer.reveal(summary, sink))
    }

    /// Reset: cancel the request and reveal, clear the view and the cache.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.revealer.stop();
        self.copy_generation.fetch_add(1, Ordering::SeqCst);
        self.view.send_replace(ViewState::default());
        log::info!("[POPUP] Cleared");
        self.orchestrator.clear()
    }

    /// Copy the full current result. `Ok(false)` when there is nothing to copy.
    ///
    /// Must be called from within a Tokio runtime (schedules the reset of
    /// the "copied" indicator).
    pub fn copy(&self) -> Result<bool, ClipboardError> {
        let text = match self.presentation().full_text() {
            Some(text) => text.to_string(),
            None => return Ok(false),
        };
        self.clipboard.write_text(&text)?;

        let generation = self.copy_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.view.send_modify(|v| v.copied = true);

        let view = Arc::clone(&self.view);
        let current = Arc::clone(&self.copy_generation);
        let duration = self.copied_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            view.send_if_modified(|v| {
                if current.load(Ordering::SeqCst) == generation && v.copied {
                    v.copied = false;
                    true
                } else {
                    false
                }
            });
        });
        Ok(true)
    }

    pub fn presentation(&self) -> PresentationState {
        PresentationState::project(self.orchestrator.state(), &self.view.borrow())
    }

    pub fn request_state(&self) -> RequestState {
        self.orchestrator.state()
    }

    /// Notified on every request-state transition.
    pub fn subscribe_requests(&self) -> watch::Receiver<RequestState> {
        self.orchestrator.subscribe()
    }

    /// Notified on every view change (style, result, reveal step, copied).
    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }
}
