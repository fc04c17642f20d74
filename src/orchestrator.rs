//! Summary request orchestration.
//!
//! One run: reset state → extract tab text → POST to the summary endpoint →
//! write the cache. The "may take a while" notice is a timer raced against
//! that whole sequence inside the same future (`settle_or_notice`), so it is
//! dropped the moment the request settles and can never fire afterwards.
//!
//! Every run owns a cancellation token. A newer run or `clear` cancels it;
//! the cancelled run returns `Cancelled` without touching state or cache.
//! A run whose future is dropped before settling releases its slot and
//! resets the flags, so the popup is never left loading.

use crate::bridge::TabContentBridge;
use crate::cache::ResultCache;
use crate::error::{StoreError, SummarizeError};
use crate::service::SummaryService;
use crate::types::{CacheEntry, SummaryStyle};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Per-request flags the popup renders from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestState {
    pub loading: bool,
    pub delayed_notice_visible: bool,
    pub error: bool,
}

impl RequestState {
    fn started() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }
}

struct InFlight {
    id: u64,
    cancel: CancellationToken,
}

pub struct SummaryRequestOrchestrator {
    bridge: TabContentBridge,
    service: Arc<dyn SummaryService>,
    cache: Arc<ResultCache>,
    delay_threshold: Duration,
    state: watch::Sender<RequestState>,
    in_flight: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
}

impl SummaryRequestOrchestrator {
    pub fn new(
        bridge: TabContentBridge,
        service: Arc<dyn SummaryService>,
        cache: Arc<ResultCache>,
        delay_threshold: Duration,
    ) -> Self {
        let (state, _) = watch::channel(RequestState::default());
        Self {
            bridge,
            service,
            cache,
            delay_threshold,
            state,
            in_flight: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current request flags.
    pub fn state(&self) -> RequestState {
        *self.state.borrow()
    }

    /// Receiver notified on every request-state transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Run one summarize request for the active tab.
    ///
    /// On success the summary is cached (with `style`) and returned. On
    /// failure the error flag is set and the cache is left as it was.
    pub async fn run(&self, style: SummaryStyle) -> Result<String, SummarizeError> {
        let (id, cancel) = self.begin();
        let _abandon = AbandonGuard { orchestrator: self, id };
        let start = std::time::Instant::now();
        log::info!("[ORCHESTRATOR] #{} started (style={})", id, style);

        let work = async {
            let text = self.bridge.fetch_active_tab_text().await?;
            log::info!(
                "[ORCHESTRATOR] #{} extracted {} chars, requesting summary",
                id,
                text.len()
            );
            self.service.summarize(style, &text).await
        };

        let settled = settle_or_notice(work, self.delay_threshold, &cancel, || {
            self.show_delayed_notice(id)
        })
        .await;

        let outcome = match settled {
            Some(outcome) => outcome,
            None => {
                log::info!("[ORCHESTRATOR] #{} cancelled", id);
                return Err(SummarizeError::Cancelled);
            }
        };

        let mut slot = self.lock_in_flight();
        if !matches!(slot.as_ref(), Some(current) if current.id == id) {
            log::info!("[ORCHESTRATOR] #{} superseded before settling", id);
            return Err(SummarizeError::Cancelled);
        }
        slot.take();

        match outcome {
            Ok(summary) => {
                self.state.send_replace(RequestState::default());
                let entry = CacheEntry {
                    last_summary: summary.clone(),
                    last_type: Some(style),
                };
                if let Err(e) = self.cache.save(&entry) {
                    log::warn!("[ORCHESTRATOR] #{} could not cache summary: {}", id, e);
                }
                log::info!(
                    "[ORCHESTRATOR] #{} completed in {}ms ({} chars)",
                    id,
                    start.elapsed().as_millis(),
                    summary.len()
                );
                Ok(summary)
            }
            Err(e) => {
                self.state.send_replace(RequestState {
                    error: true,
                    ..RequestState::default()
                });
                log::error!(
                    "[ORCHESTRATOR] #{} failed after {}ms ({}): {}",
                    id,
                    start.elapsed().as_millis(),
                    e.kind(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Cancel any pending request, reset all flags, and drop the cached entry.
    pub fn clear(&self) -> Result<(), StoreError> {
        {
            let mut slot = self.lock_in_flight();
            if let Some(previous) = slot.take() {
                log::info!("[ORCHESTRATOR] Clear cancels #{}", previous.id);
                previous.cancel.cancel();
            }
            self.state.send_replace(RequestState::default());
        }
        self.cache.clear()
    }

    /// Register a new run, cancelling the one it replaces.
    fn begin(&self) -> (u64, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        let mut slot = self.lock_in_flight();
        let previous = slot.replace(InFlight {
            id,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            log::info!("[ORCHESTRATOR] #{} replaces #{}", id, previous.id);
            previous.cancel.cancel();
        }
        self.state.send_replace(RequestState::started());
        (id, cancel)
    }

    fn show_delayed_notice(&self, id: u64) {
        let slot = self.lock_in_flight();
        if matches!(slot.as_ref(), Some(current) if current.id == id) {
            log::info!(
                "[ORCHESTRATOR] #{} still pending after {}ms — showing delay notice",
                id,
                self.delay_threshold.as_millis()
            );
            self.state.send_modify(|s| s.delayed_notice_visible = true);
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a run's slot if its future is dropped mid-flight.
///
/// Settled, cancelled and superseded runs no longer own the slot by the time
/// this drops, so it only acts on runs that never got to settle.
struct AbandonGuard<'a> {
    orchestrator: &'a SummaryRequestOrchestrator,
    id: u64,
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.orchestrator.lock_in_flight();
        if !matches!(slot.as_ref(), Some(current) if current.id == self.id) {
            return;
        }
        if let Some(abandoned) = slot.take() {
            abandoned.cancel.cancel();
        }
        self.orchestrator.state.send_replace(RequestState::default());
        log::info!("[ORCHESTRATOR] #{} dropped before settling", self.id);
    }
}

/// Drive `work` to completion, calling `on_notice` once if it is still
/// pending after `threshold`. Returns `None` if `cancel` fires first.
///
/// Settlement wins a tie with the timer, and the timer lives inside this
/// future, so `on_notice` can never run after `work` has finished.
pub async fn settle_or_notice<F, N>(
    work: F,
    threshold: Duration,
    cancel: &CancellationToken,
    on_notice: N,
) -> Option<F::Output>
where
    F: Future,
    N: FnOnce(),
{
    tokio::pin!(work);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => return None,
        out = &mut work => return Some(out),
        _ = tokio::time::sleep(threshold) => on_notice(),
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = &mut work => Some(out),
    }
}
