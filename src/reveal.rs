//! Typewriter reveal of a finished summary.
//!
//! `reveal` spawns a task that emits growing prefixes of the text to a sink
//! on a fixed cadence. Starting a new reveal, calling `stop`, or dropping the
//! revealer abandons the running sequence. Emission happens under the same
//! lock that bumps the generation, so once `reveal`/`stop` returns the old
//! sequence can never emit again.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Receives each revealed prefix.
pub trait RevealSink: Send + Sync {
    fn emit(&self, prefix: &str);
}

impl<F> RevealSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, prefix: &str) {
        self(prefix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// The full text was emitted.
    Completed,
    /// A newer reveal, `stop`, or teardown cut the sequence short.
    Abandoned,
}

/// Handle to one running reveal sequence.
pub struct RevealHandle {
    task: JoinHandle<RevealOutcome>,
}

impl RevealHandle {
    /// Wait until the sequence completes or is abandoned.
    pub async fn finished(self) -> RevealOutcome {
        self.task.await.unwrap_or(RevealOutcome::Abandoned)
    }
}

#[derive(Default)]
struct Slot {
    generation: u64,
    cancel: Option<CancellationToken>,
}

pub struct TextRevealer {
    interval: Duration,
    chunk_chars: usize,
    slot: Arc<Mutex<Slot>>,
}

impl TextRevealer {
    pub fn new(interval: Duration, chunk_chars: usize) -> Self {
        Self {
            interval,
            chunk_chars: chunk_chars.max(1),
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Start revealing `text`, abandoning any sequence still running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn reveal(&self, text: impl Into<String>, sink: Arc<dyn RevealSink>) -> RevealHandle {
        let text = text.into();
        let ends = chunk_ends(&text, self.chunk_chars);
        let cancel = CancellationToken::new();

        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = slot.cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            slot.generation += 1;
            slot.generation
        };

        log::debug!(
            "[REVEAL] #{} start: {} chars in {} steps",
            generation,
            text.chars().count(),
            ends.len()
        );

        let slot = Arc::clone(&self.slot);
        let interval = self.interval;
        let task = tokio::spawn(async move {
            for end in ends {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return RevealOutcome::Abandoned,
                    _ = tokio::time::sleep(interval) => {}
                }

                let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
                if guard.generation != generation {
                    return RevealOutcome::Abandoned;
                }
                sink.emit(&text[..end]);
            }
            log::debug!("[REVEAL] #{} complete", generation);
            RevealOutcome::Completed
        });

        RevealHandle { task }
    }

    /// Abandon the running sequence, if any.
    pub fn stop(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.generation += 1;
        if let Some(cancel) = slot.cancel.take() {
            cancel.cancel();
        }
    }
}

impl Drop for TextRevealer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Byte offsets where each reveal step ends; always on char boundaries,
/// strictly increasing, and ending at `text.len()`.
fn chunk_ends(text: &str, chunk_chars: usize) -> Vec<usize> {
    let mut ends: Vec<usize> = text
        .char_indices()
        .enumerate()
        .filter(|(n, _)| (n + 1) % chunk_chars == 0)
        .map(|(_, (i, c))| i + c.len_utf8())
        .collect();
    if !text.is_empty() && ends.last() != Some(&text.len()) {
        ends.push(text.len());
    }
    ends
}
