//! Shared fakes for the integration tests.
//!
//! Each test binary only uses part of this module.
#![allow(dead_code)]

use async_trait::async_trait;
use briefly_lib::bridge::{Tab, TabHost};
use briefly_lib::cache::ResultCache;
use briefly_lib::clipboard::MemoryClipboard;
use briefly_lib::config::SummarizerConfig;
use briefly_lib::error::SummarizeError;
use briefly_lib::orchestrator::{RequestState, SummaryRequestOrchestrator};
use briefly_lib::service::SummaryService;
use briefly_lib::storage::MemoryStore;
use briefly_lib::types::{ContentRequest, SummaryStyle};
use briefly_lib::{Summarizer, TabContentBridge};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

pub const DELAY_THRESHOLD: Duration = Duration::from_secs(7);

/// Tab host answering every message with a fixed reply.
pub struct FakeHost {
    tab: Option<Tab>,
    reply: Result<serde_json::Value, String>,
    pub messages: AtomicUsize,
}

impl FakeHost {
    pub fn with_text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            tab: Some(Tab { id: Some(1) }),
            reply: Ok(serde_json::json!({ "extractedText": text })),
            messages: AtomicUsize::new(0),
        })
    }

    pub fn without_tab() -> Arc<Self> {
        Arc::new(Self {
            tab: None,
            reply: Ok(serde_json::Value::Null),
            messages: AtomicUsize::new(0),
        })
    }

    pub fn unreachable(message: &str) -> Arc<Self> {
        Arc::new(Self {
            tab: Some(Tab { id: Some(1) }),
            reply: Err(message.to_string()),
            messages: AtomicUsize::new(0),
        })
    }

    pub fn message_count(&self) -> usize {
        self.messages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabHost for FakeHost {
    async fn active_tab(&self) -> Option<Tab> {
        self.tab.clone()
    }

    async fn send_message(
        &self,
        _tab_id: u32,
        _request: &ContentRequest,
    ) -> Result<serde_json::Value, String> {
        self.messages.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

/// Summary service that answers after `delay` with a canned outcome.
pub struct FakeService {
    outcome: Result<String, SummarizeError>,
    delay: Duration,
    pub calls: Mutex<Vec<(SummaryStyle, String)>>,
}

impl FakeService {
    pub fn replying(summary: &str) -> Arc<Self> {
        Self::slow(summary, Duration::ZERO)
    }

    pub fn slow(summary: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(summary.to_string()),
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: SummarizeError) -> Arc<Self> {
        Self::failing_after(error, Duration::ZERO)
    }

    pub fn failing_after(error: SummarizeError, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            delay,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SummaryService for FakeService {
    async fn summarize(&self, style: SummaryStyle, content: &str) -> Result<String, SummarizeError> {
        self.calls.lock().unwrap().push((style, content.to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// Service echoing `style:content`, to check what reached it.
pub struct EchoService;

#[async_trait]
impl SummaryService for EchoService {
    async fn summarize(&self, style: SummaryStyle, content: &str) -> Result<String, SummarizeError> {
        Ok(format!("{}:{}", style, content))
    }
}

pub fn orchestrator(
    host: Arc<dyn TabHost>,
    service: Arc<dyn SummaryService>,
) -> (SummaryRequestOrchestrator, Arc<ResultCache>) {
    let cache = Arc::new(ResultCache::new(Arc::new(MemoryStore::new())));
    let orchestrator = SummaryRequestOrchestrator::new(
        TabContentBridge::new(host),
        service,
        Arc::clone(&cache),
        DELAY_THRESHOLD,
    );
    (orchestrator, cache)
}

pub fn test_config() -> SummarizerConfig {
    SummarizerConfig {
        endpoint: "http://127.0.0.1:9/api/briefly".to_string(),
        delay_threshold: DELAY_THRESHOLD,
        reveal_interval: Duration::from_millis(10),
        reveal_chunk_chars: 1,
        copied_duration: Duration::from_secs(2),
        store_path: None,
    }
}

pub struct PopupFixture {
    pub popup: Summarizer,
    pub store: Arc<MemoryStore>,
    pub clipboard: Arc<MemoryClipboard>,
}

pub fn popup_with(
    config: &SummarizerConfig,
    host: Arc<dyn TabHost>,
    service: Arc<dyn SummaryService>,
) -> PopupFixture {
    let store = Arc::new(MemoryStore::new());
    let clipboard = Arc::new(MemoryClipboard::new());
    let popup = Summarizer::new(config, host, service, store.clone(), clipboard.clone());
    PopupFixture {
        popup,
        store,
        clipboard,
    }
}

/// Record every request-state transition seen on `rx`.
pub fn record_states(mut rx: watch::Receiver<RequestState>) -> Arc<Mutex<Vec<RequestState>>> {
    let history = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&history);
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            sink.lock().unwrap().push(state);
        }
    });
    history
}
