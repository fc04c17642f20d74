//! Tab content bridge: asks the active tab for its extracted article text.
//!
//! The browser side is reached through the `TabHost` trait: one call to
//! resolve the foreground tab, one to message its content responder.

use crate::error::SummarizeError;
use crate::types::ContentRequest;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Browser tab as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tab {
    pub id: Option<u32>,
}

/// Host environment exposing tabs and per-tab messaging.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The active tab of the current window, if any.
    async fn active_tab(&self) -> Option<Tab>;

    /// Send `request` to the tab's content responder and return its raw reply.
    ///
    /// `Err` carries the host's delivery error (no responder, tab gone, ...).
    /// `Ok(Value::Null)` means the responder answered without a payload.
    async fn send_message(
        &self,
        tab_id: u32,
        request: &ContentRequest,
    ) -> Result<serde_json::Value, String>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentReply {
    #[serde(default)]
    extracted_text: Option<serde_json::Value>,
}

pub struct TabContentBridge {
    host: Arc<dyn TabHost>,
}

impl TabContentBridge {
    pub fn new(host: Arc<dyn TabHost>) -> Self {
        Self { host }
    }

    /// Extracted text of the foreground tab, or `""` when the reply has none.
    ///
    /// Single attempt; never retried.
    pub async fn fetch_active_tab_text(&self) -> Result<String, SummarizeError> {
        let tab_id = match self.host.active_tab().await {
            Some(Tab { id: Some(id) }) => id,
            _ => {
                log::warn!("[BRIDGE] No active tab found");
                return Err(SummarizeError::NoActiveTab);
            }
        };

        let start = std::time::Instant::now();
        let reply = self
            .host
            .send_message(tab_id, &ContentRequest::GetArticleText)
            .await
            .map_err(|e| {
                log::warn!("[BRIDGE] Tab {} did not answer: {}", tab_id, e);
                SummarizeError::Messaging(e)
            })?;

        let text = extracted_text(reply);
        log::info!(
            "[BRIDGE] Tab {} returned {} chars in {}ms",
            tab_id,
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

/// Pull `extractedText` out of a reply; anything missing or non-string is `""`.
fn extracted_text(reply: serde_json::Value) -> String {
    let reply: ContentReply = serde_json::from_value(reply).unwrap_or_default();
    match reply.extracted_text {
        Some(serde_json::Value::String(text)) => text,
        _ => String::new(),
    }
}
