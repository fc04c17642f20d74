//! Remote summarization endpoint client.
//!
//! POSTs `{ type, content }` and reads `choices[0].message.content` from the
//! JSON answer. Non-streaming: the popup waits for the whole summary, then
//! reveals it locally.

use crate::error::SummarizeError;
use crate::types::{SummaryRequest, SummaryStyle};
use async_trait::async_trait;

/// Anything that can turn page text into a summary.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize(&self, style: SummaryStyle, content: &str) -> Result<String, SummarizeError>;
}

/// `SummaryService` backed by the HTTP endpoint.
pub struct HttpSummaryService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSummaryService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SummaryService for HttpSummaryService {
    async fn summarize(&self, style: SummaryStyle, content: &str) -> Result<String, SummarizeError> {
        log::info!(
            "[SUMMARY] POST {} (style={}, {} chars)",
            self.endpoint,
            style,
            content.len()
        );
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .json(&SummaryRequest { style, content })
            .send()
            .await
            .map_err(|e| {
                log::error!("[SUMMARY] HTTP request failed: {}", e);
                SummarizeError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("[SUMMARY] Endpoint returned {}: {}", status, body);
            return Err(SummarizeError::Network(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            log::error!("[SUMMARY] Response is not JSON: {}", e);
            SummarizeError::MalformedResponse(e.to_string())
        })?;

        log::info!("[SUMMARY] Latency: {}ms", start.elapsed().as_millis());
        summary_content(&body)
    }
}

/// `choices[0].message.content`, which must be a string.
pub fn summary_content(body: &serde_json::Value) -> Result<String, SummarizeError> {
    match body["choices"][0]["message"]["content"].as_str() {
        Some(text) => Ok(text.to_string()),
        None => {
            let preview: String = body.to_string().chars().take(200).collect();
            log::warn!("[SUMMARY] No choices[0].message.content — raw: {}", preview);
            Err(SummarizeError::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            ))
        }
    }
}
