//! Error types shared across the summarize pipeline.
//!
//! The popup only ever shows a single "cannot summarize" notice, but the
//! distinct failure kind is kept here so it can be logged.

use thiserror::Error;

/// Why a summarize run did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    /// The host reported no foreground tab (or a tab without an id).
    #[error("no active tab found")]
    NoActiveTab,

    /// The tab's content responder was unreachable or answered with an error.
    #[error("messaging error: {0}")]
    Messaging(String),

    /// Transport failure or non-success HTTP status from the summary endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered, but without `choices[0].message.content`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Superseded by `clear` or by a newer run before it settled.
    #[error("request cancelled")]
    Cancelled,

    /// A summarize was triggered while another one is still loading.
    #[error("a summarize request is already in flight")]
    Busy,
}

impl SummarizeError {
    /// True for the kinds that put the popup into its error state.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NoActiveTab | Self::Messaging(_) | Self::Network(_) | Self::MalformedResponse(_)
        )
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoActiveTab => "no_active_tab",
            Self::Messaging(_) => "messaging",
            Self::Network(_) => "network",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Cancelled => "cancelled",
            Self::Busy => "busy",
        }
    }
}

/// Failures of the persistent key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine a storage directory")]
    NoStoreDir,

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure writing to the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("clipboard error: {0}")]
pub struct ClipboardError(pub String);
