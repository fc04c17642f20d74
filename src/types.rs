//! Data model: summary styles, the cached entry, and wire payloads.
//!
//! Wire payloads match what the content responder and the summary
//! endpoint speak, so they serialize straight to/from JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the user wants the page summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    #[default]
    Concise,
    Detailed,
    Bullets,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 3] = [Self::Concise, Self::Detailed, Self::Bullets];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
            Self::Bullets => "bullets",
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "concise" => Ok(Self::Concise),
            "detailed" => Ok(Self::Detailed),
            "bullets" => Ok(Self::Bullets),
            other => Err(format!("unknown summary style '{}'", other)),
        }
    }
}

/// The single cached result slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub last_summary: String,
    #[serde(default)]
    pub last_type: Option<SummaryStyle>,
}

/// Where the currently displayed text came from.
///
/// Cached text renders verbatim; fresh text goes through the reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplaySource {
    Cached(String),
    Fresh(String),
}

impl DisplaySource {
    /// The full result text, regardless of reveal progress.
    pub fn full_text(&self) -> &str {
        match self {
            Self::Cached(text) | Self::Fresh(text) => text,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

/// Message sent to the active tab's content responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentRequest {
    GetArticleText,
}

/// Body POSTed to the summary endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest<'a> {
    #[serde(rename = "type")]
    pub style: SummaryStyle,
    pub content: &'a str,
}
