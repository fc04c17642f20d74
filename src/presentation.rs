//! Popup presentation state.
//!
//! `PresentationState` is a read-only projection of the orchestrator's
//! request flags plus the popup's own view fields. Renderers read it; they
//! never mutate it.

use crate::orchestrator::RequestState;
use crate::types::{DisplaySource, SummaryStyle};

pub const DELAY_NOTICE: &str = "Response can take a while depending on the web page.";
pub const ERROR_NOTICE: &str = "This page cannot be summarized!";
pub const PLACEHOLDER: &str = "Select how you want this page summarized…";
pub const COPIED_NOTICE: &str = "Copied to clipboard";

/// Fields owned by the popup rather than by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub style: SummaryStyle,
    pub display: Option<DisplaySource>,
    /// Prefix of a fresh result revealed so far. Unused for cached results.
    pub revealed: String,
    pub copied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentationState {
    pub loading: bool,
    pub delayed_notice_visible: bool,
    pub error: bool,
    pub copied: bool,
    pub style: SummaryStyle,
    pub display: Option<DisplaySource>,
    pub revealed: String,
}

/// What the result panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewBody<'a> {
    Summary(&'a str),
    Loading,
    Error,
    Placeholder,
}

impl<'a> ViewBody<'a> {
    /// Text for the result panel. `None` while loading, where the panel
    /// shows a progress indicator instead.
    pub fn text(&self) -> Option<&'a str> {
        match *self {
            Self::Summary(text) => Some(text),
            Self::Loading => None,
            Self::Error => Some(ERROR_NOTICE),
            Self::Placeholder => Some(PLACEHOLDER),
        }
    }
}

impl PresentationState {
    pub fn project(request: RequestState, view: &ViewState) -> Self {
        Self {
            loading: request.loading,
            delayed_notice_visible: request.delayed_notice_visible,
            error: request.error,
            copied: view.copied,
            style: view.style,
            display: view.display.clone(),
            revealed: view.revealed.clone(),
        }
    }

    /// Text currently on screen: cached text verbatim, fresh text as far as
    /// the reveal has got.
    pub fn visible_text(&self) -> Option<&str> {
        match &self.display {
            Some(DisplaySource::Cached(text)) => Some(text),
            Some(DisplaySource::Fresh(_)) => Some(&self.revealed),
            None => None,
        }
    }

    /// Full current result, for copying.
    pub fn full_text(&self) -> Option<&str> {
        self.display
            .as_ref()
            .map(DisplaySource::full_text)
            .filter(|t| !t.is_empty())
    }

    pub fn body(&self) -> ViewBody<'_> {
        if self.full_text().is_some() {
            return ViewBody::Summary(self.visible_text().unwrap_or_default());
        }
        if self.loading {
            ViewBody::Loading
        } else if self.error {
            ViewBody::Error
        } else {
            ViewBody::Placeholder
        }
    }

    pub fn delay_notice(&self) -> Option<&'static str> {
        (self.loading && self.delayed_notice_visible).then_some(DELAY_NOTICE)
    }

    pub fn is_revealing(&self) -> bool {
        match &self.display {
            Some(DisplaySource::Fresh(text)) => self.revealed.len() < text.len(),
            _ => false,
        }
    }

    pub fn copied_notice(&self) -> Option<&'static str> {
        self.copied.then_some(COPIED_NOTICE)
    }

    /// The summarize trigger is disabled while a request is loading.
    pub fn can_summarize(&self) -> bool {
        !self.loading
    }

    /// Copy button is offered when there is a result and it was not just copied.
    pub fn can_copy(&self) -> bool {
        self.full_text().is_some() && !self.copied
    }
}
