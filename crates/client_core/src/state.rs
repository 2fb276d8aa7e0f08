//! Request state record and its derived projections (toast, navigation intent).

use serde::Serialize;
use shared::domain::{style_by_key, StyleId};

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create logo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Creating,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub status: RequestStatus,
    pub headline: &'static str,
    pub subtext: &'static str,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoResult {
    pub id: String,
    pub prompt: String,
    pub style_key: String,
    pub image_url: String,
}

/// Payload handed to the presentation layer to open the result view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationIntent {
    pub id: String,
    pub image_url: String,
    pub prompt: String,
    pub style_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub prompt_text: String,
    pub selected_style_id: StyleId,
    pub status: RequestStatus,
    pub error: Option<String>,
    pub last_result: Option<LogoResult>,
    pub surprise_pending: bool,
}

impl RequestState {
    /// `None` while idle; otherwise a pure function of `status` and `last_result`.
    pub fn toast(&self) -> Option<Toast> {
        let (headline, subtext, image_url) = match self.status {
            RequestStatus::Idle => return None,
            RequestStatus::Creating => ("Creating Your Design...", "Ready in 2 minutes", ""),
            RequestStatus::Completed => (
                "Your Design is Ready!",
                "Tap to see it.",
                self.last_result
                    .as_ref()
                    .map(|result| result.image_url.as_str())
                    .unwrap_or_default(),
            ),
            RequestStatus::Failed => ("Oops, something went wrong!", "Click to try again.", ""),
        };
        Some(Toast {
            status: self.status,
            headline,
            subtext,
            image_url: image_url.to_string(),
        })
    }

    pub fn navigation_intent(&self) -> Option<NavigationIntent> {
        if self.status != RequestStatus::Completed {
            return None;
        }
        let result = self.last_result.as_ref()?;
        let style_label = style_by_key(&result.style_key)
            .map(|style| style.label.to_string())
            .unwrap_or_else(|| result.style_key.clone());
        Some(NavigationIntent {
            id: result.id.clone(),
            image_url: result.image_url.clone(),
            prompt: result.prompt.clone(),
            style_label,
        })
    }

    pub(crate) fn reject_empty_prompt(&mut self) {
        self.error = Some(EMPTY_PROMPT_MESSAGE.to_string());
    }

    /// Drops the inline validation message. A failed request keeps its own
    /// message so `Failed` always carries an error.
    pub(crate) fn clear_validation_error(&mut self) {
        self.error = match self.status {
            RequestStatus::Failed => Some(CREATE_FAILED_MESSAGE.to_string()),
            _ => None,
        };
    }

    pub(crate) fn begin_create(&mut self) {
        self.status = RequestStatus::Creating;
        self.error = None;
        self.prompt_text.clear();
        self.last_result = None;
    }

    pub(crate) fn complete(&mut self, result: LogoResult) {
        self.status = RequestStatus::Completed;
        self.error = None;
        self.last_result = Some(result);
    }

    pub(crate) fn fail(&mut self) {
        self.status = RequestStatus::Failed;
        self.error = Some(CREATE_FAILED_MESSAGE.to_string());
        self.last_result = None;
    }
}
