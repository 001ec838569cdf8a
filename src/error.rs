//! Error taxonomy for the orchestration core.
//!
//! Errors are classified by how the shell must react:
//! - NotFound: referenced entity absent — redirect to the dashboard fallback
//! - Validation: user input rejected — inline notice, no retry
//! - Service/Http: remote failure — notice, manual re-trigger allowed
//! - Auth: session invalid — global sign-in redirect, supersedes the rest
//!
//! Duplicate-entity conflicts ("already tracked") are carried as errors by
//! the transport but treated as soft-success by the action dispatcher.

use thiserror::Error;

/// Exact message the legacy service returns for a duplicate business.
/// Kept alongside the structural checks (409 / code field) because the
/// deployed service still answers with this string.
const LEGACY_DUPLICATE_MESSAGE: &str = "Business already exists";

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Duplicate entity")]
    Duplicate,

    #[error("Session invalid")]
    Auth,

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True when a manual re-trigger of the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Service { .. } | CoreError::Http(_) | CoreError::Json(_)
        )
    }

    /// True when the failing load must redirect to the dashboard fallback
    /// instead of rendering an error section.
    pub fn redirects_to_fallback(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    /// True for duplicate-entity conflicts, which the dispatcher maps to
    /// soft-success. Matches the structural `Duplicate` variant plus the
    /// legacy exact-message contract of the deployed service.
    pub fn is_duplicate(&self) -> bool {
        match self {
            CoreError::Duplicate => true,
            CoreError::Service { message, .. } => message == LEGACY_DUPLICATE_MESSAGE,
            _ => false,
        }
    }

    /// The text a notice shows for this error.
    ///
    /// `Service` messages already carry the API payload's `detail` field
    /// (extracted by the HTTP layer); everything else falls back to a
    /// generic, actionable line.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::NotFound(what) => format!("{} not found.", what),
            CoreError::Validation(msg) => msg.clone(),
            CoreError::Service { message, .. } => message.clone(),
            CoreError::Duplicate => "Already tracked.".to_string(),
            CoreError::Auth => "Your session has expired. Please sign in again.".to_string(),
            CoreError::Http(e) if e.is_timeout() => {
                "The service took too long to respond. Try again.".to_string()
            }
            CoreError::Http(_) => "Network error. Check your connection and try again.".to_string(),
            CoreError::Json(_) => "The service returned an unexpected response.".to_string(),
            CoreError::Io(_) => "A local file operation failed.".to_string(),
        }
    }
}

/// Serializable user-facing notice for the shell's toast/banner layer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub can_retry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
            can_retry: false,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
            can_retry: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
            can_retry: false,
        }
    }
}

impl From<&CoreError> for Notice {
    fn from(err: &CoreError) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: err.user_message(),
            can_retry: err.is_retryable(),
        }
    }
}
