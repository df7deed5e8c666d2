use thiserror::Error;

/// Message shown to the user once every model and retry has failed.
pub const SERVICE_BUSY_MESSAGE: &str =
    "The AI service is temporarily busy and automatic retries failed. Please wait a moment and try again.";

/// Message shown to the user when an agent response cannot be turned into an action.
pub const AGENT_RESPONSE_MESSAGE: &str = "Could not interpret the agent response.";

/// A failure reported by the text-generation provider for a single call.
///
/// `status` carries the HTTP-like status code when the transport exposes one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// HTTP-like status code, if known.
    pub status: Option<u16>,
    /// Raw provider message.
    pub message: String,
}

impl ProviderError {
    /// A provider error without a status code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// A provider error carrying a status code.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// A convenience `Result` alias using [`AccessiMindError`].
pub type AccessiMindResult<T> = Result<T, AccessiMindError>;

/// Top-level error type for the AccessiMind AI core.
///
/// Only [`AccessiMindError::Fatal`] and [`AccessiMindError::Exhausted`] are
/// produced by generation; the remaining variants come from input validation,
/// agent response decoding and configuration loading.
#[derive(Error, Debug)]
pub enum AccessiMindError {
    /// The provider rejected the request in a way no retry or model switch can fix.
    #[error("Provider error: {0}")]
    Fatal(ProviderError),

    /// Every candidate model and every retry attempt failed.
    #[error("All models exhausted after {attempts} attempts ({})", .models.join(", "))]
    Exhausted {
        /// Models that were tried, in order.
        models: Vec<String>,
        /// Total number of provider calls made.
        attempts: u32,
    },

    /// The agent response contained no recoverable action object.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The agent response named an action outside the allow-list.
    #[error("Invalid agent action: {action:?}")]
    InvalidAction {
        /// The action as the model wrote it (uppercased).
        action: String,
        /// The full model response, kept for diagnostics.
        raw: String,
    },

    /// Caller input was rejected before any provider call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AccessiMindError {
    /// Returns `true` when the failure is a transient overload the user may retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, AccessiMindError::Exhausted { .. })
    }

    /// A friendly message suitable for direct display in the UI.
    ///
    /// Distinguishes "service busy, try later" from "request invalid".
    pub fn user_message(&self) -> String {
        match self {
            AccessiMindError::Exhausted { .. } => SERVICE_BUSY_MESSAGE.to_string(),
            AccessiMindError::Fatal(e) => {
                format!("The request could not be processed: {}", e.message)
            }
            AccessiMindError::Decode(_) | AccessiMindError::InvalidAction { .. } => {
                AGENT_RESPONSE_MESSAGE.to_string()
            }
            AccessiMindError::Validation(msg) => msg.clone(),
            AccessiMindError::Config(msg) => format!("Configuration problem: {msg}"),
            AccessiMindError::Json(e) => format!("Malformed data: {e}"),
        }
    }
}
