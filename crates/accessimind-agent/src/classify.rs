use accessimind_core::ProviderError;
use serde::{Deserialize, Serialize};

const TRANSIENT_SIGNALS: &[&str] = &[
    "503",
    "overloaded",
    "service unavailable",
    "temporarily",
    "timeout",
    "rate limit",
];

const MODEL_UNAVAILABLE_SIGNALS: &[&str] = &[
    "permission",
    "unregistered",
    "not found",
    "doesn't exist",
    "invalid model",
];

/// How the generator should react to a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Expected to clear on its own; retry the same model.
    Transient,
    /// This model/credential pairing cannot serve the request; try the next model.
    ModelUnavailable,
    /// Nothing a retry or model switch can fix; propagate.
    Fatal,
}

/// Classifies a provider failure.
///
/// Status codes are compared exactly (503 transient, 403 model-unavailable);
/// message signals are case-insensitive substring matches. Transient signals
/// take precedence.
pub fn classify(err: &ProviderError) -> ErrorClass {
    let lower = err.message.to_lowercase();

    if err.status == Some(503) || TRANSIENT_SIGNALS.iter().any(|s| lower.contains(s)) {
        return ErrorClass::Transient;
    }

    if err.status == Some(403) || MODEL_UNAVAILABLE_SIGNALS.iter().any(|s| lower.contains(s)) {
        return ErrorClass::ModelUnavailable;
    }

    ErrorClass::Fatal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert_eq!(classify(&ProviderError::with_status(503, "")), ErrorClass::Transient);
        assert_eq!(
            classify(&ProviderError::new("The model is OVERLOADED. Please try again later.")),
            ErrorClass::Transient
        );
        assert_eq!(
            classify(&ProviderError::new("[503 Service Unavailable]")),
            ErrorClass::Transient
        );
        assert_eq!(
            classify(&ProviderError::new("temporarily unable to serve")),
            ErrorClass::Transient
        );
        assert_eq!(classify(&ProviderError::new("request timeout")), ErrorClass::Transient);
        assert_eq!(
            classify(&ProviderError::with_status(429, "Rate limit exceeded")),
            ErrorClass::Transient
        );
    }

    #[test]
    fn model_unavailable_classification() {
        assert_eq!(
            classify(&ProviderError::with_status(403, "forbidden")),
            ErrorClass::ModelUnavailable
        );
        assert_eq!(
            classify(&ProviderError::new("Permission denied on resource")),
            ErrorClass::ModelUnavailable
        );
        assert_eq!(
            classify(&ProviderError::with_status(404, "models/gemini-9 is not found")),
            ErrorClass::ModelUnavailable
        );
        assert_eq!(
            classify(&ProviderError::new("Model doesn't exist")),
            ErrorClass::ModelUnavailable
        );
        assert_eq!(
            classify(&ProviderError::new("Invalid model name")),
            ErrorClass::ModelUnavailable
        );
        assert_eq!(
            classify(&ProviderError::new("API key unregistered for caller")),
            ErrorClass::ModelUnavailable
        );
    }

    #[test]
    fn transient_wins_over_model_unavailable() {
        assert_eq!(
            classify(&ProviderError::with_status(403, "service unavailable")),
            ErrorClass::Transient
        );
    }

    #[test]
    fn everything_else_is_fatal() {
        assert_eq!(
            classify(&ProviderError::with_status(400, "API key not valid")),
            ErrorClass::Fatal
        );
        assert_eq!(classify(&ProviderError::new("quota exhausted")), ErrorClass::Fatal);
        // 500 is neither listed status nor a listed signal
        assert_eq!(classify(&ProviderError::with_status(500, "internal")), ErrorClass::Fatal);
    }
}
