//! Completion errors and their retry classification.

use quota_generator::AdapterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status with the provider's error type, when given.
    #[error("Completion API returned {status} ({kind}): {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("Unparseable completion: {0}")]
    Unparseable(String),
}

impl CompletionError {
    /// Whether retrying after a pause can help.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::MissingApiKey => false,
            CompletionError::Network(_) => true,
            CompletionError::Api { status, kind, .. } => {
                matches!(kind.as_str(), "overloaded_error" | "rate_limit_error")
                    || *status == 429
                    || *status >= 500
            }
            CompletionError::Unparseable(_) => true,
        }
    }
}

impl From<CompletionError> for AdapterError {
    fn from(e: CompletionError) -> Self {
        if let CompletionError::Unparseable(_) = e {
            AdapterError::Unparseable(e.to_string())
        } else if e.is_transient() {
            AdapterError::Transient(e.to_string())
        } else {
            AdapterError::Fatal(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, kind: &str) -> CompletionError {
        CompletionError::Api {
            status,
            kind: kind.to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_classification() {
        assert!(api(529, "overloaded_error").is_transient());
        assert!(api(429, "rate_limit_error").is_transient());
        assert!(api(500, "api_error").is_transient());
        assert!(api(503, "api_error").is_transient());
        assert!(api(400, "overloaded_error").is_transient());
        assert!(!api(401, "authentication_error").is_transient());
        assert!(!api(403, "permission_error").is_transient());
        assert!(!api(400, "invalid_request_error").is_transient());
        assert!(!CompletionError::MissingApiKey.is_transient());
        assert!(CompletionError::Unparseable("no array".into()).is_transient());
    }

    #[test]
    fn test_into_adapter_error() {
        let transient: AdapterError = api(529, "overloaded_error").into();
        assert!(transient.is_transient());

        let unparseable: AdapterError = CompletionError::Unparseable("no array".into()).into();
        assert!(matches!(unparseable, AdapterError::Unparseable(_)));
        assert!(unparseable.is_transient());

        let fatal: AdapterError = api(401, "authentication_error").into();
        assert!(matches!(fatal, AdapterError::Fatal(msg) if msg.contains("401")));
    }
}
