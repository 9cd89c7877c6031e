//! Error types shared by the API client and the controllers.

use thiserror::Error;

/// Generic message shown when the backend cannot be reached.
pub const TRY_AGAIN_MESSAGE: &str =
    "The compliment service is unavailable right now. Please try again in a moment.";

/// Generic message shown when generation fails without a backend explanation.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate a compliment. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Typed outcome for every failure the client can observe.
pub enum ClientError {
    /// Local validation failed; nothing was sent.
    #[error("missing required input: {}", .missing.join(", "))]
    ValidationBlocked { missing: Vec<&'static str> },
    /// A request for this controller is already in flight.
    #[error("a request is already in flight")]
    Busy,
    /// Network error, timeout, or a non-2xx response without a usable body.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// `/api/generate` reported a failure.
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    /// `/api/send-email` answered 200 with `success: false`.
    #[error("email not delivered: {0}")]
    EmailSoftFailure(String),
    /// `/api/send-email` refused the request with an explanation, e.g. a 422
    /// for an address the server does not accept.
    #[error("email rejected: {0}")]
    EmailRejected(String),
    /// A 2xx body that does not match the endpoint schema.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    /// The response belongs to a request that is no longer current.
    #[error("stale response discarded")]
    StaleResponse,
}

impl ClientError {
    /// Text suitable for showing to the person using the form.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::ValidationBlocked { missing } => {
                format!("Please fill in: {}", missing.join(", "))
            }
            ClientError::Busy => "Still working on the previous request…".to_string(),
            ClientError::ServiceUnavailable(_) | ClientError::UnexpectedResponse(_) => {
                TRY_AGAIN_MESSAGE.to_string()
            }
            ClientError::GenerationFailed(message)
            | ClientError::EmailSoftFailure(message)
            | ClientError::EmailRejected(message) => message.clone(),
            ClientError::StaleResponse => String::new(),
        }
    }

    /// Whether the failure came from the network side rather than local gating.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ClientError::ServiceUnavailable(_)
                | ClientError::GenerationFailed(_)
                | ClientError::EmailSoftFailure(_)
                | ClientError::EmailRejected(_)
                | ClientError::UnexpectedResponse(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::ServiceUnavailable(format!("request timed out: {err}"))
        } else if err.is_decode() {
            ClientError::UnexpectedResponse(err.to_string())
        } else {
            ClientError::ServiceUnavailable(err.to_string())
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_share_the_generic_message() {
        let err = ClientError::ServiceUnavailable("connection refused".into());
        assert_eq!(err.user_message(), TRY_AGAIN_MESSAGE);
        assert!(err.is_remote());
    }

    #[test]
    fn backend_messages_are_surfaced_verbatim() {
        let err = ClientError::GenerationFailed("model not loaded".into());
        assert_eq!(err.user_message(), "model not loaded");

        let err = ClientError::EmailSoftFailure("Email service not configured".into());
        assert_eq!(err.user_message(), "Email service not configured");

        let err = ClientError::EmailRejected("value is not a valid email address".into());
        assert_eq!(err.user_message(), "value is not a valid email address");
        assert!(err.is_remote());
    }

    #[test]
    fn validation_lists_missing_fields() {
        let err = ClientError::ValidationBlocked {
            missing: vec!["recipient name", "qualities"],
        };
        assert_eq!(err.user_message(), "Please fill in: recipient name, qualities");
        assert!(!err.is_remote());
    }
}
