//! Result and error types for Sondeo.

use thiserror::Error;

/// Result type for Sondeo operations
pub type SondeoResult<T> = Result<T, SondeoError>;

/// Errors that can occur in Sondeo
#[derive(Debug, Error)]
pub enum SondeoError {
    /// Required external configuration missing or invalid.
    ///
    /// Fatal: aborts the run before any browser interaction.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is missing and how to provide it
        message: String,
    },

    /// A required intent's candidate list was exhausted
    #[error("No element found for intent '{intent}' after trying {tried} candidates")]
    ElementNotFound {
        /// Semantic intent that could not be located
        intent: String,
        /// Number of candidates tried
        tried: usize,
    },

    /// No verification signal became true within budget
    #[error("Verification '{signals}' timed out after {ms}ms")]
    VerificationTimeout {
        /// Description of the signal set that was checked
        signals: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// An explicit assertion about current application state failed
    #[error("Unexpected application state: {message}")]
    UnexpectedState {
        /// What was expected and what was observed
        message: String,
    },

    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Script evaluation against the live page failed
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Interaction with a resolved element failed
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SondeoError {
    /// Build a configuration error naming the offending input
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for errors that must abort the whole run
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::BrowserNotFound | Self::BrowserLaunch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_message_names_intent() {
        let err = SondeoError::ElementNotFound {
            intent: "submit action".to_string(),
            tried: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("submit action"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_verification_timeout_names_signal_set() {
        let err = SondeoError::VerificationTimeout {
            signals: "logged-in indicators".to_string(),
            ms: 5000,
        };
        assert!(err.to_string().contains("logged-in indicators"));
        assert!(err.to_string().contains("5000"));
    }

    #[test]
    fn test_configuration_is_fatal() {
        assert!(SondeoError::configuration("ADMIN_EMAIL not set").is_fatal());
        assert!(!SondeoError::Timeout { ms: 100 }.is_fatal());
        assert!(!SondeoError::ElementNotFound {
            intent: "email field".to_string(),
            tried: 2,
        }
        .is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SondeoError = io.into();
        assert!(matches!(err, SondeoError::Io(_)));
    }
}
