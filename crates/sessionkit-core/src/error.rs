//! Error types for Sessionkit.
//!
//! Recoverable failures are values of [`Error`]. Programming errors such as
//! registering the same provider twice are not represented here; they panic.

use thiserror::Error;

/// Result type alias using the Sessionkit error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Sessionkit.
#[derive(Error, Debug)]
pub enum Error {
    /// No provider registered under the requested name
    #[error("session: unknown provider {0:?} (forgotten registration?)")]
    UnknownProvider(String),

    /// The secure random source could not produce an identifier
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Session id unknown to the provider (or already expired)
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Transported identifier could not be decoded
    #[error("Invalid session identifier: {0}")]
    InvalidIdentifier(String),

    /// Storage backend failure
    #[error("Provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a backend failure with the name of the provider that raised it.
    pub fn provider(provider: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::Provider {
            provider: provider.into(),
            source: source.into(),
        }
    }

    /// Whether the error means the session does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Get a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::UnknownProvider(_) => {
                Some("Register the provider at startup before constructing a Manager")
            }
            Error::EntropyUnavailable(_) => {
                Some("Check that the operating system random source is available")
            }
            Error::NotFound(_) => {
                Some("Start a new session; the old one expired or was destroyed")
            }
            Error::InvalidIdentifier(_) => {
                Some("Discard the cookie or token and start a new session")
            }
            Error::Config(_) => {
                Some("Check sessionkit.toml and SESSIONKIT_* environment variables")
            }
            Error::Provider { .. } => None,
        }
    }
}

/// Format an error with its recovery suggestion.
pub fn format_error_with_suggestion(error: &Error) -> String {
    let mut output = error.to_string();
    if let Some(suggestion) = error.recovery_suggestion() {
        output.push_str(&format!("\n  Suggestion: {}", suggestion));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        let err = Error::UnknownProvider("redis".to_string());
        assert!(err.to_string().contains("\"redis\""));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_provider_error_keeps_source() {
        let err = Error::provider("memory", std::io::Error::other("disk full"));
        assert!(err.to_string().contains("memory"));
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_format_with_suggestion() {
        let err = Error::NotFound("abc".to_string());
        assert!(err.is_not_found());
        let formatted = format_error_with_suggestion(&err);
        assert!(formatted.contains("Suggestion:"));
    }
}
