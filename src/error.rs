//! Error types for the tcli client.

use thiserror::Error;

/// Fixed message shown when the API keeps answering 502 Bad Gateway.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str = "Twitter is down or being upgraded.";

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum CliError {
    /// The API answered 502 on every attempt.
    #[error("{}", SERVICE_UNAVAILABLE_MESSAGE)]
    ServiceUnavailable,

    /// The API returned a non-retryable error status.
    #[error("Twitter API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx body did not match the expected record shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The command was invoked with missing or invalid arguments.
    #[error("Usage: {0}")]
    Usage(String),

    /// No usable credentials in the credential file.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// IP or coordinate lookup failed.
    #[error("Location lookup failed: {0}")]
    Location(String),

    /// OAuth signing or token exchange failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential file could not be parsed or written.
    #[error("Credential file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::MalformedResponse(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_unavailable_message() {
        assert_eq!(
            CliError::ServiceUnavailable.to_string(),
            "Twitter is down or being upgraded."
        );
    }

    #[test]
    fn test_api_error_carries_status_and_body() {
        let err = CliError::Api {
            status: 404,
            body: "{\"errors\":\"Not found\"}".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Not found"));
    }

    #[test]
    fn test_json_error_becomes_malformed_response() {
        let err: CliError = serde_json::from_str::<u64>("\"nope\"").unwrap_err().into();
        assert!(matches!(err, CliError::MalformedResponse(_)));
    }
}
