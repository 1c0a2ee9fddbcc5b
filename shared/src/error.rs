//! Error types for the Okta to Amazon Connect webhook.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to callers for any server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors that can terminate a webhook invocation.
#[derive(Error, Debug)]
pub enum Error {
    /// The inbound event carries no HTTP method
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// GET without the verification challenge header
    #[error("x-okta-verification-challenge header not found")]
    MissingChallenge,

    /// Body is not valid JSON or lacks the event list
    #[error("{0}")]
    MalformedPayload(String),

    /// Parsing finished with an empty candidate list
    #[error("No valid user information found in data")]
    NoValidUsers,

    /// Every candidate already exists in the Connect instance
    #[error("User with username '{0}' already exists.")]
    UserAlreadyExists(String),

    /// Provisioning API call failed
    #[error("Provisioning unavailable: {0}")]
    ProvisioningUnavailable(String),

    /// Method other than GET or POST
    #[error("Method {0} not allowed")]
    UnsupportedMethod(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MalformedRequest(_)
            | Error::MissingChallenge
            | Error::MalformedPayload(_)
            | Error::NoValidUsers
            | Error::UserAlreadyExists(_) => 400,
            Error::UnsupportedMethod(_) => 405,
            Error::ProvisioningUnavailable(_) | Error::Config(_) | Error::Serialization(_) => 500,
        }
    }

    /// Message safe to return to the caller. Server errors never leak detail.
    pub fn public_message(&self) -> String {
        if self.status_code() >= 500 {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}
