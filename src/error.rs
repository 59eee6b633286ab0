//! Error types shared by the Crowdin client, configuration and credentials.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrowdinError {
    #[error("not signed in to Crowdin")]
    NotSignedIn,

    /// Non-2xx answer from Crowdin.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("invalid response from Crowdin: {0}")]
    InvalidResponse(String),

    #[error("authorization failed: {0}")]
    OAuth(String),

    #[error("authorization callback does not match the pending sign-in")]
    StateMismatch,

    #[error("invalid project id: {0:?}")]
    InvalidProjectId(String),

    #[error("no sign-in in progress")]
    NoPendingSignIn,

    /// The worker finished without reporting, or a sign-in was abandoned.
    #[error("request cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("failed to access credentials at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid log level: {0}")]
    LogLevel(String),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

pub type Result<T, E = CrowdinError> = std::result::Result<T, E>;
