// songbot-common/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote error: HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration conflict: {0}")]
    ConfigConflict(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// The category this error falls into. Used when an outcome (or a
    /// chat reply) must name the failure without carrying the full
    /// error chain.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::AuthExpired,
            Error::RefreshFailed(_) => ErrorKind::RefreshFailed,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Remote { .. } | Error::Http(_) | Error::Io(_) => ErrorKind::RemoteError,
            Error::MalformedResponse(_) | Error::Json(_) => ErrorKind::MalformedResponse,
            Error::ConfigConflict(_) | Error::Config(_) => ErrorKind::ConfigurationConflict,
        }
    }
}

/// Terminal error categories, one per failure class the dispatcher can
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthExpired,
    RefreshFailed,
    NotFound,
    RemoteError,
    MalformedResponse,
    ConfigurationConflict,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::AuthExpired => "AuthExpired",
            ErrorKind::RefreshFailed => "RefreshFailed",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::RemoteError => "RemoteError",
            ErrorKind::MalformedResponse => "MalformedResponse",
            ErrorKind::ConfigurationConflict => "ConfigurationConflict",
        };
        write!(f, "{}", name)
    }
}
