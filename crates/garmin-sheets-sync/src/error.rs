use thiserror::Error;

/// Main error type for garmin-sheets-sync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("MFA required, but the sync job runs non-interactively")]
    MfaRequired,

    #[error("Session rejected by Garmin Connect (401)")]
    NotAuthenticated,

    #[error("Rate limited. Please wait before retrying.")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token signing error: {0}")]
    Jwt(String),

    #[error("Google Sheets error: {0}")]
    Sheets(String),

    #[error("Failed to locate user profile number (last error: {0})")]
    ProfileNotFound(String),

    #[error("Activity {0} is already recorded")]
    Duplicate(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Create an authentication error from a message
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid response error from a message
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a spreadsheet backend error from a message
    pub fn sheets(msg: impl Into<String>) -> Self {
        Self::Sheets(msg.into())
    }

    /// True for errors that mean "this upstream source has nothing for us"
    /// rather than a broken session.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Api { .. } | Self::InvalidResponse(_) | Self::Json(_)
        )
    }
}
