//! Error types for the drive_list crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while authorizing or talking to Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Unable to read credentials file '{}': {source}", path.display())]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse credentials file '{}' to config: {message}", path.display())]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Unable to read authorization code: {0}")]
    AuthorizationCodeError(String),

    #[error("Unable to retrieve token from web: {0}")]
    TokenExchangeError(String),

    #[error("Unable to cache oauth token to '{}': {source}", path.display())]
    TokenPersistError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("Unable to create Drive client: {0}")]
    ApiClientError(String),

    #[error("API error ({status}): {message}")]
    ApiCallError { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
