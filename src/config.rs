//! OAuth2 client configuration loaded from a client secret file.

use std::fs;
use std::path::Path;

use url::Url;

use crate::error::{DriveError, Result};
use crate::models::ClientSecrets;

/// Read-only access to file metadata in Google Drive.
pub const DRIVE_METADATA_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/drive.metadata.readonly";

/// OAuth2 client configuration for the installed-application flow.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: Url,
    pub token_url: Url,
    pub redirect_url: Option<String>,
    pub scopes: Vec<String>,
}

/// Load a client configuration from a client secret JSON file.
///
/// The file must contain an `installed` or `web` section. The requested
/// `scopes` are attached to the resulting config.
pub fn load_config<P: AsRef<Path>>(path: P, scopes: &[&str]) -> Result<ClientConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DriveError::ConfigReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |message: String| DriveError::ConfigParseError {
        path: path.to_path_buf(),
        message,
    };

    let secrets: ClientSecrets =
        serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
    let section = secrets
        .installed
        .or(secrets.web)
        .ok_or_else(|| parse_error("no credentials found".to_string()))?;

    if scopes.is_empty() {
        return Err(parse_error("at least one scope is required".to_string()));
    }

    let auth_url = Url::parse(&section.auth_uri)
        .map_err(|e| parse_error(format!("invalid auth_uri '{}': {}", section.auth_uri, e)))?;
    let token_url = Url::parse(&section.token_uri)
        .map_err(|e| parse_error(format!("invalid token_uri '{}': {}", section.token_uri, e)))?;

    tracing::debug!(client_id = %section.client_id, "Loaded OAuth2 client configuration");

    Ok(ClientConfig {
        client_id: section.client_id,
        client_secret: section.client_secret,
        auth_url,
        token_url,
        redirect_url: section.redirect_uris.into_iter().next(),
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
    })
}
