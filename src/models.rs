//! Data models for Google Drive API responses and OAuth2 documents.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A file entry returned by the files.list API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
}

impl std::fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Client secret document as downloaded from the Google Cloud console.
///
/// Exactly one of the two sections is expected; `installed` wins when both
/// are present.
#[derive(Debug, Deserialize)]
pub struct ClientSecrets {
    pub installed: Option<ClientSecretSection>,
    pub web: Option<ClientSecretSection>,
}

/// The `installed` or `web` section of a client secret document.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretSection {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// An OAuth2 token as cached in `token.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_expiry"
    )]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token files written by other OAuth2 clients encode "never expires" as
/// the zero timestamp `0001-01-01T00:00:00Z`.
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<DateTime<Utc>> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|t| t.year() > 1))
}

impl Token {
    /// Build a token from a token endpoint response received at `now`.
    ///
    /// Fails when `expires_in` does not fit in a timestamp.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Result<Self, String> {
        let expiry = match response.expires_in.filter(|secs| *secs > 0) {
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or_else(|| format!("expires_in out of range: {}", secs))?,
            ),
            None => None,
        };

        Ok(Self {
            access_token: response.access_token,
            token_type: response
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_token_type),
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            expiry,
        })
    }

    /// Whether the token expires within `leeway` of `now`.
    ///
    /// Tokens without an expiry never expire.
    pub fn expires_within(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now + leeway)
    }
}

/// OAuth2 token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// OAuth2 token endpoint error body.
#[derive(Debug, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl std::fmt::Display for TokenErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}
