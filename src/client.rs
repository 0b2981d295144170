//! Google Drive API client.

use url::Url;

use crate::auth::AuthorizedClient;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, FileListResponse};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Parameters of a files.list call.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub page_size: u32,
    pub fields: String,
    pub page_token: Option<String>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            page_size: 10,
            fields: "nextPageToken, files(id, name)".to_string(),
            page_token: None,
        }
    }
}

/// Client for the Google Drive files API.
pub struct DriveClient {
    auth: AuthorizedClient,
    base_url: Url,
}

impl DriveClient {
    /// Create a client against the public Drive v3 endpoint.
    pub fn new(auth: AuthorizedClient) -> Result<Self> {
        Self::with_base_url(auth, DRIVE_API_BASE)
    }

    /// Create a client against another Drive-compatible endpoint.
    pub fn with_base_url(auth: AuthorizedClient, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| DriveError::ApiClientError(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DriveError::ApiClientError(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { auth, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List one page of files visible to the authorized user.
    pub async fn list_files(&self, request: &ListRequest) -> Result<FileListResponse> {
        let url = self
            .base_url
            .join("files")
            .map_err(|e| DriveError::ApiClientError(e.to_string()))?;

        let page_size = request.page_size.to_string();
        let mut builder = self.auth.get(url).await?.query(&[
            ("pageSize", page_size.as_str()),
            ("fields", request.fields.as_str()),
        ]);
        if let Some(ref token) = request.page_token {
            builder = builder.query(&[("pageToken", token)]);
        }

        tracing::debug!(page_size = request.page_size, "Listing files");
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
                return Err(DriveError::ApiCallError {
                    status: api_error.error.code,
                    message: api_error.error.message,
                });
            }
            return Err(DriveError::ApiCallError {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let list_response: FileListResponse = response.json().await?;
        Ok(list_response)
    }
}
