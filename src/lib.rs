//! drive_list - List the files in a Google Drive account from the command line.
//!
//! This library provides functionality to:
//! - Load an OAuth2 client secret file
//! - Authorize once through the installed-application flow and cache the token
//! - List files visible to the authorized account
//!
//! # Example
//!
//! ```no_run
//! use drive_list::{load_config, ConsolePrompt, DriveClient, ListRequest, TokenCache, TokenManager};
//! use drive_list::config::DRIVE_METADATA_READONLY_SCOPE;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("credentials/credentials.json", &[DRIVE_METADATA_READONLY_SCOPE])?;
//!     let manager = TokenManager::new(TokenCache::new("token.json"));
//!     let auth = manager
//!         .get_authorized_client(&config, &mut ConsolePrompt::stdio())
//!         .await?;
//!
//!     let client = DriveClient::new(auth)?;
//!     let response = client.list_files(&ListRequest::default()).await?;
//!     for file in response.files {
//!         println!("{}", file);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod token_store;

// Re-exports for convenience
pub use auth::{AuthorizedClient, CodePrompt, ConsolePrompt, TokenManager};
pub use client::{DriveClient, ListRequest};
pub use config::{load_config, ClientConfig};
pub use error::{DriveError, Result};
pub use listing::write_listing;
pub use models::{FileMetadata, Token};
pub use token_store::{CachedToken, TokenCache};
