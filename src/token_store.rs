//! On-disk cache for the OAuth2 token.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{DriveError, Result};
use crate::models::Token;

/// Why no cached token could be used.
#[derive(Error, Debug)]
pub enum CacheMiss {
    #[error("no cached token")]
    NotFound,

    #[error("unreadable token file: {0}")]
    Unreadable(#[source] io::Error),

    #[error("undecodable token file: {0}")]
    Undecodable(#[source] serde_json::Error),
}

/// Result of looking up the token cache.
#[derive(Debug)]
pub enum CachedToken {
    Found(Token),
    Missing(CacheMiss),
}

/// Token cache backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the cached token.
    ///
    /// A token that decodes is returned as-is, without checking its expiry.
    pub fn lookup(&self) -> CachedToken {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return CachedToken::Missing(CacheMiss::NotFound)
            }
            Err(e) => return CachedToken::Missing(CacheMiss::Unreadable(e)),
        };

        match serde_json::from_str(&content) {
            Ok(token) => CachedToken::Found(token),
            Err(e) => CachedToken::Missing(CacheMiss::Undecodable(e)),
        }
    }

    /// Write the token to the cache file, replacing any previous content.
    ///
    /// On Unix the file is readable and writable by its owner only.
    pub fn save(&self, token: &Token) -> Result<()> {
        tracing::info!("Saving credential file to: {}", self.path.display());
        self.write_token(token).map_err(|source| DriveError::TokenPersistError {
            path: self.path.clone(),
            source,
        })
    }

    fn write_token(&self, token: &Token) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;

        // The creation mode does not apply to a file that already existed.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        serde_json::to_writer(&mut file, token)?;
        file.write_all(b"\n")?;
        file.flush()
    }
}
