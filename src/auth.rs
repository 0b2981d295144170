//! OAuth2 installed-application authorization for Google APIs.
//!
//! [`TokenManager`] reuses the token cached on disk when there is one, and
//! otherwise walks the user through the authorization-code flow: it prints
//! the consent URL, reads the code the user pastes back, exchanges it for a
//! token and caches the result for later runs.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::{Client, RequestBuilder};
use tokio::sync::RwLock;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{DriveError, Result};
use crate::models::{Token, TokenErrorResponse, TokenResponse};
use crate::token_store::{CachedToken, TokenCache};

/// Opaque state value sent with the authorization request.
pub const AUTH_STATE: &str = "state-token";

/// Tokens this close to their expiry are refreshed before use.
const EXPIRY_LEEWAY_SECS: i64 = 10;

/// Source of the authorization code typed in by the user.
pub trait CodePrompt {
    /// Show `auth_url` to the user and return the code they enter.
    fn read_code(&mut self, auth_url: &str) -> io::Result<String>;
}

/// Prompt that writes instructions to `output` and reads one line of `input`.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> CodePrompt for ConsolePrompt<R, W> {
    fn read_code(&mut self, auth_url: &str) -> io::Result<String> {
        writeln!(
            self.output,
            "Go to the following link in your browser then type the authorization code: \n{}",
            auth_url
        )?;
        write!(self.output, "Enter the authorization code: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an authorization code was entered",
            ));
        }
        Ok(line.trim().to_string())
    }
}

/// Build the URL the user visits to grant access.
///
/// Requests offline access so the token endpoint also issues a refresh token.
pub fn auth_code_url(config: &ClientConfig, state: &str) -> String {
    let mut url = config.auth_url.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("access_type", "offline");
        query.append_pair("client_id", &config.client_id);
        if let Some(redirect_url) = &config.redirect_url {
            query.append_pair("redirect_uri", redirect_url);
        }
        query.append_pair("response_type", "code");
        query.append_pair("scope", &config.scopes.join(" "));
        query.append_pair("state", state);
    }
    url.to_string()
}

/// Obtains an authorized client from the token cache or the interactive flow.
pub struct TokenManager {
    cache: TokenCache,
    http: Client,
}

impl TokenManager {
    pub fn new(cache: TokenCache) -> Self {
        Self {
            cache,
            http: Client::new(),
        }
    }

    /// Return a client carrying a usable token.
    ///
    /// A cached token is trusted without an expiry check; `prompt` is only
    /// consulted when the cache has nothing usable.
    pub async fn get_authorized_client<P: CodePrompt + ?Sized>(
        &self,
        config: &ClientConfig,
        prompt: &mut P,
    ) -> Result<AuthorizedClient> {
        let token = match self.cache.lookup() {
            CachedToken::Found(token) => {
                tracing::info!("Using cached token from {}", self.cache.path().display());
                token
            }
            CachedToken::Missing(miss) => {
                tracing::info!(
                    "Unable to use token file '{}': {}",
                    self.cache.path().display(),
                    miss
                );
                let token = self.interactive_authorize(config, prompt).await?;
                if let Err(e) = self.cache.save(&token) {
                    tracing::warn!("{}", e);
                }
                token
            }
        };

        Ok(AuthorizedClient::new(config.clone(), token, self.http.clone()))
    }

    /// Run the authorization-code flow once and return the issued token.
    pub async fn interactive_authorize<P: CodePrompt + ?Sized>(
        &self,
        config: &ClientConfig,
        prompt: &mut P,
    ) -> Result<Token> {
        let auth_url = auth_code_url(config, AUTH_STATE);
        let code = prompt
            .read_code(&auth_url)
            .map_err(|e| DriveError::AuthorizationCodeError(e.to_string()))?;
        let code = code.trim();
        if code.is_empty() {
            return Err(DriveError::AuthorizationCodeError(
                "empty authorization code".to_string(),
            ));
        }

        let mut params = vec![("grant_type", "authorization_code"), ("code", code)];
        if let Some(redirect_url) = config.redirect_url.as_deref() {
            params.push(("redirect_uri", redirect_url));
        }

        tracing::debug!("Exchanging authorization code for tokens");
        request_token(&self.http, config, &params)
            .await
            .map_err(DriveError::TokenExchangeError)
    }
}

/// POST a grant to the token endpoint, with client credentials in the body.
async fn request_token(
    http: &Client,
    config: &ClientConfig,
    grant: &[(&str, &str)],
) -> std::result::Result<Token, String> {
    let mut params: Vec<(&str, &str)> = grant.to_vec();
    params.push(("client_id", config.client_id.as_str()));
    params.push(("client_secret", config.client_secret.as_str()));

    let response = http
        .post(config.token_url.clone())
        .form(&params)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = response.status();
    let body = response.text().await.map_err(|e| e.to_string())?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Token endpoint rejected the request");
        if let Ok(token_error) = serde_json::from_str::<TokenErrorResponse>(&body) {
            return Err(format!("Status {}: {}", status, token_error));
        }
        return Err(format!("Status {}: {}", status, body));
    }

    let token_response: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| format!("cannot parse token response: {}", e))?;
    if token_response.access_token.is_empty() {
        return Err("server response missing access_token".to_string());
    }

    Token::from_response(token_response, Utc::now())
}

/// HTTP client that attaches the bearer token to every request.
///
/// An expired token is refreshed with its refresh token on next use. The
/// refreshed token lives in memory only.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    config: Arc<ClientConfig>,
    http: Client,
    token: Arc<RwLock<Token>>,
}

impl AuthorizedClient {
    pub fn new(config: ClientConfig, token: Token, http: Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Snapshot of the current token.
    pub async fn token(&self) -> Token {
        self.token.read().await.clone()
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String> {
        let leeway = Duration::seconds(EXPIRY_LEEWAY_SECS);
        {
            let token = self.token.read().await;
            if !token.expires_within(Utc::now(), leeway) {
                return Ok(token.access_token.clone());
            }
        }

        let mut token = self.token.write().await;
        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            DriveError::TokenRefreshError("token expired and refresh token is not set".to_string())
        })?;

        tracing::debug!("Refreshing expired access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let mut refreshed = request_token(&self.http, &self.config, &params)
            .await
            .map_err(DriveError::TokenRefreshError)?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }

        *token = refreshed;
        Ok(token.access_token.clone())
    }

    /// Attach the bearer token to `request`.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let access_token = self.access_token().await?;
        Ok(request.bearer_auth(access_token))
    }

    /// Start a GET request to `url` carrying the bearer token.
    pub async fn get(&self, url: Url) -> Result<RequestBuilder> {
        self.authorize(self.http.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_config() -> ClientConfig {
        ClientConfig {
            client_id: "client-id".to_string(),
            client_secret: "secret".to_string(),
            auth_url: Url::parse("https://accounts.google.com/o/oauth2/auth").unwrap(),
            token_url: Url::parse("https://oauth2.googleapis.com/token").unwrap(),
            redirect_url: Some("urn:ietf:wg:oauth:2.0:oob".to_string()),
            scopes: vec![crate::config::DRIVE_METADATA_READONLY_SCOPE.to_string()],
        }
    }

    #[test]
    fn test_auth_code_url_parameters() {
        let url = Url::parse(&auth_code_url(&test_config(), AUTH_STATE)).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.path(), "/o/oauth2/auth");
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("client_id".into(), "client-id".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("state".into(), "state-token".into())));
        assert!(pairs.contains(&(
            "scope".into(),
            "https://www.googleapis.com/auth/drive.metadata.readonly".into()
        )));
        assert!(pairs.contains(&("redirect_uri".into(), "urn:ietf:wg:oauth:2.0:oob".into())));
    }

    #[test]
    fn test_auth_code_url_without_redirect() {
        let mut config = test_config();
        config.redirect_url = None;

        let url = auth_code_url(&config, AUTH_STATE);
        assert!(!url.contains("redirect_uri"));
    }

    #[test]
    fn test_console_prompt_reads_trimmed_line() {
        let mut output = Vec::new();
        let mut prompt = ConsolePrompt::new(Cursor::new("  ABC123 \nignored\n"), &mut output);

        let code = prompt.read_code("https://example.com/auth").unwrap();
        assert_eq!(code, "ABC123");

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("https://example.com/auth"));
        assert!(printed.ends_with("Enter the authorization code: "));
    }

    #[test]
    fn test_console_prompt_eof_is_error() {
        let mut prompt = ConsolePrompt::new(Cursor::new(""), Vec::new());
        let err = prompt.read_code("https://example.com/auth").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_unexpired_token_is_used_as_is() {
        let token = Token {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry: Some(Utc::now() + Duration::hours(1)),
        };
        let client = AuthorizedClient::new(test_config(), token, Client::new());

        assert_eq!(client.access_token().await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_fails() {
        let token = Token {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry: Some(Utc::now() - Duration::hours(1)),
        };
        let client = AuthorizedClient::new(test_config(), token, Client::new());

        let err = client.access_token().await.unwrap_err();
        assert!(matches!(err, DriveError::TokenRefreshError(_)));
    }
}
