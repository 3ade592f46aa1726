//! Bearer tokens for the Sheets API.

use crate::error::SheetsError;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens expiring within this window are refreshed before use.
const EXPIRY_DELTA_SECS: i64 = 60;

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// A fixed bearer token. Useful for short-lived jobs and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}

/// OAuth client registration, as found in a Google client secret file.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Client secret file layout: the registration sits under `installed` or `web`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretFile {
    pub installed: Option<OAuthClient>,
    pub web: Option<OAuthClient>,
}

impl ClientSecretFile {
    pub fn into_client(self) -> Option<OAuthClient> {
        self.installed.or(self.web)
    }
}

/// A token as persisted in the tokens file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_expiry")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Go-style token files write `0001-01-01T00:00:00Z` for "never expires".
fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|ts| ts.year() > 1))
}

impl OAuthToken {
    /// Whether the access token can be used at `now` without refreshing.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }

        match self.expiry {
            None => true,
            Some(expiry) => expiry - Duration::seconds(EXPIRY_DELTA_SECS) > now,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Hands out the cached access token and refreshes it through the
/// `refresh_token` grant once it is about to expire.
pub struct RefreshingTokenSource {
    http: reqwest::Client,
    client: OAuthClient,
    token: Mutex<OAuthToken>,
}

impl RefreshingTokenSource {
    pub fn new(http: reqwest::Client, client: OAuthClient, token: OAuthToken) -> Self {
        Self {
            http,
            client,
            token: Mutex::new(token),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<OAuthToken, SheetsError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client.client_id.as_str()),
            ("client_secret", self.client.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.client.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Auth(format!(
                "token refresh failed with status {status}: {body}"
            )));
        }

        let refreshed: RefreshResponse = response.json().await?;
        let expiry = refreshed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(OAuthToken {
            access_token: refreshed.access_token,
            token_type: refreshed.token_type,
            // Google only returns a new refresh token when it rotates it.
            refresh_token: refreshed
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expiry,
        })
    }
}

#[async_trait]
impl TokenSource for RefreshingTokenSource {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut token = self.token.lock().await;
        if token.is_fresh(Utc::now()) {
            return Ok(token.access_token.clone());
        }

        let refresh_token = token
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SheetsError::Auth("access token expired and no refresh token is available".into())
            })?;

        debug!(token_uri = %self.client.token_uri, "Refreshing access token");
        let refreshed = self.refresh(&refresh_token).await?;
        info!(expiry = ?refreshed.expiry, "Access token refreshed");

        *token = refreshed;
        Ok(token.access_token.clone())
    }
}
