use crate::settings::{common::CommonSettings, error::SettingsError};
use connectors::sheets::auth::{
    ClientSecretFile, OAuthClient, OAuthToken, RefreshingTokenSource, TokenSource,
};
use serde::de::DeserializeOwned;
use std::{fs, path::Path, sync::Arc};
use tracing::debug;

fn read_json<T: DeserializeOwned>(what: &'static str, path: &Path) -> Result<T, SettingsError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|source| SettingsError::ReadFile {
        what,
        path: display.clone(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| SettingsError::ParseFile {
        what,
        path: display,
        source,
    })
}

/// Reads the OAuth client registration from a Google client secret file.
pub fn load_client(path: &Path) -> Result<OAuthClient, SettingsError> {
    read_json::<ClientSecretFile>("client secret", path)?
        .into_client()
        .ok_or_else(|| SettingsError::MissingClient(path.display().to_string()))
}

pub fn load_token(path: &Path) -> Result<OAuthToken, SettingsError> {
    read_json("tokens", path)
}

/// Builds the refreshing token source from the configured credential files.
pub fn load_token_source(
    settings: &CommonSettings,
    http: reqwest::Client,
) -> Result<Arc<dyn TokenSource>, SettingsError> {
    let client = load_client(&settings.credentials_file)?;
    let token = load_token(&settings.tokens_file)?;

    debug!(
        client_id = %client.client_id,
        has_refresh_token = token.refresh_token.is_some(),
        "Loaded OAuth credentials"
    );

    Ok(Arc::new(RefreshingTokenSource::new(http, client, token)))
}
