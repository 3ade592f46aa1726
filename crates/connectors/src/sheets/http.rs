use crate::{
    error::SheetsError,
    sheets::{
        api::SheetsApi,
        auth::TokenSource,
        types::{
            AppendRequest, AppendValuesResponse, BatchGetValuesByDataFilterRequest,
            BatchGetValuesByDataFilterResponse, ErrorEnvelope, UpdateRequest,
            UpdateValuesResponse,
        },
    },
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// [`SheetsApi`] over the public REST endpoints.
pub struct HttpSheetsClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl HttpSheetsClient {
    pub fn new(http: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            tokens,
        }
    }

    /// Client with the connector's default timeouts.
    pub fn with_defaults(tokens: Arc<dyn TokenSource>) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sheetsync/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self::new(http, tokens))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base}/v4/spreadsheets/{id}/{segments..}` with every segment percent-encoded.
    pub fn values_url(&self, spreadsheet_id: &str, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id])
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            if body.is_empty() {
                return Ok(serde_json::from_slice(b"{}")?);
            }
            return Ok(serde_json::from_slice(&body)?);
        }

        debug!(status = status.as_u16(), "Sheets API request failed");
        Err(classify_status(status, &body))
    }
}

/// Maps a non-success response onto the connector's error taxonomy.
pub fn classify_status(status: StatusCode, body: &[u8]) -> SheetsError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error)
        .and_then(|err| err.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

    match status {
        StatusCode::NOT_MODIFIED => SheetsError::NotModified,
        StatusCode::TOO_MANY_REQUESTS => SheetsError::RateLimited { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SheetsError::Auth(message),
        other => SheetsError::Api {
            status: other.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl SheetsApi for HttpSheetsClient {
    async fn batch_get_by_data_filter(
        &self,
        spreadsheet_id: &str,
        request: &BatchGetValuesByDataFilterRequest,
    ) -> Result<BatchGetValuesByDataFilterResponse, SheetsError> {
        let url = self.values_url(spreadsheet_id, &["values:batchGetByDataFilter"])?;
        self.send(self.http.post(url).json(request)).await
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        request: &AppendRequest,
    ) -> Result<AppendValuesResponse, SheetsError> {
        let segment = format!("{}:append", request.range);
        let url = self.values_url(spreadsheet_id, &["values", &segment])?;
        let builder = self
            .http
            .post(url)
            .query(&[
                ("valueInputOption", request.value_input_option.as_str()),
                ("insertDataOption", request.insert_data_option.as_str()),
            ])
            .json(&request.body);
        self.send(builder).await
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let url = self.values_url(spreadsheet_id, &["values", &request.range])?;
        let builder = self
            .http
            .put(url)
            .query(&[("valueInputOption", request.value_input_option.as_str())])
            .json(&request.body);
        self.send(builder).await
    }
}
