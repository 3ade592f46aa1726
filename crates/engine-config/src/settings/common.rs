use crate::settings::{ConfigMap, error::SettingsError, required};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;

pub const KEY_CREDENTIALS_FILE: &str = "google.credentialsFile";
pub const KEY_TOKENS_FILE: &str = "google.tokensFile";
pub const KEY_SHEETS_URL: &str = "google.sheetsURL";

const SHEETS_URL_PATTERN: &str = r"/spreadsheets/d/([a-zA-Z0-9-_]+)/(.*)#gid=([0-9]+)";

lazy_static! {
    static ref SHEETS_URL: Regex = Regex::new(SHEETS_URL_PATTERN).unwrap();
}

/// Settings shared by the source and the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSettings {
    pub credentials_file: PathBuf,
    pub tokens_file: PathBuf,
    pub spreadsheet_id: String,
    pub sheet_id: i64,
}

impl CommonSettings {
    /// Validates the shared keys. Files are only checked for presence here;
    /// they are read by [`load_token_source`](super::credentials::load_token_source).
    pub fn parse(config: &ConfigMap) -> Result<Self, SettingsError> {
        let credentials_file = required(config, KEY_CREDENTIALS_FILE)?;
        let tokens_file = required(config, KEY_TOKENS_FILE)?;
        let sheets_url = required(config, KEY_SHEETS_URL)?;

        let (spreadsheet_id, sheet_id) = parse_sheet_url(sheets_url)?;

        Ok(CommonSettings {
            credentials_file: PathBuf::from(credentials_file),
            tokens_file: PathBuf::from(tokens_file),
            spreadsheet_id,
            sheet_id,
        })
    }
}

/// Extracts the spreadsheet id and the sheet (`gid`) id from a sheet URL such
/// as `https://docs.google.com/spreadsheets/d/<id>/edit#gid=<gid>`.
pub fn parse_sheet_url(url: &str) -> Result<(String, i64), SettingsError> {
    let captures = SHEETS_URL
        .captures(url)
        .ok_or_else(|| SettingsError::InvalidSheetUrl {
            pattern: SHEETS_URL_PATTERN.to_string(),
        })?;

    let sheet_id = captures[3]
        .parse::<i64>()
        .map_err(|err| SettingsError::Invalid {
            key: KEY_SHEETS_URL,
            reason: format!("error converting sheet id to int: {err}"),
        })?;

    Ok((captures[1].to_string(), sheet_id))
}
