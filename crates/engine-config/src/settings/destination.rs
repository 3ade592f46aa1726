use crate::settings::{
    ConfigMap, common::CommonSettings, error::SettingsError, parse_or, required,
};
use connectors::sheets::options::ValueInputOption;

pub const KEY_SHEET_NAME: &str = "sheetName";
pub const KEY_VALUE_INPUT_OPTION: &str = "valueInputOption";
pub const KEY_BUFFER_SIZE: &str = "bufferSize";
pub const KEY_MAX_RETRIES: &str = "maxRetries";

pub const MAX_BUFFER_SIZE: usize = 100;
pub const DEFAULT_MAX_RETRIES: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSettings {
    pub common: CommonSettings,
    pub sheet_name: String,
    pub value_input_option: ValueInputOption,
    pub buffer_size: usize,
    pub max_retries: u64,
}

impl DestinationSettings {
    pub fn parse(config: &ConfigMap) -> Result<Self, SettingsError> {
        let common = CommonSettings::parse(config)?;
        let sheet_name = required(config, KEY_SHEET_NAME)?.to_string();

        let buffer_size = parse_or(config, KEY_BUFFER_SIZE, MAX_BUFFER_SIZE)?;
        if buffer_size == 0 || buffer_size > MAX_BUFFER_SIZE {
            return Err(SettingsError::Invalid {
                key: KEY_BUFFER_SIZE,
                reason: format!("should be between 1 and {MAX_BUFFER_SIZE}, got {buffer_size}"),
            });
        }

        Ok(DestinationSettings {
            common,
            sheet_name,
            value_input_option: parse_or(
                config,
                KEY_VALUE_INPUT_OPTION,
                ValueInputOption::default(),
            )?,
            buffer_size,
            max_retries: parse_or(config, KEY_MAX_RETRIES, DEFAULT_MAX_RETRIES)?,
        })
    }
}
