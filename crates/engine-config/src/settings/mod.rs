use crate::settings::error::SettingsError;
use std::{collections::HashMap, str::FromStr};

pub mod common;
pub mod credentials;
pub mod destination;
pub mod error;
pub mod source;

/// Raw configuration as handed over by the pipeline runtime.
pub type ConfigMap = HashMap<String, String>;

/// Value of `key`, treating an empty string as absent.
fn lookup<'a>(config: &'a ConfigMap, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required<'a>(config: &'a ConfigMap, key: &'static str) -> Result<&'a str, SettingsError> {
    lookup(config, key).ok_or(SettingsError::Missing(key))
}

/// Parses an optional key, falling back to `default` when absent.
fn parse_or<T>(config: &ConfigMap, key: &'static str, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: ToString,
{
    match lookup(config, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|err: T::Err| SettingsError::Invalid {
            key,
            reason: err.to_string(),
        }),
    }
}
