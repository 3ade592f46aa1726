use crate::settings::{ConfigMap, common::CommonSettings, error::SettingsError, lookup, parse_or};
use connectors::sheets::options::{DateTimeRenderOption, ValueRenderOption};
use std::time::Duration;

pub const KEY_POLLING_PERIOD: &str = "pollingPeriod";
pub const KEY_DATE_TIME_RENDER_OPTION: &str = "dateTimeRenderOption";
pub const KEY_VALUE_RENDER_OPTION: &str = "valueRenderOption";

pub const DEFAULT_POLLING_PERIOD: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub common: CommonSettings,
    pub polling_period: Duration,
    pub date_time_render_option: DateTimeRenderOption,
    pub value_render_option: ValueRenderOption,
}

impl SourceSettings {
    pub fn parse(config: &ConfigMap) -> Result<Self, SettingsError> {
        let common = CommonSettings::parse(config)?;

        let polling_period = match lookup(config, KEY_POLLING_PERIOD) {
            None => DEFAULT_POLLING_PERIOD,
            Some(raw) => humantime::parse_duration(raw).map_err(|err| SettingsError::Invalid {
                key: KEY_POLLING_PERIOD,
                reason: err.to_string(),
            })?,
        };
        if polling_period.is_zero() {
            return Err(SettingsError::Invalid {
                key: KEY_POLLING_PERIOD,
                reason: "must be greater than zero".into(),
            });
        }

        Ok(SourceSettings {
            common,
            polling_period,
            date_time_render_option: parse_or(
                config,
                KEY_DATE_TIME_RENDER_OPTION,
                DateTimeRenderOption::default(),
            )?,
            value_render_option: parse_or(
                config,
                KEY_VALUE_RENDER_OPTION,
                ValueRenderOption::default(),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::common::tests::base_config;

    #[test]
    fn applies_defaults() {
        let settings = SourceSettings::parse(&base_config()).unwrap();
        assert_eq!(settings.polling_period, Duration::from_secs(6));
        assert_eq!(
            settings.date_time_render_option,
            DateTimeRenderOption::FormattedString
        );
        assert_eq!(settings.value_render_option, ValueRenderOption::FormattedValue);
    }

    #[test]
    fn parses_explicit_values() {
        let mut config = base_config();
        config.insert(KEY_POLLING_PERIOD.into(), "250ms".into());
        config.insert(KEY_DATE_TIME_RENDER_OPTION.into(), "SERIAL_NUMBER".into());
        config.insert(KEY_VALUE_RENDER_OPTION.into(), "FORMULA".into());

        let settings = SourceSettings::parse(&config).unwrap();
        assert_eq!(settings.polling_period, Duration::from_millis(250));
        assert_eq!(
            settings.date_time_render_option,
            DateTimeRenderOption::SerialNumber
        );
        assert_eq!(settings.value_render_option, ValueRenderOption::Formula);
    }

    #[test]
    fn rejects_bad_values() {
        for (key, value) in [
            (KEY_POLLING_PERIOD, "soon"),
            (KEY_POLLING_PERIOD, "0s"),
            (KEY_DATE_TIME_RENDER_OPTION, "EPOCH"),
            (KEY_VALUE_RENDER_OPTION, "formatted_value"),
        ] {
            let mut config = base_config();
            config.insert(key.into(), value.into());

            let err = SourceSettings::parse(&config).unwrap_err();
            assert!(
                matches!(err, SettingsError::Invalid { key: invalid, .. } if invalid == key),
                "{key}={value} gave {err}"
            );
        }
    }
}
