use crate::error::CliError;
use engine_config::settings::ConfigMap;
use std::{fs, path::Path};

/// Builds the connector configuration from the process environment and a
/// `KEY=VALUE` file. File entries win over environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    vars: ConfigMap,
}

impl ConfigLoader {
    pub fn from_environment() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        self.parse_content(&content)
    }

    pub fn into_config(self) -> ConfigMap {
        self.vars
    }

    fn parse_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!("empty key at line {}", line_num + 1)));
            }

            self.vars.insert(key.to_string(), unquote(value));
        }

        Ok(())
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();

    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }

    value.to_string()
}
