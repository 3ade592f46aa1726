use thiserror::Error;

/// Errors raised while parsing connector configuration or loading the files
/// it points to.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A required key was absent or empty.
    #[error("\"{0}\" config value must be set")]
    Missing(&'static str),

    /// A key was present but its value could not be used.
    #[error("\"{key}\" config value is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("invalid url passed, should match regex: {pattern}")]
    InvalidSheetUrl { pattern: String },

    #[error("Unable to read {what} file '{path}': {source}")]
    ReadFile {
        what: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse {what} file '{path}': {source}")]
    ParseFile {
        what: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Client secret file '{0}' has neither an `installed` nor a `web` section")]
    MissingClient(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
