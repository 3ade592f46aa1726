use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AckError {
    #[error("Failed acknowledgement: {0}")]
    Failed(String),
}
