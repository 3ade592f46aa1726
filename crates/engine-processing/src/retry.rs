use connectors::error::SheetsError;
use engine_core::retry::{RetryDisposition, RetryError};

/// Only rate limiting is transient; everything else stops the operation.
pub fn classify_sheets_error(err: &SheetsError) -> RetryDisposition {
    match err {
        SheetsError::RateLimited { .. } => RetryDisposition::Retry,
        SheetsError::NotModified => RetryDisposition::Stop,
        SheetsError::Auth(_) => RetryDisposition::Stop,
        SheetsError::Api { .. } => RetryDisposition::Stop,
        SheetsError::Http(_) => RetryDisposition::Stop,
        SheetsError::Json(_) => RetryDisposition::Stop,
        SheetsError::InvalidPayload { .. } => RetryDisposition::Stop,
        SheetsError::RetriesExhausted { .. } => RetryDisposition::Stop,
        SheetsError::InvalidUrl(_) => RetryDisposition::Stop,
        SheetsError::Cancelled => RetryDisposition::Stop,
        SheetsError::Model(_) => RetryDisposition::Stop,
    }
}

pub fn into_sheets_error(err: RetryError<SheetsError>) -> SheetsError {
    match err {
        RetryError::Fatal(err) => err,
        RetryError::AttemptsExceeded {
            retries,
            last_error,
        } => {
            let message = match last_error {
                SheetsError::RateLimited { message } => message,
                other => other.to_string(),
            };
            SheetsError::RetriesExhausted { retries, message }
        }
        RetryError::Cancelled => SheetsError::Cancelled,
    }
}
