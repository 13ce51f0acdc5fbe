use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Tracking provider rejected the request: {0}")]
    ProviderError(String),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Failed to deliver message: {0}")]
    DeliveryError(String),
}

/// Terminal outcome of a resolution where no attempt produced an accepted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No tracking information available yet")]
pub struct NotFound;

impl From<reqwest::Error> for TrackerError {
    fn from(error: reqwest::Error) -> Self {
        TrackerError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(error: serde_json::Error) -> Self {
        TrackerError::ParseError(error.to_string())
    }
}

impl From<url::ParseError> for TrackerError {
    fn from(error: url::ParseError) -> Self {
        TrackerError::ConfigError(format!("invalid URL: {}", error))
    }
}

impl From<anyhow::Error> for TrackerError {
    fn from(error: anyhow::Error) -> Self {
        TrackerError::HttpError(error.to_string())
    }
}
