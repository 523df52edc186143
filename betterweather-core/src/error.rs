use thiserror::Error;

use crate::model::ErrorCode;

/// Failures that escape the core instead of becoming an error-tagged record.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed XML response: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl WeatherError {
    /// Record-level code a caller should publish for this failure.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidLocation(_) => ErrorCode::Location,
            Self::Network(_) => ErrorCode::Internet,
            Self::Xml(_) => ErrorCode::Api,
        }
    }
}
