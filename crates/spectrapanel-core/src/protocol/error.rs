//! Sensor protocol errors

use thiserror::Error;

use crate::spectral::ReadingError;

/// Errors that can occur while talking to the sensor endpoint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// The configured origin cannot be turned into an endpoint
    #[error("Invalid sensor URL: {0}")]
    InvalidUrl(String),

    /// Connection or request failure
    #[error("Sensor request failed: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("Sensor request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("Sensor returned HTTP status {0}")]
    Status(u16),

    /// Body is not JSON
    #[error("Malformed sensor response: {0}")]
    Decode(String),

    /// JSON that is not a usable reading
    #[error(transparent)]
    Reading(#[from] ReadingError),
}

impl SensorError {
    /// True for failures that happened before any response was read
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SensorError::Transport(_) | SensorError::Timeout | SensorError::Status(_)
        )
    }
}

impl From<reqwest::Error> for SensorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SensorError::Timeout
        } else if err.is_decode() {
            SensorError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SensorError::Status(status.as_u16())
        } else {
            SensorError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SensorError {
    fn from(err: serde_json::Error) -> Self {
        SensorError::Decode(err.to_string())
    }
}
