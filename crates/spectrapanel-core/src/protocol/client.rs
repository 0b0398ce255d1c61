//! Sensor clients
//!
//! Everything the panel needs from the sensor: one GET per reading and a
//! best-effort request that turns the illumination off.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::{SensorEndpoint, SensorError};
use crate::acquisition::SensorRequest;
use crate::spectral::RawReading;

/// Default time to wait for a reading before giving up
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of sensor readings
pub trait SensorClient {
    /// Perform one acquisition and return the decoded response
    fn fetch_reading(
        &self,
        request: &SensorRequest,
    ) -> impl Future<Output = Result<RawReading, SensorError>> + Send;

    /// Ask the sensor to switch its LED off
    ///
    /// The reply is never inspected; failures are logged and otherwise ignored.
    fn switch_led_off(&self) -> impl Future<Output = ()> + Send;
}

/// HTTP client for the ESP32 firmware
#[derive(Debug, Clone)]
pub struct HttpSensorClient {
    client: reqwest::Client,
    endpoint: SensorEndpoint,
}

impl HttpSensorClient {
    /// Create a client for `endpoint`
    pub fn new(endpoint: SensorEndpoint, timeout: Duration) -> Result<Self, SensorError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("SpectraPanel/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| SensorError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

impl SensorClient for HttpSensorClient {
    async fn fetch_reading(&self, request: &SensorRequest) -> Result<RawReading, SensorError> {
        let url = self.endpoint.request_url(request);
        debug!(%url, "requesting sensor reading");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SensorError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        Ok(RawReading::from_value(value)?)
    }

    async fn switch_led_off(&self) {
        let url = self.endpoint.request_url(&SensorRequest::LedOff);
        debug!(%url, "switching LED off");
        if let Err(e) = self.client.get(url).send().await {
            warn!("LED off request failed: {e}");
        }
    }
}
