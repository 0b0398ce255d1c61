//! Sensor endpoint URLs
//!
//! The page can be served either from a development machine, which looks
//! for the ESP32 via its mDNS name, or from the ESP32 itself, in which case
//! the sensor lives on the same origin.

use reqwest::Url;

use super::SensorError;
use crate::acquisition::SensorRequest;

/// mDNS address of the sensor board used in development
pub const DEVELOPMENT_HOST: &str = "http://esp32-as7341.local/";

/// Path of the acquisition endpoint on the sensor board
pub const SENSOR_PATH: &str = "/as7341";

/// Location of the AS7341 acquisition endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorEndpoint {
    url: Url,
}

impl SensorEndpoint {
    /// Endpoint on the given origin, e.g. `http://192.168.1.40/`
    pub fn from_origin(origin: &str) -> Result<Self, SensorError> {
        let base = Url::parse(origin)
            .map_err(|e| SensorError::InvalidUrl(format!("{origin}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(SensorError::InvalidUrl(origin.to_string()));
        }
        let url = base
            .join(SENSOR_PATH)
            .map_err(|e| SensorError::InvalidUrl(format!("{origin}: {e}")))?;
        Ok(Self { url })
    }

    /// Endpoint on the development board
    pub fn development() -> Result<Self, SensorError> {
        Self::from_origin(DEVELOPMENT_HOST)
    }

    /// Pick the endpoint: development mode wins over any configured origin
    pub fn resolve(development: bool, origin: Option<&str>) -> Result<Self, SensorError> {
        match (development, origin) {
            (false, Some(origin)) => Self::from_origin(origin),
            _ => Self::development(),
        }
    }

    /// Endpoint URL without query
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Full URL for a request, with its query parameters set
    pub fn request_url(&self, request: &SensorRequest) -> Url {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (key, value) in request.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_replaces_origin_path() {
        let endpoint = SensorEndpoint::from_origin("http://10.0.0.5/index.html").unwrap();
        assert_eq!(endpoint.url().as_str(), "http://10.0.0.5/as7341");
    }

    #[test]
    fn test_development_wins() {
        let endpoint = SensorEndpoint::resolve(true, Some("http://10.0.0.5/")).unwrap();
        assert_eq!(endpoint.url().as_str(), "http://esp32-as7341.local/as7341");
    }

    #[test]
    fn test_led_off_url() {
        let endpoint = SensorEndpoint::development().unwrap();
        let url = endpoint.request_url(&SensorRequest::LedOff);
        assert_eq!(url.as_str(), "http://esp32-as7341.local/as7341?led_ma=0");
    }

    #[test]
    fn test_garbage_origin_rejected() {
        assert!(matches!(
            SensorEndpoint::from_origin("not a url"),
            Err(SensorError::InvalidUrl(_))
        ));
    }
}
