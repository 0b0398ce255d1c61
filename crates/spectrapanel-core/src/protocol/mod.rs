//! Sensor Protocol
//!
//! Implements the HTTP interface of the ESP32 AS7341 firmware.
//!
//! A reading is a single GET against `/as7341` with the acquisition
//! parameters in the query string; the reply is a JSON object keyed by
//! channel label.

mod client;
mod endpoint;
mod error;

pub use client::{HttpSensorClient, SensorClient, DEFAULT_REQUEST_TIMEOUT};
pub use endpoint::{SensorEndpoint, DEVELOPMENT_HOST, SENSOR_PATH};
pub use error::SensorError;
