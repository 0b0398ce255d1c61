//! # SpectraPanel Core Library
//!
//! Core functionality for the SpectraPanel AS7341 control panel.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Translation of acquisition registers (ATIME, ASTEP, gain, LED current)
//! - HTTP communication with the ESP32 sensor firmware
//! - Channel normalization against sunlight, identity or a live reference
//! - Saturation detection and a perceived color estimate
//! - A read loop controller with continuous mode
//!
//! ## Example
//!
//! ```rust,ignore
//! use spectrapanel_core::prelude::*;
//!
//! let endpoint = SensorEndpoint::development()?;
//! let client = HttpSensorClient::new(endpoint, DEFAULT_REQUEST_TIMEOUT)?;
//!
//! let mut session = SpectralSession::default();
//! let request = session.parameters().to_request(false);
//! let raw = client.fetch_reading(&request).await?;
//! let processed = session.process(raw)?;
//! println!("{} {}", css_rgb(processed.color), processed.status);
//! ```

pub mod acquisition;
pub mod config;
pub mod demo;
pub mod panel;
pub mod protocol;
pub mod session;
pub mod spectral;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::acquisition::{AcquisitionParameters, ParameterSummary, SensorRequest};
    pub use crate::config::{ConfigError, PanelConfig};
    pub use crate::demo::DemoSensor;
    pub use crate::panel::{PanelCommand, PanelController, PanelEvent, ResultSink};
    pub use crate::protocol::{
        HttpSensorClient, SensorClient, SensorEndpoint, SensorError, DEFAULT_REQUEST_TIMEOUT,
    };
    pub use crate::session::{ProcessedReading, SpectralSession};
    pub use crate::spectral::{
        css_rgb, ChannelSet, DisplayColor, NormalizationCurve, RawReading, ReferenceMode,
        SaturationStatus, SpectralReading,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
