//! Panel configuration
//!
//! Stored as pretty-printed JSON, by default in
//! `<config dir>/spectrapanel/config.json`. Every field is optional in the
//! file; missing ones take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::acquisition::{
    AcquisitionParameters, DEFAULT_ASTEP, DEFAULT_ATIME, DEFAULT_GAIN_EXPONENT,
};
use crate::protocol::{SensorEndpoint, SensorError, DEFAULT_REQUEST_TIMEOUT};
use crate::spectral::{ChannelSet, ReferenceMode};

/// Config file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Errors while loading or saving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Failed to access config file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON for this structure
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Where and how to reach the sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Origin serving the sensor endpoint, e.g. `http://192.168.1.40/`
    pub origin: Option<String>,
    /// Talk to the development board via mDNS instead of `origin`
    ///
    /// Unset means development mode exactly when no origin is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub development: Option<bool>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            origin: None,
            development: None,
            timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SensorSettings {
    /// Whether requests go to the development board
    pub fn is_development(&self) -> bool {
        self.development.unwrap_or(self.origin.is_none())
    }

    /// Endpoint the settings point at
    pub fn endpoint(&self) -> Result<SensorEndpoint, SensorError> {
        SensorEndpoint::resolve(self.is_development(), self.origin.as_deref())
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Initial acquisition settings, LED current as entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    /// ATIME register
    pub atime: u32,
    /// ASTEP register
    pub astep: u32,
    /// Gain as a power of two
    pub gain_exponent: u32,
    /// LED current in mA, coerced when converted
    pub led_current_ma: u32,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            atime: DEFAULT_ATIME,
            astep: DEFAULT_ASTEP,
            gain_exponent: DEFAULT_GAIN_EXPONENT,
            led_current_ma: 0,
        }
    }
}

impl AcquisitionSettings {
    /// Parameters the session starts with
    pub fn to_parameters(&self) -> AcquisitionParameters {
        AcquisitionParameters::new(
            self.atime,
            self.astep,
            self.gain_exponent,
            self.led_current_ma,
        )
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Sensor location and timeout
    pub sensor: SensorSettings,
    /// Initial acquisition settings
    pub acquisition: AcquisitionSettings,
    /// Channels reported by the firmware
    pub channels: ChannelSet,
    /// Initial normalization reference
    pub reference: ReferenceMode,
}

impl PanelConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("spectrapanel").join(CONFIG_FILE_NAME))
    }

    /// Load from a file that must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly given file, or the default file if present
    ///
    /// Falls back to defaults only when no path was given and the default
    /// file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(io_err)
    }
}
