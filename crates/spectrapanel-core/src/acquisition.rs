//! Acquisition Parameters
//!
//! Translates the raw register settings of the AS7341 into physical units
//! and builds the query for the sensor endpoint:
//! - Integration time: ATIME/ASTEP → milliseconds (datasheet 10.2.2)
//! - Gain: exponent → multiplier
//! - LED drive current: raw mA → effective mA (values under 4 mA switch the LED off)

use serde::{Deserialize, Serialize};

/// ASTEP used when the front end does not expose it.
/// (3596+1) * 2.78us = 9.99966ms, close enough to 10ms.
pub const DEFAULT_ASTEP: u32 = 3596;

/// Default ATIME register value
pub const DEFAULT_ATIME: u32 = 29;

/// Default gain exponent (2^9 = 512X)
pub const DEFAULT_GAIN_EXPONENT: u32 = 9;

/// Lowest current the LED driver can sustain
pub const MIN_LED_CURRENT_MA: u32 = 4;

/// Integration step of the sensor in microseconds
pub const INTEGRATION_STEP_US: f64 = 2.78;

/// Fixed overhead added to the displayed read time
pub const READ_OVERHEAD_MS: u64 = 50;

/// Largest count the 16-bit ADC registers can hold
pub const MAX_SENSOR_COUNT: u64 = 65535;

/// Sensor acquisition settings as entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionParameters {
    /// ATIME register
    pub atime: u32,
    /// ASTEP register
    pub astep: u32,
    /// Gain as a power of two
    pub gain_exponent: u32,
    /// Effective LED current, already coerced
    pub led_current_ma: u32,
}

impl Default for AcquisitionParameters {
    fn default() -> Self {
        Self::new(DEFAULT_ATIME, DEFAULT_ASTEP, DEFAULT_GAIN_EXPONENT, 0)
    }
}

impl AcquisitionParameters {
    /// Create parameters, coercing the LED current to the hardware minimum
    pub fn new(atime: u32, astep: u32, gain_exponent: u32, led_current_raw: u32) -> Self {
        Self {
            atime,
            astep,
            gain_exponent,
            led_current_ma: effective_led_current(led_current_raw),
        }
    }

    /// Replace the LED current, applying the same coercion as [`Self::new`]
    pub fn with_led_current(mut self, led_current_raw: u32) -> Self {
        self.led_current_ma = effective_led_current(led_current_raw);
        self
    }

    /// Single-pass integration time in milliseconds
    pub fn exposure_time_ms(&self) -> u64 {
        exposure_time_ms(self.atime, self.astep)
    }

    /// Time for a full read of all channels in milliseconds
    pub fn total_read_time_ms(&self) -> u64 {
        total_read_time_ms(self.atime, self.astep)
    }

    /// Gain multiplier applied by the sensor
    pub fn gain_multiplier(&self) -> f64 {
        gain_multiplier(self.gain_exponent)
    }

    /// Count at which a channel is considered saturated
    pub fn saturation_threshold(&self) -> u64 {
        crate::spectral::saturation_threshold(self.atime, self.astep)
    }

    /// Build the request descriptor for a read
    ///
    /// `repeat` asks the sensor to keep the LED on between successive reads.
    pub fn to_request(&self, repeat: bool) -> SensorRequest {
        SensorRequest::Read {
            atime: self.atime,
            astep: self.astep,
            gain: self.gain_exponent,
            led_ma: self.led_current_ma,
            led_stay_on: repeat,
        }
    }

    /// Compact labels shown next to the input controls
    pub fn summary(&self) -> ParameterSummary {
        ParameterSummary {
            exposure_time_ms: self.exposure_time_ms(),
            total_read_time_ms: self.total_read_time_ms(),
            gain_multiplier: self.gain_multiplier(),
            led_current_ma: self.led_current_ma,
        }
    }

    /// Long description of the exposure, naming both registers
    pub fn exposure_description(&self) -> String {
        format!(
            "Exposure time of {}ms from atime={} and astep={}",
            self.exposure_time_ms(),
            self.atime,
            self.astep
        )
    }
}

/// Integration time formula from datasheet 10.2.2
pub fn exposure_time_ms(atime: u32, astep: u32) -> u64 {
    let steps = (1.0 + f64::from(atime)) * (1.0 + f64::from(astep));
    (steps * INTEGRATION_STEP_US / 1000.0).round() as u64
}

/// Read time as displayed to the user
///
/// All channels are read in two passes (F1-F4, then F5-F8) plus overhead.
pub fn total_read_time_ms(atime: u32, astep: u32) -> u64 {
    exposure_time_ms(atime, astep) * 2 + READ_OVERHEAD_MS
}

/// Convert a gain exponent to its multiplier
pub fn gain_multiplier(gain_exponent: u32) -> f64 {
    2f64.powf(f64::from(gain_exponent))
}

/// LED current actually driven for a requested value
pub fn effective_led_current(led_current_raw: u32) -> u32 {
    if led_current_raw < MIN_LED_CURRENT_MA {
        0
    } else {
        led_current_raw
    }
}

/// Derived values for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSummary {
    /// Single-pass integration time
    pub exposure_time_ms: u64,
    /// Both passes plus overhead
    pub total_read_time_ms: u64,
    /// Gain as a plain multiplier
    pub gain_multiplier: f64,
    /// LED current after coercion
    pub led_current_ma: u32,
}

impl ParameterSummary {
    /// `Time: 650ms`
    pub fn time_label(&self) -> String {
        format!("Time: {}ms", self.total_read_time_ms)
    }

    /// `Gain: 512X`
    pub fn gain_label(&self) -> String {
        format!("Gain: {}X", self.gain_multiplier)
    }

    /// `Current: 12mA`
    pub fn current_label(&self) -> String {
        format!("Current: {}mA", self.led_current_ma)
    }
}

/// A request to the sensor endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRequest {
    /// Full acquisition with the given settings
    Read {
        /// ATIME register
        atime: u32,
        /// ASTEP register
        astep: u32,
        /// Gain exponent
        gain: u32,
        /// LED current, 0 for off
        led_ma: u32,
        /// Leave the LED lit after the read
        led_stay_on: bool,
    },
    /// Switch the illumination off without caring about the reply
    LedOff,
}

impl SensorRequest {
    /// Query parameters in the order the firmware documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match *self {
            SensorRequest::Read {
                atime,
                astep,
                gain,
                led_ma,
                led_stay_on,
            } => {
                let mut pairs = vec![
                    ("atime", atime.to_string()),
                    ("astep", astep.to_string()),
                    ("gain", gain.to_string()),
                    ("led_ma", led_ma.to_string()),
                ];
                if led_stay_on {
                    pairs.push(("led_stay_on", "1".to_string()));
                }
                pairs
            }
            SensorRequest::LedOff => vec![("led_ma", "0".to_string())],
        }
    }

    /// Whether this request keeps the LED lit afterwards
    pub fn keeps_led_on(&self) -> bool {
        matches!(
            self,
            SensorRequest::Read {
                led_stay_on: true,
                ..
            }
        )
    }
}
