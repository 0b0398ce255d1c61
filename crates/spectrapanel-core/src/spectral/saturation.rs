//! Saturation detection
//!
//! Overexposed results are either skewed or outright nonsensical, so any
//! field at the maximum count for the current integration settings flags
//! the whole reading.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::channels::RawReading;
use crate::acquisition::MAX_SENSOR_COUNT;

/// Outcome of the saturation check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaturationStatus {
    /// Every field below the threshold
    Ok,
    /// At least one field at or above the threshold
    Saturated,
}

impl SaturationStatus {
    /// True for [`SaturationStatus::Saturated`]
    pub fn is_saturated(&self) -> bool {
        matches!(self, SaturationStatus::Saturated)
    }

    /// Status line shown under the chart
    pub fn message(&self) -> &'static str {
        match self {
            SaturationStatus::Ok => "Sensor data OK",
            SaturationStatus::Saturated => "Sensor saturation (overexposure) detected",
        }
    }
}

impl fmt::Display for SaturationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Largest count a channel can report for the given integration settings
pub fn saturation_threshold(atime: u32, astep: u32) -> u64 {
    (u64::from(atime) + 1)
        .saturating_mul(u64::from(astep) + 1)
        .min(MAX_SENSOR_COUNT)
}

/// Check every numeric field of the raw reading against `threshold`
///
/// Non-numeric fields are skipped.
pub fn detect_saturation(raw: &RawReading, threshold: u64) -> SaturationStatus {
    let threshold = threshold as f64;
    if raw.numeric_fields().any(|(_, value)| value >= threshold) {
        SaturationStatus::Saturated
    } else {
        SaturationStatus::Ok
    }
}
