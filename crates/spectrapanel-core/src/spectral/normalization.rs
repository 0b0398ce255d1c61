//! Normalization curves
//!
//! Not all sensor channels respond the same way. A curve holds one multiplier
//! per channel so that every channel reads the same value when shown a
//! reference light, usually something to be treated as white.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::channels::ChannelSet;

/// Spectral curve captured from natural sunlight (F1-F8)
pub const SUNLIGHT_REFERENCE: [f64; 8] = [
    5749.0, 6342.0, 9533.0, 10746.0, 11245.0, 12577.0, 12633.0, 15217.0,
];

/// Where the active curve comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    /// Hard-coded sunlight reference
    #[default]
    Sunlight,
    /// All ones, sensor data shown unscaled
    Direct,
    /// The next reading becomes the reference
    Live,
}

impl fmt::Display for ReferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceMode::Sunlight => write!(f, "sunlight"),
            ReferenceMode::Direct => write!(f, "direct"),
            ReferenceMode::Live => write!(f, "live"),
        }
    }
}

impl FromStr for ReferenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sunlight" => Ok(ReferenceMode::Sunlight),
            "direct" => Ok(ReferenceMode::Direct),
            "live" | "current" => Ok(ReferenceMode::Live),
            other => Err(format!("unknown reference mode '{other}'")),
        }
    }
}

/// Per-channel compensation multipliers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationCurve {
    multipliers: Vec<f64>,
}

impl NormalizationCurve {
    /// Multipliers that bring every channel of `reference` up to its maximum
    ///
    /// A zero entry yields an infinite multiplier for that channel.
    pub fn recompute(reference: &[f64]) -> Self {
        let reference_max = max_value(reference);
        Self {
            multipliers: reference.iter().map(|x| reference_max / x).collect(),
        }
    }

    /// Curve derived from the sunlight reference
    ///
    /// An extra clear/NIR channel gets a neutral multiplier of one.
    pub fn sunlight(set: ChannelSet) -> Self {
        let mut reference = SUNLIGHT_REFERENCE.to_vec();
        if set.extra_channel().is_some() {
            reference.push(max_value(&SUNLIGHT_REFERENCE));
        }
        Self::recompute(&reference)
    }

    /// Identity curve
    pub fn direct(set: ChannelSet) -> Self {
        Self::recompute(&vec![1.0; set.len()])
    }

    /// Per-channel factors in chart order
    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    /// Number of channels covered
    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    /// True for a curve without channels
    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    /// Multiply each channel by its compensation factor
    pub fn apply(&self, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .zip(&self.multipliers)
            .map(|(value, multiplier)| value * multiplier)
            .collect()
    }

    /// Apply the curve, then rescale so the largest channel is 1.0
    pub fn normalize(&self, raw: &[f64]) -> Vec<f64> {
        rescale_to_unit_max(&self.apply(raw))
    }
}

/// Divide every value by the largest one
///
/// A reading without any positive value is returned as is.
pub fn rescale_to_unit_max(values: &[f64]) -> Vec<f64> {
    let max = max_value(values);
    if max > 0.0 {
        values.iter().map(|x| x / max).collect()
    } else {
        values.to_vec()
    }
}

pub(crate) fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
