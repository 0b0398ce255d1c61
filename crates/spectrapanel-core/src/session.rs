//! Spectral Session
//!
//! Holds the state that survives between reads: acquisition parameters,
//! the active normalization curve and the one-shot "use the next reading as
//! reference" flag. Reference changes only take effect on the next reading.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::acquisition::AcquisitionParameters;
use crate::spectral::{
    detect_saturation, estimate_hue, ChannelSet, DisplayColor, NormalizationCurve, RawReading,
    ReadingError, ReferenceMode, SaturationStatus, SpectralReading,
};

/// Everything the renderer needs for one reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedReading {
    /// Channel values as reported by the sensor
    pub reading: SpectralReading,
    /// Normalized values, largest channel at 1.0
    pub display: Vec<f64>,
    /// Estimated perceived color
    #[serde(skip)]
    pub color: DisplayColor,
    /// Saturation check result
    pub status: SaturationStatus,
    /// Count at which a channel was considered saturated
    pub saturation_threshold: u64,
    /// The response exactly as received
    pub raw: RawReading,
    /// Whether this reading replaced the normalization curve
    pub recalibrated: bool,
    /// When the response was processed
    pub taken_at: DateTime<Utc>,
}

/// Per-panel processing state
#[derive(Debug, Clone)]
pub struct SpectralSession {
    parameters: AcquisitionParameters,
    channel_set: ChannelSet,
    reference_mode: ReferenceMode,
    curve: NormalizationCurve,
    recalibrate_on_next_read: bool,
}

impl Default for SpectralSession {
    fn default() -> Self {
        Self::new(AcquisitionParameters::default(), ChannelSet::default())
    }
}

impl SpectralSession {
    /// Create a session normalized against sunlight
    pub fn new(parameters: AcquisitionParameters, channel_set: ChannelSet) -> Self {
        Self {
            parameters,
            channel_set,
            reference_mode: ReferenceMode::Sunlight,
            curve: NormalizationCurve::sunlight(channel_set),
            recalibrate_on_next_read: false,
        }
    }

    /// Start in the given reference mode
    pub fn with_reference(mut self, mode: ReferenceMode) -> Self {
        self.set_reference(mode);
        self
    }

    /// Parameters used for the next request
    pub fn parameters(&self) -> &AcquisitionParameters {
        &self.parameters
    }

    /// Replace the acquisition parameters
    pub fn set_parameters(&mut self, parameters: AcquisitionParameters) {
        debug!(?parameters, "acquisition parameters changed");
        self.parameters = parameters;
    }

    /// Channels extracted from each response
    pub fn channel_set(&self) -> ChannelSet {
        self.channel_set
    }

    /// Switch channel sets; the curve is rebuilt for the new length
    pub fn set_channel_set(&mut self, channel_set: ChannelSet) {
        if channel_set == self.channel_set {
            return;
        }
        self.channel_set = channel_set;
        self.curve = match self.reference_mode {
            ReferenceMode::Direct => NormalizationCurve::direct(channel_set),
            ReferenceMode::Sunlight | ReferenceMode::Live => {
                NormalizationCurve::sunlight(channel_set)
            }
        };
    }

    /// Active normalization reference
    pub fn reference_mode(&self) -> ReferenceMode {
        self.reference_mode
    }

    /// Active normalization curve
    pub fn curve(&self) -> &NormalizationCurve {
        &self.curve
    }

    /// True until the next successful reading has been taken as reference
    pub fn is_calibration_pending(&self) -> bool {
        self.recalibrate_on_next_read
    }

    /// Use the hard-coded sunlight reference
    pub fn use_sunlight_reference(&mut self) {
        self.set_reference(ReferenceMode::Sunlight);
    }

    /// Show sensor data without compensation
    pub fn use_direct_reference(&mut self) {
        self.set_reference(ReferenceMode::Direct);
    }

    /// Treat the next reading as the new reference
    pub fn calibrate_on_next_read(&mut self) {
        self.set_reference(ReferenceMode::Live);
    }

    fn set_reference(&mut self, mode: ReferenceMode) {
        self.reference_mode = mode;
        match mode {
            ReferenceMode::Sunlight => {
                self.curve = NormalizationCurve::sunlight(self.channel_set);
                self.recalibrate_on_next_read = false;
            }
            ReferenceMode::Direct => {
                self.curve = NormalizationCurve::direct(self.channel_set);
                self.recalibrate_on_next_read = false;
            }
            ReferenceMode::Live => self.recalibrate_on_next_read = true,
        }
        info!(reference = %mode, "normalization reference changed");
    }

    /// Interpret one sensor response
    ///
    /// A failed extraction leaves a pending calibration armed.
    pub fn process(&mut self, raw: RawReading) -> Result<ProcessedReading, ReadingError> {
        let reading = SpectralReading::from_raw(&raw, self.channel_set)?;

        let recalibrated = self.recalibrate_on_next_read;
        if recalibrated {
            self.curve = NormalizationCurve::recompute(reading.values());
            self.recalibrate_on_next_read = false;
            info!(curve = ?self.curve.multipliers(), "normalization curve taken from reading");
        }

        let display = self.curve.normalize(reading.values());
        let color = estimate_hue(&display);

        let saturation_threshold = self.parameters.saturation_threshold();
        let status = detect_saturation(&raw, saturation_threshold);
        if status.is_saturated() {
            debug!(saturation_threshold, "reading saturated");
        }

        Ok(ProcessedReading {
            reading,
            display,
            color,
            status,
            saturation_threshold,
            raw,
            recalibrated,
            taken_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat_raw(value: u32) -> RawReading {
        RawReading::from_value(json!({
            "415nm": value, "445nm": value, "480nm": value, "515nm": value,
            "555nm": value, "590nm": value, "630nm": value, "680nm": value,
        }))
        .unwrap()
    }

    #[test]
    fn test_calibration_flag_is_one_shot() {
        let mut session = SpectralSession::default();
        session.calibrate_on_next_read();
        assert!(session.is_calibration_pending());

        let first = session.process(flat_raw(100)).unwrap();
        assert!(first.recalibrated);
        assert!(!session.is_calibration_pending());

        let second = session.process(flat_raw(50)).unwrap();
        assert!(!second.recalibrated);
    }

    #[test]
    fn test_failed_read_keeps_calibration_pending() {
        let mut session = SpectralSession::default();
        session.calibrate_on_next_read();
        let bad = RawReading::from_value(json!({"415nm": 1})).unwrap();
        assert!(session.process(bad).is_err());
        assert!(session.is_calibration_pending());
    }

    #[test]
    fn test_channel_set_change_resizes_curve() {
        let mut session = SpectralSession::default();
        session.set_channel_set(ChannelSet::Clear);
        assert_eq!(session.curve().len(), 9);
    }
}
