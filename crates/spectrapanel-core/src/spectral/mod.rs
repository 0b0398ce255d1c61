//! Spectral Processing
//!
//! Turns a raw AS7341 response into chart-ready values:
//! channel extraction, normalization, saturation check and color estimate.

pub mod channels;
pub mod hue;
pub mod normalization;
pub mod saturation;

pub use channels::{
    numeric_value, ChannelSet, RawReading, ReadingError, SpectralReading, VISIBLE_CHANNELS,
    VISIBLE_CHANNEL_COUNT,
};
pub use hue::{css_rgb, estimate_hue, DisplayColor};
pub use normalization::{
    rescale_to_unit_max, NormalizationCurve, ReferenceMode, SUNLIGHT_REFERENCE,
};
pub use saturation::{detect_saturation, saturation_threshold, SaturationStatus};
