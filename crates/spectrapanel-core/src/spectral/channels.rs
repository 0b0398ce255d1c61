//! Channel catalogue and reading extraction
//!
//! The labels must match the strings the sensor firmware uses as JSON keys.

use palette::Srgb;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of visible-light channels (F1-F8)
pub const VISIBLE_CHANNEL_COUNT: usize = 8;

/// Labels of the visible channels, violet to red
pub const VISIBLE_CHANNELS: [&str; VISIBLE_CHANNEL_COUNT] = [
    "415nm", "445nm", "480nm", "515nm", "555nm", "590nm", "630nm", "680nm",
];

/// Label of the broadband channel
pub const CLEAR_CHANNEL: &str = "clear";

/// Label of the near-infrared channel
pub const NIR_CHANNEL: &str = "nir";

// F1-F8 wavelengths converted to RGB via
// https://academo.org/demos/wavelength-to-colour-relationship/
const VISIBLE_BAR_COLORS: [&str; VISIBLE_CHANNEL_COUNT] = [
    "#7600ED", "#0028FF", "#00D5FF", "#1FFF00", "#B3FF00", "#FFDF00", "#FF4F00", "#FF0000",
];

const CLEAR_BAR_COLOR: &str = "#FFFFFF";
const NIR_BAR_COLOR: &str = "#800000";

/// Errors raised while interpreting a decoded response
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    /// A channel label is absent from the response
    #[error("Response is missing channel '{0}'")]
    MissingChannel(String),

    #[error("Channel '{label}' is not numeric: {value}")]
    /// A channel holds something other than a number
    InvalidChannel {
        /// Channel label
        label: String,
        /// Offending value as JSON
        value: String,
    },

    /// The response is valid JSON but not an object
    #[error("Response is not a JSON object")]
    NotAnObject,
}

/// Which channels the sensor firmware reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSet {
    /// F1-F8 only
    #[default]
    Visible,
    /// F1-F8 plus the clear channel
    Clear,
    /// F1-F8 plus the near-infrared channel
    Nir,
}

impl ChannelSet {
    /// The extra channel after F1-F8, if any
    pub fn extra_channel(&self) -> Option<&'static str> {
        match self {
            ChannelSet::Visible => None,
            ChannelSet::Clear => Some(CLEAR_CHANNEL),
            ChannelSet::Nir => Some(NIR_CHANNEL),
        }
    }

    /// All channel labels in chart order
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = VISIBLE_CHANNELS.to_vec();
        labels.extend(self.extra_channel());
        labels
    }

    /// Number of channels in this set
    pub fn len(&self) -> usize {
        VISIBLE_CHANNEL_COUNT + usize::from(self.extra_channel().is_some())
    }

    /// Always false; every set holds at least the visible channels
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bar colors in chart order
    pub fn bar_colors(&self) -> Vec<Srgb<u8>> {
        let mut hex: Vec<&str> = VISIBLE_BAR_COLORS.to_vec();
        match self {
            ChannelSet::Visible => {}
            ChannelSet::Clear => hex.push(CLEAR_BAR_COLOR),
            ChannelSet::Nir => hex.push(NIR_BAR_COLOR),
        }
        hex.into_iter()
            .map(|h| Srgb::from_str(h).unwrap_or_else(|_| Srgb::new(0, 0, 0)))
            .collect()
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSet::Visible => write!(f, "visible"),
            ChannelSet::Clear => write!(f, "clear"),
            ChannelSet::Nir => write!(f, "nir"),
        }
    }
}

impl FromStr for ChannelSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visible" => Ok(ChannelSet::Visible),
            "clear" => Ok(ChannelSet::Clear),
            "nir" => Ok(ChannelSet::Nir),
            other => Err(format!("unknown channel set '{other}'")),
        }
    }
}

/// The JSON object returned by the sensor, kept verbatim
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReading(Map<String, Value>);

impl RawReading {
    /// Wrap decoded fields
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a decoded value, rejecting anything but an object
    pub fn from_value(value: Value) -> Result<Self, ReadingError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(ReadingError::NotAnObject),
        }
    }

    /// All fields in response order
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Field by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Every field that holds a number, in response order
    pub fn numeric_fields(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0
            .iter()
            .filter_map(|(key, value)| numeric_value(value).map(|v| (key.as_str(), v)))
    }

    /// Indented JSON for the raw output panel
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| format!("{:?}", self.0))
    }
}

impl From<Map<String, Value>> for RawReading {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Interpret a JSON value as a number
///
/// Numeric strings are accepted because some firmware builds quote values.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Channel intensities picked out of a raw reading, in chart order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralReading {
    labels: Vec<&'static str>,
    values: Vec<f64>,
}

impl SpectralReading {
    /// Extract the channels of `set` from a raw reading
    pub fn from_raw(raw: &RawReading, set: ChannelSet) -> Result<Self, ReadingError> {
        let labels = set.labels();
        let mut values = Vec::with_capacity(labels.len());

        for label in &labels {
            let value = raw
                .get(label)
                .ok_or_else(|| ReadingError::MissingChannel(label.to_string()))?;
            let number = numeric_value(value).ok_or_else(|| ReadingError::InvalidChannel {
                label: label.to_string(),
                value: value.to_string(),
            })?;
            values.push(number);
        }

        Ok(Self { labels, values })
    }

    /// Channel labels in chart order
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    /// Channel values in chart order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of channels
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no channel was extracted
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels_per_set() {
        assert_eq!(ChannelSet::Visible.labels().len(), 8);
        assert_eq!(ChannelSet::Nir.labels().last(), Some(&"nir"));
        assert_eq!(ChannelSet::Clear.len(), 9);
    }

    #[test]
    fn test_bar_colors_parse() {
        let colors = ChannelSet::Visible.bar_colors();
        assert_eq!(colors[0], Srgb::new(0x76, 0x00, 0xED));
        assert_eq!(colors[7], Srgb::new(0xFF, 0x00, 0x00));
    }

    #[test]
    fn test_missing_channel_is_reported() {
        let raw = RawReading::from_value(json!({"415nm": 1, "445nm": 2})).unwrap();
        let err = SpectralReading::from_raw(&raw, ChannelSet::Visible).unwrap_err();
        assert_eq!(err, ReadingError::MissingChannel("480nm".to_string()));
    }

    #[test]
    fn test_non_numeric_channel_is_reported() {
        let raw = RawReading::from_value(json!({
            "415nm": 1, "445nm": 2, "480nm": "abc", "515nm": 4,
            "555nm": 5, "590nm": 6, "630nm": 7, "680nm": 8,
        }))
        .unwrap();
        let err = SpectralReading::from_raw(&raw, ChannelSet::Visible).unwrap_err();
        assert_eq!(
            err,
            ReadingError::InvalidChannel {
                label: "480nm".to_string(),
                value: "\"abc\"".to_string(),
            }
        );

        let raw = RawReading::from_value(json!({
            "415nm": 1, "445nm": 2, "480nm": 3, "515nm": 4,
            "555nm": 5, "590nm": 6, "630nm": 7, "680nm": 8, "nir": true,
        }))
        .unwrap();
        let err = SpectralReading::from_raw(&raw, ChannelSet::Nir).unwrap_err();
        assert_eq!(err.to_string(), "Channel 'nir' is not numeric: true");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        assert_eq!(numeric_value(&json!("42")), Some(42.0));
        assert_eq!(numeric_value(&json!("ok")), None);
        assert_eq!(numeric_value(&json!(true)), None);
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            RawReading::from_value(json!([1, 2, 3])),
            Err(ReadingError::NotAnObject)
        );
    }
}
