//! Demo Mode - Simulated AS7341 for testing
//!
//! Answers requests the way the ESP32 firmware does, without hardware.
//! Simulates daylight falling on the sensor plus an optional white LED,
//! scaled by integration time and gain and clipped at the count the
//! registers can hold.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use crate::acquisition::{gain_multiplier, SensorRequest, DEFAULT_ASTEP, DEFAULT_ATIME};
use crate::protocol::{SensorClient, SensorError};
use crate::spectral::{saturation_threshold, ChannelSet, RawReading, SUNLIGHT_REFERENCE};

/// Integration steps at which [`SUNLIGHT_REFERENCE`] was captured
const REFERENCE_STEPS: f64 = ((DEFAULT_ATIME + 1) * (DEFAULT_ASTEP + 1)) as f64;

/// Gain at which [`SUNLIGHT_REFERENCE`] was captured
const REFERENCE_GAIN: f64 = 512.0;

/// Counts per mA of LED current at the reference settings (F1-F8)
///
/// Phosphor white LED: blue pump peak plus a broad yellow hump.
const LED_SPECTRUM: [f64; 8] = [40.0, 520.0, 180.0, 210.0, 330.0, 350.0, 240.0, 90.0];

/// Simulated sensor board
#[derive(Debug)]
pub struct DemoSensor {
    channel_set: ChannelSet,
    /// Fraction of full sunlight reaching the sensor
    ambient: f64,
    /// Relative noise amplitude
    noise: f64,
    rng: Mutex<StdRng>,
    led_on: AtomicBool,
    requests: AtomicUsize,
}

impl Default for DemoSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSensor {
    /// Create a simulator with random noise
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a reproducible simulator
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            channel_set: ChannelSet::Visible,
            ambient: 0.2,
            noise: 0.02,
            rng: Mutex::new(rng),
            led_on: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    /// Report an extra clear or NIR channel
    pub fn channel_set(mut self, channel_set: ChannelSet) -> Self {
        self.channel_set = channel_set;
        self
    }

    /// Fraction of full sunlight, 0.0 for a dark room
    pub fn ambient(mut self, ambient: f64) -> Self {
        self.ambient = ambient.max(0.0);
        self
    }

    /// Relative noise amplitude, 0.0 for exact values
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise.max(0.0);
        self
    }

    /// Whether the simulated LED is currently lit
    pub fn is_led_on(&self) -> bool {
        self.led_on.load(Ordering::Relaxed)
    }

    /// Number of requests answered so far, LED-off requests included
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// Channel counts for the given settings, in chart order
    pub fn simulate(&self, atime: u32, astep: u32, gain: u32, led_ma: u32) -> Vec<f64> {
        let steps = (f64::from(atime) + 1.0) * (f64::from(astep) + 1.0);
        let scale = steps / REFERENCE_STEPS * gain_multiplier(gain) / REFERENCE_GAIN;
        let ceiling = saturation_threshold(atime, astep) as f64;

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let mut jitter = |value: f64| {
            if self.noise > 0.0 {
                value * (1.0 + rng.gen_range(-self.noise..=self.noise))
            } else {
                value
            }
        };

        let mut counts: Vec<f64> = SUNLIGHT_REFERENCE
            .iter()
            .zip(LED_SPECTRUM)
            .map(|(sun, led)| {
                let light = sun * self.ambient + led * f64::from(led_ma);
                jitter(light * scale).round().clamp(0.0, ceiling)
            })
            .collect();

        if self.channel_set.extra_channel().is_some() {
            let visible_sum: f64 = counts.iter().sum();
            let extra = match self.channel_set {
                ChannelSet::Clear => visible_sum / 2.5,
                _ => visible_sum / 12.0,
            };
            counts.push(jitter(extra).round().clamp(0.0, ceiling));
        }

        counts
    }

    fn to_json(&self, counts: &[f64]) -> RawReading {
        let mut fields = Map::new();
        for (label, count) in self.channel_set.labels().iter().zip(counts) {
            fields.insert(label.to_string(), Value::from(*count as u64));
        }
        RawReading::new(fields)
    }
}

impl SensorClient for DemoSensor {
    async fn fetch_reading(&self, request: &SensorRequest) -> Result<RawReading, SensorError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match *request {
            SensorRequest::Read {
                atime,
                astep,
                gain,
                led_ma,
                led_stay_on,
            } => {
                let counts = self.simulate(atime, astep, gain, led_ma);
                self.led_on.store(led_ma > 0 && led_stay_on, Ordering::Relaxed);
                Ok(self.to_json(&counts))
            }
            SensorRequest::LedOff => {
                self.led_on.store(false, Ordering::Relaxed);
                Ok(RawReading::default())
            }
        }
    }

    async fn switch_led_off(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.led_on.store(false, Ordering::Relaxed);
    }
}
