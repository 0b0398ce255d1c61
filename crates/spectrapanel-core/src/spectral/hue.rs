//! Perceived color estimate
//!
//! Each visible channel is mapped to the RGB value of its center wavelength
//! (https://academo.org/demos/wavelength-to-colour-relationship/):
//!
//! | nm  | R   | G   | B   |
//! |-----|-----|-----|-----|
//! | 415 | 118 | 0   | 237 |
//! | 445 | 0   | 40  | 255 |
//! | 480 | 0   | 213 | 255 |
//! | 515 | 31  | 255 | 0   |
//! | 555 | 179 | 255 | 0   |
//! | 590 | 255 | 223 | 0   |
//! | 630 | 255 | 79  | 0   |
//! | 680 | 255 | 0   | 0   |
//!
//! Summed per component that gives R=1093 G=1065 B=747, so the blue-heavy
//! channels are under-represented. Scaling 415, 445 and 480nm by hand-tuned
//! factors brings the three sums within 1% of each other.
//!
//! This is a crude approximation of human-perceived color. Accurate rendering
//! would start from the CIE 1931 color space, which is out of scope here.

use palette::Srgb;

use super::channels::VISIBLE_CHANNEL_COUNT;

/// Estimated display color of a reading
pub type DisplayColor = Srgb<u8>;

const SPECTRAL_RGB: [[f64; 3]; VISIBLE_CHANNEL_COUNT] = [
    [118.0, 0.0, 237.0],
    [0.0, 40.0, 255.0],
    [0.0, 213.0, 255.0],
    [31.0, 255.0, 0.0],
    [179.0, 255.0, 0.0],
    [255.0, 223.0, 0.0],
    [255.0, 79.0, 0.0],
    [255.0, 0.0, 0.0],
];

const CORRECTION: [f64; VISIBLE_CHANNEL_COUNT] = [1.72, 1.6, 1.4, 1.0, 1.0, 1.0, 1.0, 1.0];

/// Blend visible channel intensities into an RGB triple
///
/// Only the first eight values are used; a trailing clear/NIR channel is
/// ignored. The brightest component always maps to 255. A reading with no
/// light at all yields black.
pub fn estimate_hue(readings: &[f64]) -> DisplayColor {
    let mut working = [0.0f64; 3];

    for ((reading, rgb), correction) in readings.iter().zip(&SPECTRAL_RGB).zip(&CORRECTION) {
        for (acc, component) in working.iter_mut().zip(rgb) {
            *acc += reading * component * correction;
        }
    }

    let color_max = working.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if color_max.is_nan() || color_max <= 0.0 {
        return Srgb::new(0, 0, 0);
    }

    let [r, g, b] = working.map(|x| (x * 255.0 / color_max).floor() as u8);
    Srgb::new(r, g, b)
}

/// CSS `rgb()` notation
pub fn css_rgb(color: DisplayColor) -> String {
    format!("rgb({}, {}, {})", color.red, color.green, color.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_red_channel() {
        let mut readings = [0.0; 8];
        readings[7] = 1.0;
        assert_eq!(estimate_hue(&readings), Srgb::new(255, 0, 0));
    }

    #[test]
    fn test_dark_reading_is_black() {
        assert_eq!(estimate_hue(&[0.0; 8]), Srgb::new(0, 0, 0));
    }

    #[test]
    fn test_css_notation() {
        assert_eq!(css_rgb(Srgb::new(1, 2, 3)), "rgb(1, 2, 3)");
    }
}
