use palette::Srgb;
use spectrapanel_core::spectral::{css_rgb, estimate_hue};

#[test]
fn test_scale_invariance() {
    let readings = [0.3, 0.5, 0.9, 1.0, 0.8, 0.6, 0.4, 0.2];
    let base = estimate_hue(&readings);

    for factor in [0.25, 2.0, 8.0, 1024.0] {
        let scaled: Vec<f64> = readings.iter().map(|r| r * factor).collect();
        assert_eq!(estimate_hue(&scaled), base, "factor {factor}");
    }
}

#[test]
fn test_flat_spectrum_is_near_white() {
    // The correction factors balance the three sums to within 1%
    let color = estimate_hue(&[1.0; 8]);
    assert!(color.red >= 252 && color.green >= 252 && color.blue >= 252, "{color:?}");
}

#[test]
fn test_brightest_component_is_full_scale() {
    let color = estimate_hue(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);
    let max = color.red.max(color.green).max(color.blue);
    assert_eq!(max, 255);
}

#[test]
fn test_blue_channel_alone() {
    let color = estimate_hue(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(color, Srgb::new(0, 40, 255));
}

#[test]
fn test_extra_channel_ignored() {
    let visible = [0.2, 0.4, 0.6, 0.8, 1.0, 0.8, 0.6, 0.4];
    let mut with_nir = visible.to_vec();
    with_nir.push(1.0);
    assert_eq!(estimate_hue(&with_nir), estimate_hue(&visible));
}

#[test]
fn test_css_output() {
    let color = estimate_hue(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(css_rgb(color), "rgb(255, 0, 0)");
}
