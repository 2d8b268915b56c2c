//! sRGB transfer functions and relative luminance.
//!
//! All channel values are normalized to `[0, 1]`. "Encoded" means the
//! gamma-compressed value stored in an 8-bit pixel, "linear" means light
//! intensity.

use serde::Serialize;

use crate::domain::Color;

/// Rec. 709 luminance weights for linear R, G and B.
const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Converts an encoded sRGB channel to linear light.
#[must_use]
pub fn encoded_to_linear(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts a linear channel back to encoded sRGB.
#[must_use]
pub fn linear_to_encoded(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear value of an 8-bit channel.
#[must_use]
pub fn channel_to_linear(v: u8) -> f64 {
    encoded_to_linear(f64::from(v) / 255.0)
}

/// Quantizes a linear value to an 8-bit channel, clamping to the gamut.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn linear_to_channel(linear: f64) -> u8 {
    let encoded = linear_to_encoded(linear.clamp(0.0, 1.0));
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Relative luminance of a color, in `[0, 1]`.
#[must_use]
pub fn luminance(color: Color) -> f64 {
    color
        .channels()
        .iter()
        .zip(LUMA_WEIGHTS)
        .map(|(&c, w)| w * channel_to_linear(c))
        .sum()
}

/// Green channel that gives `(r, g, b)` the target luminance.
///
/// When no green value in range reaches the target the linear green is
/// clamped to `[0, 1]`, so the result is the closest reachable value.
#[must_use]
pub fn solve_green_for_luminance(r: u8, b: u8, target: f64) -> u8 {
    let rest = LUMA_WEIGHTS[0] * channel_to_linear(r) + LUMA_WEIGHTS[2] * channel_to_linear(b);
    let green_linear = (target - rest) / LUMA_WEIGHTS[1];
    if !(0.0..=1.0).contains(&green_linear) {
        tracing::trace!(green_linear, "target luminance out of reach, clamping green");
    }
    linear_to_channel(green_linear)
}

/// Adjusts the green channel of `fg` so its luminance matches `bg`.
///
/// Red and blue are left untouched.
#[must_use]
pub fn match_luminance(fg: Color, bg: Color) -> Color {
    fg.with_green(solve_green_for_luminance(fg.r, fg.b, luminance(bg)))
}

/// Luminance of a foreground/background pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LuminanceReport {
    /// Foreground luminance.
    pub luminance_fg: f64,
    /// Background luminance.
    pub luminance_bg: f64,
    /// Absolute difference.
    pub luminance_delta: f64,
}

impl LuminanceReport {
    /// Measures a color pair.
    #[must_use]
    pub fn new(fg: Color, bg: Color) -> Self {
        let luminance_fg = luminance(fg);
        let luminance_bg = luminance(bg);
        Self {
            luminance_fg,
            luminance_bg,
            luminance_delta: (luminance_fg - luminance_bg).abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_within_tolerance() {
        for i in 0..=1000 {
            let c = f64::from(i) / 1000.0;
            let back = linear_to_encoded(encoded_to_linear(c));
            assert!((back - c).abs() < 1e-6, "round trip drifted at {c}: {back}");
        }
    }

    #[test]
    fn test_extremes() {
        assert!(luminance(Color::new(0, 0, 0)).abs() < 1e-12);
        assert!((luminance(Color::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_green_dominates_luminance() {
        assert!(luminance(Color::new(0, 255, 0)) > luminance(Color::new(255, 0, 0)));
        assert!(luminance(Color::new(255, 0, 0)) > luminance(Color::new(0, 0, 255)));
    }

    #[test]
    fn test_match_luminance_keeps_red_and_blue() {
        let fg = Color::new(175, 115, 145);
        let bg = Color::new(145, 145, 145);
        let matched = match_luminance(fg, bg);
        assert_eq!(matched.r, fg.r);
        assert_eq!(matched.b, fg.b);
        // One 8-bit green step moves luminance by well under 0.005.
        assert!((luminance(matched) - luminance(bg)).abs() < 0.005);
    }

    #[test]
    fn test_unreachable_target_clamps() {
        assert_eq!(solve_green_for_luminance(255, 255, 0.0), 0);
        assert_eq!(solve_green_for_luminance(0, 0, 1.5), 255);
    }

    #[test]
    fn test_report_delta_is_absolute() {
        let report = LuminanceReport::new(Color::new(10, 10, 10), Color::WHITE);
        assert!(report.luminance_delta > 0.0);
        assert!((report.luminance_delta - (report.luminance_bg - report.luminance_fg)).abs() < 1e-12);
    }
}
