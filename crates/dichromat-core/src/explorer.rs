//! Parameter explorer: dot plates with caller-tuned colors, sizes and noise.
//!
//! The foreground is a fixed ring rather than a number, so images differ
//! only in the perceptual parameters under study.

use std::f64::consts::TAU;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbImage;
use imageproc::drawing::draw_filled_circle_mut;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::colorimetry::LuminanceReport;
use crate::domain::{Color, Dichromacy};
use crate::encode::encode_png;
use crate::error::{CoreError, Result};
use crate::plate::clip_to_circle;
use crate::simulate::simulate_image;

/// Edge length of explorer images.
pub const EXPLORER_IMAGE_SIZE: u32 = 500;

const MARGIN: u32 = 10;
const MIN_DOTS: usize = 100;
const MAX_DOTS: usize = 5000;
const ATTEMPTS_PER_DOT: usize = 10;
const DOT_SIZE_MIN: f64 = 3.0;
const DOT_SIZE_MAX: f64 = 50.0;
const SEPARATION: f64 = 0.8;
const RING_INNER: f64 = 0.3;
const RING_OUTER: f64 = 0.7;
/// ChaCha stream for noise draws, independent of placement.
const NOISE_STREAM: u64 = 1;

/// Tunable explorer inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerParams {
    /// Ring dot color.
    #[serde(rename = "fg_rgb")]
    pub fg: Color,
    /// Background dot color.
    #[serde(rename = "bg_rgb")]
    pub bg: Color,
    /// Mean dot diameter, 6 to 40.
    pub circle_mean_size: f64,
    /// Relative standard deviation of the diameter, 0 to 0.60.
    pub circle_size_variance: f64,
    /// Mean grayscale noise, -0.08 to 0.08.
    pub noise_offset: f64,
    /// Standard deviation of the grayscale noise, 0 to 0.25.
    pub noise_variance: f64,
    /// Fraction of the canvas to cover, 0.10 to 0.60.
    pub pattern_density: f64,
    /// Dichromacy to simulate on the finished image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulate: Option<Dichromacy>,
    /// Seed; drawn at random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ExplorerParams {
    fn default() -> Self {
        PRESETS[0].params
    }
}

fn check_range(parameter: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidParameter {
            parameter: parameter.to_string(),
            value: format!("{value} (expected {min} to {max})"),
        })
    }
}

impl ExplorerParams {
    /// Checks every numeric field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        check_range("circle_mean_size", self.circle_mean_size, 6.0, 40.0)?;
        check_range("circle_size_variance", self.circle_size_variance, 0.0, 0.60)?;
        check_range("noise_offset", self.noise_offset, -0.08, 0.08)?;
        check_range("noise_variance", self.noise_variance, 0.0, 0.25)?;
        check_range("pattern_density", self.pattern_density, 0.10, 0.60)?;
        Ok(())
    }

    /// Target dot count for an image of `size` pixels square.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn target_dots(&self, size: u32) -> usize {
        let area = f64::from(size) * f64::from(size);
        let n = (self.pattern_density * area / (self.circle_mean_size * self.circle_mean_size)) as usize;
        n.clamp(MIN_DOTS, MAX_DOTS)
    }
}

/// A named starting point for exploration.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Preset {
    /// Display name, also the lookup key.
    pub name: &'static str,
    /// What the preset is for.
    pub description: &'static str,
    /// The parameters.
    pub params: ExplorerParams,
}

const fn preset_params(
    fg: Color,
    circle_mean_size: f64,
    circle_size_variance: f64,
    noise_variance: f64,
    pattern_density: f64,
) -> ExplorerParams {
    ExplorerParams {
        fg,
        bg: Color::new(145, 145, 145),
        circle_mean_size,
        circle_size_variance,
        noise_offset: 0.0,
        noise_variance,
        pattern_density,
        simulate: None,
        seed: None,
    }
}

/// Built-in presets. The first is also [`ExplorerParams::default`].
pub const PRESETS: [Preset; 4] = [
    Preset {
        name: "Neutral Baseline",
        description: "Recommended starting point for exploration",
        params: preset_params(Color::new(150, 120, 140), 20.0, 0.30, 0.08, 0.25),
    },
    Preset {
        name: "R-High G-Low",
        description: "High red, low green - targets deutans",
        params: preset_params(Color::new(175, 115, 145), 18.0, 0.35, 0.12, 0.22),
    },
    Preset {
        name: "R-Low G-High",
        description: "Low red, high green - alternative deutan target",
        params: preset_params(Color::new(125, 165, 145), 22.0, 0.25, 0.10, 0.28),
    },
    Preset {
        name: "High Noise Challenge",
        description: "Higher noise for harder detection",
        params: preset_params(Color::new(165, 125, 140), 16.0, 0.40, 0.18, 0.20),
    },
];

/// Looks up a preset by name, ignoring case.
#[must_use]
pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// A placed dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    /// Center column.
    pub x: i32,
    /// Center row.
    pub y: i32,
    /// Diameter in pixels.
    pub size: f64,
    /// Whether the center falls in the foreground ring.
    pub foreground: bool,
    /// Grayscale offset added to every channel.
    pub noise: i32,
}

impl Dot {
    /// Whether a candidate dot sits too close to this one.
    #[must_use]
    pub fn collides(&self, x: i32, y: i32, size: f64) -> bool {
        let dx = f64::from(x - self.x);
        let dy = f64::from(y - self.y);
        let min_distance = (size + self.size) / 2.0 * SEPARATION;
        dx * dx + dy * dy < min_distance * min_distance
    }
}

/// Dots placed for one image.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Dots in drawing order.
    pub dots: Vec<Dot>,
    /// Count placement aimed for.
    pub target: usize,
    /// Candidates tried.
    pub attempts: usize,
}

fn normal(parameter: &str, mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| CoreError::InvalidParameter {
        parameter: parameter.to_string(),
        value: e.to_string(),
    })
}

/// Places dots by rejection sampling.
///
/// Stops at the target count or after ten attempts per target dot;
/// a partial fill is a normal outcome.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameter`] if a distribution cannot be built
/// from the parameters.
#[allow(clippy::cast_possible_truncation)]
pub fn place_dots(params: &ExplorerParams, size: u32, seed: u64) -> Result<Placement> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut noise_rng = ChaCha8Rng::seed_from_u64(seed);
    noise_rng.set_stream(NOISE_STREAM);

    let size_dist = normal(
        "circle_size_variance",
        params.circle_mean_size,
        params.circle_mean_size * params.circle_size_variance,
    )?;
    let noise_dist = normal("noise_variance", params.noise_offset, params.noise_variance)?;

    let center = f64::from(size / 2);
    let radius = f64::from(size / 2 - MARGIN);
    let (inner, outer) = (radius * RING_INNER, radius * RING_OUTER);
    let bound = i32::try_from(size).unwrap_or(i32::MAX);

    let target = params.target_dots(size);
    let max_attempts = target * ATTEMPTS_PER_DOT;
    let mut dots: Vec<Dot> = Vec::with_capacity(target);
    let mut attempts = 0;

    while dots.len() < target && attempts < max_attempts {
        attempts += 1;

        let angle = rng.random_range(0.0..TAU);
        let r = rng.random_range(0.0..radius);
        let x = (center + r * angle.cos()) as i32;
        let y = (center + r * angle.sin()) as i32;
        let dot_size = size_dist.sample(&mut rng).clamp(DOT_SIZE_MIN, DOT_SIZE_MAX);

        if !(0..bound).contains(&x) || !(0..bound).contains(&y) {
            continue;
        }
        if dots.iter().any(|d| d.collides(x, y, dot_size)) {
            continue;
        }

        let distance = (f64::from(x) - center).hypot(f64::from(y) - center);
        let foreground = (inner..=outer).contains(&distance);
        let noise = (noise_dist.sample(&mut noise_rng) * 255.0) as i32;
        dots.push(Dot {
            x,
            y,
            size: dot_size,
            foreground,
            noise,
        });
    }

    tracing::debug!(placed = dots.len(), target, attempts, "explorer dots placed");
    Ok(Placement {
        dots,
        target,
        attempts,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shift(color: Color, noise: i32) -> Color {
    color
        .channels()
        .map(|c| (i32::from(c) + noise).clamp(0, 255) as u8)
        .into()
}

/// An explorer image with its measurements.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerImage {
    /// Encoded PNG.
    #[serde(skip)]
    pub png: Vec<u8>,
    /// The PNG as standard base64.
    pub image_base64: String,
    /// Foreground luminance, rounded to 4 places.
    pub luminance_fg: f64,
    /// Background luminance, rounded to 4 places.
    pub luminance_bg: f64,
    /// Absolute luminance difference, rounded to 4 places.
    pub luminance_delta: f64,
    /// Seed that reproduces this image.
    pub seed: u64,
    /// Dots actually drawn.
    pub dots_placed: usize,
    /// Dots placement aimed for.
    pub target_dots: usize,
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Renders the raster for `params` with a fixed seed.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameter`] if validation fails.
#[allow(clippy::cast_possible_truncation)]
pub fn render_image(params: &ExplorerParams, seed: u64) -> Result<(RgbImage, Placement)> {
    params.validate()?;
    let size = EXPLORER_IMAGE_SIZE;
    let placement = place_dots(params, size, seed)?;

    let mut canvas = RgbImage::from_pixel(size, size, Color::WHITE.into());
    for dot in &placement.dots {
        let base = if dot.foreground { params.fg } else { params.bg };
        let radius = (dot.size / 2.0).round() as i32;
        draw_filled_circle_mut(&mut canvas, (dot.x, dot.y), radius, shift(base, dot.noise).into());
    }
    clip_to_circle(
        &mut canvas,
        f64::from(size / 2),
        f64::from(size / 2 - MARGIN),
    );

    if let Some(dichromacy) = params.simulate {
        canvas = simulate_image(&canvas, dichromacy);
    }
    Ok((canvas, placement))
}

/// Generates an encoded explorer image.
///
/// Without a seed in `params` one is drawn and reported in the result.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameter`] for out-of-range parameters and
/// [`CoreError::Encode`] if PNG encoding fails.
pub fn generate(params: &ExplorerParams) -> Result<ExplorerImage> {
    let seed = params.seed.unwrap_or_else(rand::random);
    let (canvas, placement) = render_image(params, seed)?;
    let png = encode_png(&canvas)?;
    let report = LuminanceReport::new(params.fg, params.bg);

    Ok(ExplorerImage {
        image_base64: STANDARD.encode(&png),
        png,
        luminance_fg: round4(report.luminance_fg),
        luminance_bg: round4(report.luminance_bg),
        luminance_delta: round4(report.luminance_delta),
        seed,
        dots_placed: placement.dots.len(),
        target_dots: placement.target,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> ExplorerParams {
        ExplorerParams {
            seed: Some(seed),
            ..ExplorerParams::default()
        }
    }

    #[test]
    fn test_defaults_match_baseline_preset() {
        let p = ExplorerParams::default();
        assert_eq!(p.fg, Color::new(150, 120, 140));
        assert_eq!(p.bg, Color::new(145, 145, 145));
        assert!((p.circle_mean_size - 20.0).abs() < f64::EPSILON);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_all_presets_valid() {
        for preset in &PRESETS {
            assert!(preset.params.validate().is_ok(), "{}", preset.name);
        }
        assert_eq!(preset("high noise challenge").unwrap().params.noise_variance, 0.18);
        assert!(preset("missing").is_none());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad = [
            ExplorerParams { circle_mean_size: 5.0, ..ExplorerParams::default() },
            ExplorerParams { circle_size_variance: 0.7, ..ExplorerParams::default() },
            ExplorerParams { noise_offset: -0.1, ..ExplorerParams::default() },
            ExplorerParams { noise_variance: 0.3, ..ExplorerParams::default() },
            ExplorerParams { pattern_density: 0.05, ..ExplorerParams::default() },
            ExplorerParams { pattern_density: f64::NAN, ..ExplorerParams::default() },
        ];
        for params in bad {
            assert!(matches!(
                params.validate(),
                Err(CoreError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_target_dot_count_clamped() {
        let mut p = ExplorerParams::default();
        assert_eq!(p.target_dots(500), 156);
        p.circle_mean_size = 40.0;
        p.pattern_density = 0.10;
        assert_eq!(p.target_dots(500), MIN_DOTS);
        p.circle_mean_size = 6.0;
        p.pattern_density = 0.60;
        assert_eq!(p.target_dots(500), 4166);
    }

    #[test]
    fn test_placement_is_collision_free() {
        for preset in &PRESETS {
            let placement = place_dots(&preset.params, EXPLORER_IMAGE_SIZE, 7).unwrap();
            assert!(!placement.dots.is_empty());
            assert!(placement.dots.len() <= placement.target);
            assert!(placement.attempts <= placement.target * ATTEMPTS_PER_DOT);
            for (i, a) in placement.dots.iter().enumerate() {
                assert!((DOT_SIZE_MIN..=DOT_SIZE_MAX).contains(&a.size));
                for b in &placement.dots[i + 1..] {
                    assert!(!a.collides(b.x, b.y, b.size), "{a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_dense_small_dots_stop_at_attempt_cap() {
        let params = ExplorerParams {
            circle_mean_size: 6.0,
            circle_size_variance: 0.0,
            pattern_density: 0.60,
            ..ExplorerParams::default()
        };
        let placement = place_dots(&params, EXPLORER_IMAGE_SIZE, 1).unwrap();
        assert!(placement.attempts <= placement.target * ATTEMPTS_PER_DOT);
    }

    #[test]
    fn test_ring_foreground() {
        let placement = place_dots(&ExplorerParams::default(), EXPLORER_IMAGE_SIZE, 3).unwrap();
        let radius = f64::from(EXPLORER_IMAGE_SIZE / 2 - MARGIN);
        for dot in &placement.dots {
            let d = (f64::from(dot.x) - 250.0).hypot(f64::from(dot.y) - 250.0);
            assert_eq!(dot.foreground, (radius * 0.3..=radius * 0.7).contains(&d));
        }
        assert!(placement.dots.iter().any(|d| d.foreground));
        assert!(placement.dots.iter().any(|d| !d.foreground));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate(&seeded(42)).unwrap();
        let b = generate(&seeded(42)).unwrap();
        assert_eq!(a.png, b.png);
        assert_eq!(a.seed, 42);
        assert_ne!(a.png, generate(&seeded(43)).unwrap().png);
    }

    #[test]
    fn test_unseeded_generation_reports_seed() {
        let params = ExplorerParams::default();
        let first = generate(&params).unwrap();
        let replay = generate(&seeded(first.seed)).unwrap();
        assert_eq!(first.png, replay.png);
    }

    #[test]
    fn test_base64_and_luminance() {
        let img = generate(&seeded(1)).unwrap();
        assert_eq!(STANDARD.decode(&img.image_base64).unwrap(), img.png);
        let report = LuminanceReport::new(Color::new(150, 120, 140), Color::new(145, 145, 145));
        assert!((img.luminance_fg - report.luminance_fg).abs() < 1e-4);
        assert!((img.luminance_delta - (img.luminance_fg - img.luminance_bg).abs()).abs() < 2e-4);
    }

    #[test]
    fn test_simulation_pass_changes_pixels() {
        let plain = render_image(&seeded(5), 5).unwrap().0;
        let params = ExplorerParams {
            simulate: Some(Dichromacy::Tritanopia),
            ..seeded(5)
        };
        let sim = render_image(&params, 5).unwrap().0;
        assert_eq!(sim, simulate_image(&plain, Dichromacy::Tritanopia));
        assert_ne!(sim, plain);
    }

    #[test]
    fn test_generate_rejects_invalid_params() {
        let params = ExplorerParams {
            circle_mean_size: 100.0,
            ..seeded(1)
        };
        assert!(generate(&params).is_err());
    }
}
