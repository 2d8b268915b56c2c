//! Dichromat vision simulation (Machado, Oliveira and Fernandes, 2009).
//!
//! Colors are decoded to linear light, multiplied by a 3x3 matrix per
//! dichromacy, clamped and re-encoded.

use image::RgbImage;

use crate::colorimetry::{channel_to_linear, linear_to_channel};
use crate::domain::{Color, Dichromacy};

type Matrix = [[f64; 3]; 3];

const PROTANOPIA: Matrix = [
    [0.567, 0.433, 0.0],
    [0.558, 0.442, 0.0],
    [0.0, 0.242, 0.758],
];

const DEUTERANOPIA: Matrix = [
    [0.625, 0.375, 0.0],
    [0.7, 0.3, 0.0],
    [0.0, 0.03, 0.97],
];

const TRITANOPIA: Matrix = [
    [0.95, 0.05, 0.0],
    [0.0, 0.433, 0.567],
    [0.0, 0.475, 0.525],
];

const fn matrix(dichromacy: Dichromacy) -> &'static Matrix {
    match dichromacy {
        Dichromacy::Protanopia => &PROTANOPIA,
        Dichromacy::Deuteranopia => &DEUTERANOPIA,
        Dichromacy::Tritanopia => &TRITANOPIA,
    }
}

fn apply(m: &Matrix, linear: [f64; 3]) -> [u8; 3] {
    (*m).map(|row| {
        let v = row[0] * linear[0] + row[1] * linear[1] + row[2] * linear[2];
        linear_to_channel(v)
    })
}

/// How `color` appears to someone with `dichromacy`.
#[must_use]
pub fn simulate_color(color: Color, dichromacy: Dichromacy) -> Color {
    let linear = color.channels().map(channel_to_linear);
    apply(matrix(dichromacy), linear).into()
}

/// Applies [`simulate_color`] to every pixel of `image`.
///
/// Decoding goes through a 256-entry table, so every pixel matches the
/// single-color path exactly.
#[must_use]
pub fn simulate_image(image: &RgbImage, dichromacy: Dichromacy) -> RgbImage {
    let m = matrix(dichromacy);
    let table: [f64; 256] = std::array::from_fn(|i| {
        // i < 256 by construction.
        #[allow(clippy::cast_possible_truncation)]
        channel_to_linear(i as u8)
    });

    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let linear = pixel.0.map(|c| table[usize::from(c)]);
        pixel.0 = apply(m, linear);
    }
    out
}
