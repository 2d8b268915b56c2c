//! Number mask rasterized from a built-in 5x7 digit font.
//!
//! A fixed bitmap font keeps the mask identical on every platform; no
//! system fonts are consulted.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Glyph rows top to bottom; bit 4 is the leftmost column.
const DIGITS: [[u8; GLYPH_HEIGHT as usize]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Mask value for lit pixels.
pub const LIT: u8 = 255;

/// Renders `number` (0..=99) centered on a `size` x `size` mask.
///
/// Lit pixels are [`LIT`], everything else 0. Glyph cells are `size / 16`
/// pixels square with one empty column between digits.
#[must_use]
pub fn number_mask(number: u8, size: u32) -> GrayImage {
    let mut mask = GrayImage::new(size, size);
    let digits = if number >= 10 {
        vec![number / 10 % 10, number % 10]
    } else {
        vec![number]
    };

    let cell = (size / 16).max(1);
    let count = if digits.len() == 2 { 2 } else { 1 };
    let columns = GLYPH_WIDTH * count + (count - 1);
    let origin_x = i64::from(size / 2) - i64::from(columns * cell / 2);
    let origin_y = i64::from(size / 2) - i64::from(GLYPH_HEIGHT * cell / 2);

    for (slot, &digit) in (0i64..).zip(&digits) {
        let glyph_x = origin_x + slot * i64::from((GLYPH_WIDTH + 1) * cell);
        for (row, bits) in (0i64..).zip(DIGITS[usize::from(digit)]) {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x = glyph_x + i64::from(col * cell);
                let y = origin_y + row * i64::from(cell);
                if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
                    draw_filled_rect_mut(&mut mask, Rect::at(x, y).of_size(cell, cell), Luma([LIT]));
                }
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == LIT).count()
    }

    #[test]
    fn test_mask_is_binary_and_sized() {
        let mask = number_mask(42, 400);
        assert_eq!(mask.dimensions(), (400, 400));
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == LIT));
        assert!(lit(&mask) > 0);
    }

    #[test]
    fn test_digits_differ() {
        assert_ne!(number_mask(12, 200), number_mask(17, 200));
        assert_ne!(number_mask(8, 200), number_mask(88, 200));
    }

    #[test]
    fn test_mask_is_centered() {
        let mask = number_mask(88, 400);
        let (mut min_x, mut max_x) = (u32::MAX, 0);
        for (x, _, p) in mask.enumerate_pixels() {
            if p.0[0] == LIT {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
        let left = min_x;
        let right = 399 - max_x;
        assert!(left.abs_diff(right) <= 25, "left {left} right {right}");
    }

    #[test]
    fn test_single_digit_lit_area() {
        // "1" has 10 lit cells of 25x25 at size 400.
        assert_eq!(lit(&number_mask(1, 400)), 10 * 25 * 25);
    }
}
