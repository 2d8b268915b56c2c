//! Image encoding with fixed settings.
//!
//! Output must be byte-identical for identical rasters, so every encoder
//! parameter is pinned here rather than left to library defaults.

use std::fmt;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Output format for rendered plates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format")]
pub enum PlateFormat {
    /// Lossless PNG, used for serving.
    #[default]
    Png,
    /// Lossy JPEG, only for batch pre-generation.
    Jpeg {
        /// Quality, 1 to 100.
        quality: u8,
    },
}

impl PlateFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpeg",
        }
    }

    /// Returns this format with the JPEG quality replaced; PNG is unchanged.
    #[must_use]
    pub const fn with_quality(self, quality: u8) -> Self {
        match self {
            Self::Png => Self::Png,
            Self::Jpeg { .. } => Self::Jpeg { quality },
        }
    }

    /// Encodes `image` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encode`] if the encoder fails, or
    /// [`CoreError::InvalidParameter`] for a JPEG quality outside 1..=100.
    pub fn encode(self, image: &RgbImage) -> Result<Vec<u8>> {
        match self {
            Self::Png => encode_png(image),
            Self::Jpeg { quality } => encode_jpeg(image, quality),
        }
    }
}

impl fmt::Display for PlateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for PlateFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            }),
            _ => Err(CoreError::InvalidParameter {
                parameter: "format".to_string(),
                value: format!("{s} (expected png or jpeg)"),
            }),
        }
    }
}

/// Encodes an RGB raster as PNG with best compression and adaptive filtering.
///
/// # Errors
///
/// Returns [`CoreError::Encode`] if the encoder fails.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )?;
    Ok(buf)
}

/// Encodes an RGB raster as baseline JPEG.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameter`] for a quality outside 1..=100
/// and [`CoreError::Encode`] if the encoder fails.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(CoreError::InvalidParameter {
            parameter: "jpeg_quality".to_string(),
            value: format!("{quality} (expected 1..=100)"),
        });
    }
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_png_signature_and_stability() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let a = encode_png(&img).unwrap();
        let b = encode_png(&img).unwrap();
        assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(a, b);
    }

    #[test]
    fn test_jpeg_signature() {
        let img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let bytes = PlateFormat::Jpeg { quality: 80 }.encode(&img).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_jpeg_quality_validated() {
        let img = RgbImage::new(2, 2);
        assert!(encode_jpeg(&img, 0).is_err());
        assert!(encode_jpeg(&img, 101).is_err());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<PlateFormat>().unwrap(), PlateFormat::Png);
        assert_eq!(
            "jpg".parse::<PlateFormat>().unwrap(),
            PlateFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY
            }
        );
        assert!("gif".parse::<PlateFormat>().is_err());
        assert_eq!(PlateFormat::Jpeg { quality: 1 }.extension(), "jpeg");
    }
}
