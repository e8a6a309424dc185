//! Pure Rust thumbnail producer.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, BMP) | `image` crate (pure Rust decoders) |
//! | Orientation fix | `image::imageops::rotate270` (90° counter-clockwise) |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Letterbox | `image::imageops::replace` onto a black cell |
//! | Badge text | `rusttype` via [`FontSet`], or the built-in bitmap face |

use super::backend::{ProducerError, ThumbnailProducer};
use super::calculations::{BADGE_RADIUS, badge_rect, center_offset, fit_within};
use super::draw::{BLACK, WHITE, outlined_rounded_rect};
use super::text::FontSet;
use crate::config::TextConfig;
use crate::formats::FormatSpec;
use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageReader, RgbImage};
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has an accepted image extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Load and decode an image from disk as 8-bit RGB.
pub fn load_image(path: &Path) -> Result<RgbImage, ProducerError> {
    let image = ImageReader::open(path)
        .map_err(ProducerError::Io)?
        .with_guessed_format()
        .map_err(ProducerError::Io)?
        .decode()
        .map_err(|e| {
            ProducerError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
    Ok(image.to_rgb8())
}

/// Turn `image` a quarter turn counter-clockwise when its orientation
/// disagrees with the format's. Returns `None` when no rotation is needed.
pub fn orient_for_format(image: &RgbImage, format: &FormatSpec) -> Option<RgbImage> {
    format
        .needs_rotation(image.width(), image.height())
        .then(|| imageops::rotate270(image))
}

/// Pure Rust producer using the `image` crate and `rusttype`.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustProducer {
    fonts: Arc<FontSet>,
    badge_px: f32,
    badge_padding: u32,
}

impl RustProducer {
    pub fn new(fonts: Arc<FontSet>, text: &TextConfig) -> Self {
        Self {
            fonts,
            badge_px: text.badge_px as f32,
            badge_padding: text.badge_padding_px,
        }
    }

    pub fn fonts(&self) -> &Arc<FontSet> {
        &self.fonts
    }
}

impl ThumbnailProducer for RustProducer {
    fn resize_to_fit(
        &self,
        image: &RgbImage,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, ProducerError> {
        if width == 0 || height == 0 {
            return Err(ProducerError::ProcessingFailed(format!(
                "Invalid thumbnail box {width}x{height}"
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(ProducerError::ProcessingFailed("Empty source image".into()));
        }

        let (fit_w, fit_h) = fit_within(image.dimensions(), (width, height));
        let mut cell = RgbImage::from_pixel(width, height, BLACK);
        let (x, y) = center_offset((fit_w, fit_h), (width, height));

        if (fit_w, fit_h) == image.dimensions() {
            imageops::replace(&mut cell, image, x, y);
        } else {
            let scaled = imageops::resize(image, fit_w, fit_h, FilterType::Lanczos3);
            imageops::replace(&mut cell, &scaled, x, y);
        }
        Ok(cell)
    }

    fn overlay_number(
        &self,
        mut thumbnail: RgbImage,
        number: u32,
    ) -> Result<RgbImage, ProducerError> {
        let label = number.to_string();
        let text_size = self.fonts.measure(&label, self.badge_px);
        let rect = badge_rect(text_size, self.badge_padding);

        outlined_rounded_rect(&mut thumbnail, rect, BADGE_RADIUS, WHITE, BLACK);
        let pad = self.badge_padding as i64;
        self.fonts
            .draw(&mut thumbnail, &label, self.badge_px, pad, pad, BLACK);
        Ok(thumbnail)
    }
}
