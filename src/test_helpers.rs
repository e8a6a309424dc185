//! Shared test utilities: synthetic images and files on disk.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_jpeg(&tmp.path().join("01.jpg"), 600, 400);
//!
//! let frames = sources(&[(600, 400), (400, 600)]);
//! assert_eq!(frames[1].path(), std::path::Path::new("frame-02.jpg"));
//! ```

use crate::types::SourceImage;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

// =========================================================================
// In-memory images
// =========================================================================

/// A smooth colour ramp, so resizes and rotations are visible in pixels.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        Rgb([r, g, 128])
    })
}

/// Decoded sources with the given sizes, named `frame-01.jpg`, `frame-02.jpg`, ...
pub fn sources(sizes: &[(u32, u32)]) -> Vec<SourceImage> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            SourceImage::new(
                PathBuf::from(format!("frame-{:02}.jpg", i + 1)),
                gradient_image(w, h),
            )
        })
        .collect()
}

// =========================================================================
// Files on disk
// =========================================================================

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// Container inspection
// =========================================================================

/// Read `(units, x_density, y_density)` from a JPEG's JFIF APP0 segment.
pub fn jfif_density(bytes: &[u8]) -> Option<(u8, u16, u16)> {
    let start = bytes.windows(5).position(|w| w == b"JFIF\0")?;
    // identifier(5) + version(2), then units, Xdensity, Ydensity
    let d = bytes.get(start + 7..start + 12)?;
    Some((
        d[0],
        u16::from_be_bytes([d[1], d[2]]),
        u16::from_be_bytes([d[3], d[4]]),
    ))
}
