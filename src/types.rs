//! Shared image types passed between pipeline stages.
//!
//! Decoded sources flow from [`session`](crate::session) intake into the
//! [`compose`](crate::compose) stage, which turns each one into a
//! [`NumberedThumbnail`] before placing it on the sheet.

use image::RgbImage;
use std::path::{Path, PathBuf};

/// A decoded input image, always 8-bit RGB.
///
/// Owned by the session; the compositor only ever borrows it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// File the image was decoded from.
    pub path: PathBuf,
    pub image: RgbImage,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, image: RgbImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A cell-sized thumbnail stamped with its 1-based sequence number.
#[derive(Debug, Clone)]
pub struct NumberedThumbnail {
    pub image: RgbImage,
    /// Position in input order, starting at 1.
    pub number: u32,
}
