//! Film format catalog.
//!
//! Each supported film format fixes the geometry of its frames: the frame
//! aspect ratio, how many frames sit on one row of the sheet, how many
//! frames a roll usually holds, and whether scans should be turned to match
//! the format's orientation.
//!
//! | Id | Name | Frame (w:h) | Per row | Roll | Orientation | Rotate |
//! |----|------|-------------|---------|------|-------------|--------|
//! | `35mm-full` | 35mm Full | 3:2 | 6 | 36 | landscape | yes |
//! | `35mm-half` | 35mm Half | 2:3 | 12 | 72 | portrait | yes |
//! | `120-6x6` | 120mm 6x6 | 1:1 | 3 | 12 | square | no |
//! | `120-6x4.5` | 120mm 6x4.5 | 4.5:6 | 3 | 16 | portrait | yes |
//! | `120-6x7` | 120mm 6x7 | 7:6 | 3 | 10 | landscape | yes |
//! | `120-6x8` | 120mm 6x8 | 8:6 | 3 | 9 | landscape | yes |
//! | `120-6x9` | 120mm 6x9 | 9:6 | 3 | 8 | landscape | yes |
//! | `127-4x4` | 127mm 4x4 | 1:1 | 3 | 12 | square | no |
//!
//! The catalog is an immutable value built once ([`Catalog::standard`]) and
//! handed to consumers by reference. There is no global instance.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unknown film format: {0}")]
    UnknownFormat(String),
}

/// Frame orientation a format expects its scans in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    /// Classify pixel dimensions. Equal sides count as square.
    pub fn of(width: u32, height: u32) -> Self {
        use std::cmp::Ordering;
        match width.cmp(&height) {
            Ordering::Greater => Orientation::Landscape,
            Ordering::Less => Orientation::Portrait,
            Ordering::Equal => Orientation::Square,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Square => "square",
        }
    }
}

/// Fixed layout rules for one film format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatSpec {
    /// Stable identifier used on the command line.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Frame aspect ratio as `(width, height)`. Not necessarily integral (6x4.5).
    pub aspect_ratio: (f64, f64),
    /// Number of cells on one row of the sheet. Always > 0.
    pub images_per_row: u32,
    /// Frames on a typical roll. Advisory only.
    pub max_images: Option<u32>,
    pub orientation: Orientation,
    /// Turn scans whose orientation disagrees with [`Self::orientation`].
    pub force_rotation: bool,
}

impl FormatSpec {
    /// Whether an image of the given size should be rotated a quarter turn
    /// before it is placed in a cell of this format.
    ///
    /// Only a strict mismatch rotates: a portrait scan on a landscape format
    /// or a landscape scan on a portrait format. Square scans and square
    /// formats never rotate.
    pub fn needs_rotation(&self, width: u32, height: u32) -> bool {
        if !self.force_rotation {
            return false;
        }
        matches!(
            (self.orientation, Orientation::of(width, height)),
            (Orientation::Landscape, Orientation::Portrait)
                | (Orientation::Portrait, Orientation::Landscape)
        )
    }

    /// Format the aspect ratio compactly, e.g. `3:2` or `4.5:6`.
    pub fn aspect_label(&self) -> String {
        format!("{}:{}", self.aspect_ratio.0, self.aspect_ratio.1)
    }
}

/// Read-only table of every supported format, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    formats: Vec<FormatSpec>,
}

impl Catalog {
    /// The built-in film formats.
    pub fn standard() -> Self {
        let spec = |id, name, aspect_ratio, images_per_row, max_images, orientation, rotate| {
            FormatSpec {
                id,
                name,
                aspect_ratio,
                images_per_row,
                max_images: Some(max_images),
                orientation,
                force_rotation: rotate,
            }
        };
        use Orientation::*;
        Self {
            formats: vec![
                spec("35mm-full", "35mm Full", (3.0, 2.0), 6, 36, Landscape, true),
                spec("35mm-half", "35mm Half", (2.0, 3.0), 12, 72, Portrait, true),
                spec("120-6x6", "120mm 6x6", (1.0, 1.0), 3, 12, Square, false),
                spec("120-6x4.5", "120mm 6x4.5", (4.5, 6.0), 3, 16, Portrait, true),
                spec("120-6x7", "120mm 6x7", (7.0, 6.0), 3, 10, Landscape, true),
                spec("120-6x8", "120mm 6x8", (8.0, 6.0), 3, 9, Landscape, true),
                spec("120-6x9", "120mm 6x9", (9.0, 6.0), 3, 8, Landscape, true),
                spec("127-4x4", "127mm 4x4", (1.0, 1.0), 3, 12, Square, false),
            ],
        }
    }

    /// Look a format up by id or display name (case-insensitive).
    pub fn get(&self, id: &str) -> Result<&FormatSpec, FormatError> {
        let wanted = id.trim();
        self.formats
            .iter()
            .find(|f| f.id.eq_ignore_ascii_case(wanted) || f.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FormatError::UnknownFormat(id.to_string()))
    }

    /// Selection for a new session: the first entry, 35mm full frame.
    pub fn default_format(&self) -> &FormatSpec {
        &self.formats[0]
    }

    /// All formats in display order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatSpec> {
        self.formats.iter()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.iter().map(|f| f.id).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
