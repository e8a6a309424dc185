//! # Contact Sheet
//!
//! Lays out scanned film frames as a numbered contact sheet: a grid of
//! thumbnails sized for the film format, on a page of fixed aspect ratio, with
//! a footer band carrying the roll's details. Sheets export to JPEG, PNG or a
//! paged PDF with their print resolution recorded.
//!
//! # Architecture: Layout Then Paint
//!
//! ```text
//! 1. Intake     files/dirs   →  sorted paths → decoded RGB sources
//! 2. Layout     count+format →  SheetLayout  (pure integer math)
//! 3. Compose    sources      →  Sheet        (thumbnails, grid, footer)
//! 4. Export     Sheet        →  .jpg / .png / .pdf
//! ```
//!
//! Layout never looks at pixels: [`layout::compute_layout`] is a pure
//! function of the image count, the [`formats::FormatSpec`] and the
//! [`layout::Geometry`] derived from config, so every size on the sheet can be
//! tested (and printed by `contact-sheet plan`) without decoding anything.
//! The per-frame pixel work sits behind the [`imaging::ThumbnailProducer`]
//! trait, which the compositor's tests replace with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `SheetConfig`: every physical constant as a TOML option, stock defaults, merging, validation |
//! | [`formats`] | The film format catalog |
//! | [`layout`] | Cell size, grid, minimum canvas, ratio fit and A4 clamp |
//! | [`metadata`] | The six footer fields and the labelled lines built from them |
//! | [`imaging`] | Decoding, rotation, resize-to-fit, sequence badges, fonts and raster primitives |
//! | [`compose`] | Grid placement and the footer band |
//! | [`export`] | JPEG / PNG / PDF writers with DPI metadata |
//! | [`session`] | The in-memory document: image list, metadata, format, last sheet |
//! | [`types`] | Image values passed between stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Physical Units
//!
//! All sizes are specified in millimetres or points and converted once at the
//! configured DPI (`round(mm × dpi / 25.4)`, `round(pt × dpi / 72)`). At the
//! default 300 dpi a sheet is at most 2480×3508 px and prints at A4 without
//! resampling.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and resampling use the `image` crate, text uses `rusttype`, and
//! PDF output uses `lopdf`. Fonts are looked up among common system files;
//! when none is available a built-in bitmap face keeps the sheet readable
//! and the output deterministic.
//!
//! ## Silent Boundary Behaviour
//!
//! Two situations degrade rather than fail: a canvas larger than the maximum
//! page is clamped to it (rows that would reach the footer are left out), and
//! a film line that would cross the bottom margin is left out. Both are
//! logged at `warn`.

pub mod compose;
pub mod config;
pub mod export;
pub mod formats;
pub mod imaging;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
