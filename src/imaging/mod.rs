//! Frame-level image work in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` → 8-bit RGB |
//! | **Rotate** | `image::imageops::rotate270` |
//! | **Resize to fit** | Lanczos3, letterboxed on black |
//! | **Sequence badge** | rounded rect + `rusttype` text |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and badge math (unit testable)
//! - **Draw / Text**: Raster primitives and font handling shared with the footer
//! - **Backend**: [`ThumbnailProducer`] trait + [`RustProducer`]

pub mod backend;
pub mod calculations;
pub mod draw;
pub mod rust_backend;
pub mod text;

pub use backend::{ProducerError, ThumbnailProducer};
pub use rust_backend::{
    RustProducer, is_supported_image, load_image, orient_for_format, supported_input_extensions,
};
pub use text::{FontSet, Typeface};
