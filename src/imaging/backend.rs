//! Thumbnail producer trait and shared error type.
//!
//! The [`ThumbnailProducer`] trait is the contract between the compositor and
//! whatever does the pixel work on individual frames:
//!
//! - `resize_to_fit`: scale a source into an exact cell-sized bitmap, keeping
//!   its aspect ratio and letterboxing the remainder in black.
//! - `overlay_number`: stamp a 1-based sequence badge into the top-left corner.
//!
//! The production implementation is
//! [`RustProducer`](super::rust_backend::RustProducer). Tests use the
//! recording mock in this module's `tests` submodule.

use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Per-frame pixel operations used by the compositor.
///
/// Implementations must be `Sync`: thumbnails are produced in parallel.
pub trait ThumbnailProducer: Sync {
    /// Return a bitmap of exactly `width`×`height` holding `image` scaled to
    /// fit and centred, with black fill around it.
    fn resize_to_fit(
        &self,
        image: &RgbImage,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, ProducerError>;

    /// Return `thumbnail` with a numbered badge in its top-left corner.
    fn overlay_number(&self, thumbnail: RgbImage, number: u32) -> Result<RgbImage, ProducerError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::Rgb;
    use std::sync::Mutex;

    /// Mock producer that records operations and returns flat-colour bitmaps.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockProducer {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// When set, `resize_to_fit` fails for sources of this width.
        pub fail_on_width: Option<u32>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        ResizeToFit {
            source: (u32, u32),
            width: u32,
            height: u32,
        },
        OverlayNumber {
            number: u32,
            width: u32,
            height: u32,
        },
    }

    /// Fill colour the mock uses for every thumbnail.
    pub const MOCK_FILL: Rgb<u8> = Rgb([200, 50, 50]);

    impl MockProducer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on_width(width: u32) -> Self {
            Self {
                fail_on_width: Some(width),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ThumbnailProducer for MockProducer {
        fn resize_to_fit(
            &self,
            image: &RgbImage,
            width: u32,
            height: u32,
        ) -> Result<RgbImage, ProducerError> {
            self.operations.lock().unwrap().push(RecordedOp::ResizeToFit {
                source: image.dimensions(),
                width,
                height,
            });
            if self.fail_on_width == Some(image.width()) {
                return Err(ProducerError::ProcessingFailed("mock failure".into()));
            }
            Ok(RgbImage::from_pixel(width, height, MOCK_FILL))
        }

        fn overlay_number(
            &self,
            thumbnail: RgbImage,
            number: u32,
        ) -> Result<RgbImage, ProducerError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::OverlayNumber {
                    number,
                    width: thumbnail.width(),
                    height: thumbnail.height(),
                });
            Ok(thumbnail)
        }
    }

    #[test]
    fn mock_records_resize() {
        let producer = MockProducer::new();
        let source = RgbImage::new(600, 400);

        let thumb = producer.resize_to_fit(&source, 365, 243).unwrap();
        assert_eq!(thumb.dimensions(), (365, 243));

        let ops = producer.get_operations();
        assert_eq!(
            ops,
            vec![RecordedOp::ResizeToFit {
                source: (600, 400),
                width: 365,
                height: 243
            }]
        );
    }

    #[test]
    fn mock_records_overlay() {
        let producer = MockProducer::new();
        let thumb = RgbImage::new(100, 80);
        let out = producer.overlay_number(thumb, 7).unwrap();
        assert_eq!(out.dimensions(), (100, 80));
        assert!(matches!(
            producer.get_operations()[0],
            RecordedOp::OverlayNumber { number: 7, .. }
        ));
    }

    #[test]
    fn mock_can_fail() {
        let producer = MockProducer::failing_on_width(13);
        assert!(producer.resize_to_fit(&RgbImage::new(13, 5), 10, 10).is_err());
        assert!(producer.resize_to_fit(&RgbImage::new(14, 5), 10, 10).is_ok());
    }
}
