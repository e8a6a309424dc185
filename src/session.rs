//! The single in-memory session: images, metadata, format, last sheet.
//!
//! A [`Session`] is what the CLI (or any host application) drives. It holds
//! the input list in sequence order, the footer metadata and the selected
//! format. Any change to those raises the stale flag; a successful
//! [`Session::render`] clears it and keeps the composited [`Sheet`] for
//! [`Session::export`].
//!
//! ## Sequence numbers
//!
//! Adding images de-duplicates by path and re-sorts the whole list by file
//! name (stable). The position in that list, starting at 1, is the number
//! stamped on each thumbnail.
//!
//! ## Intake
//!
//! [`collect_inputs`] expands directories (one level, or the whole tree with
//! `recursive`) and drops files without an accepted image extension.
//! Decoding runs on the global rayon pool, sized by
//! `processing.max_processes`.

use crate::compose::{RenderContext, Sheet, render_sheet};
use crate::config::SheetConfig;
use crate::export::{ExportError, ExportKind, export_sheet};
use crate::formats::{Catalog, FormatError, FormatSpec};
use crate::imaging::{
    FontSet, ProducerError, RustProducer, ThumbnailProducer, is_supported_image, load_image,
};
use crate::layout::{Geometry, SheetLayout, compute_layout};
use crate::metadata::{MetadataError, MetadataInfo};
use crate::types::SourceImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid image {path}: {reason}")]
    InvalidImage { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Thumbnail failed: {0}")]
    Producer(#[from] ProducerError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("Nothing to export: render the sheet first")]
    NoSheet,
    #[error("Cannot tell the export type from {0}; use jpg, png or pdf")]
    UnknownExportKind(PathBuf),
}

/// Expand `inputs` into image files.
///
/// Files are kept if their extension is accepted. Directories contribute
/// their direct children, or every descendant when `recursive` is set.
/// Hidden entries are skipped. A path that does not exist is an error.
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, LoadError> {
    let mut found = Vec::new();
    for input in inputs {
        let meta = std::fs::metadata(input)?;
        if meta.is_file() {
            if is_supported_image(input) {
                found.push(input.clone());
            }
            continue;
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(input)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_supported_image(p))
            .collect();
        files.sort();
        found.append(&mut files);
    }
    Ok(found)
}

/// Decode `paths` in parallel, preserving order.
pub fn decode_images(paths: &[PathBuf]) -> Result<Vec<SourceImage>, LoadError> {
    paths
        .par_iter()
        .map(|path| {
            let image = load_image(path).map_err(|e| match e {
                ProducerError::Io(io) => LoadError::Io(io),
                ProducerError::ProcessingFailed(reason) => LoadError::InvalidImage {
                    path: path.clone(),
                    reason,
                },
            })?;
            Ok(SourceImage::new(path.clone(), image))
        })
        .collect()
}

/// Stable sort by file name only; directories do not affect the order.
fn sort_by_file_name(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
}

/// One open contact sheet.
pub struct Session {
    config: SheetConfig,
    catalog: Catalog,
    fonts: Arc<FontSet>,
    paths: Vec<PathBuf>,
    metadata: MetadataInfo,
    format: FormatSpec,
    sheet: Option<Sheet>,
    stale: bool,
}

impl Session {
    /// A session using fonts resolved from `config.text.font_paths` and the
    /// system.
    pub fn new(config: SheetConfig) -> Self {
        let fonts = Arc::new(FontSet::load(&config.text.font_paths));
        Self::with_fonts(config, fonts)
    }

    pub fn with_fonts(config: SheetConfig, fonts: Arc<FontSet>) -> Self {
        let catalog = Catalog::standard();
        let format = catalog.default_format().clone();
        Self {
            config,
            catalog,
            fonts,
            paths: Vec::new(),
            metadata: MetadataInfo::default(),
            format,
            sheet: None,
            stale: true,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Input files in sequence order.
    pub fn images(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Add files not already present, then re-sort. Returns how many were new.
    pub fn add_images<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let before = self.paths.len();
        for path in paths {
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
        let added = self.paths.len() - before;
        if added > 0 {
            sort_by_file_name(&mut self.paths);
            self.stale = true;
        }
        added
    }

    /// Remove one file. Returns false if it was not in the session.
    pub fn remove_image(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        let removed = self.paths.len() != before;
        if removed {
            self.stale = true;
        }
        removed
    }

    pub fn clear_images(&mut self) {
        if !self.paths.is_empty() {
            self.paths.clear();
            self.stale = true;
        }
    }

    pub fn format(&self) -> &FormatSpec {
        &self.format
    }

    /// Select a format by id or display name. Unknown ids leave the session
    /// untouched.
    pub fn set_format(&mut self, id: &str) -> Result<(), FormatError> {
        let format = self.catalog.get(id)?.clone();
        if format != self.format {
            self.format = format;
            self.stale = true;
        }
        Ok(())
    }

    pub fn metadata(&self) -> &MetadataInfo {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: MetadataInfo) {
        if metadata != self.metadata {
            self.metadata = metadata;
            self.stale = true;
        }
    }

    /// Metadata from an optional info file with non-empty `overrides` on top.
    pub fn load_metadata(
        &mut self,
        info_file: Option<&Path>,
        overrides: &MetadataInfo,
    ) -> Result<(), SessionError> {
        let base = match info_file {
            Some(path) => MetadataInfo::load(path)?,
            None => MetadataInfo::default(),
        };
        self.set_metadata(base.overlay(overrides));
        Ok(())
    }

    /// Layout for the current images and format, without decoding anything.
    pub fn plan(&self) -> SheetLayout {
        let geometry = Geometry::from_config(&self.config);
        compute_layout(self.paths.len() as u32, &self.format, &geometry)
    }

    /// Decode, produce thumbnails and composite with the built-in producer.
    pub fn render(&mut self) -> Result<&Sheet, SessionError> {
        let producer = RustProducer::new(Arc::clone(&self.fonts), &self.config.text);
        self.render_with(&producer)
    }

    /// Render with any thumbnail producer.
    pub fn render_with<P: ThumbnailProducer + ?Sized>(
        &mut self,
        producer: &P,
    ) -> Result<&Sheet, SessionError> {
        if let Some(max) = self.format.max_images {
            if self.paths.len() > max as usize {
                tracing::warn!(
                    count = self.paths.len(),
                    max,
                    format = self.format.id,
                    "more images than the format holds on one roll"
                );
            }
        }

        let sources = decode_images(&self.paths)?;
        let ctx = RenderContext::new(&self.config, &self.fonts);
        let sheet = render_sheet(&sources, &self.format, &self.metadata, &ctx, producer)?;
        tracing::debug!(
            images = sources.len(),
            width = sheet.width(),
            height = sheet.height(),
            "sheet rendered"
        );

        self.stale = false;
        Ok(self.sheet.insert(sheet))
    }

    /// The last rendered sheet, if any.
    pub fn sheet(&self) -> Option<&Sheet> {
        self.sheet.as_ref()
    }

    /// Write the last rendered sheet. `kind` defaults to the one implied by
    /// the file extension.
    pub fn export(&self, path: &Path, kind: Option<ExportKind>) -> Result<ExportKind, SessionError> {
        let sheet = self.sheet.as_ref().ok_or(SessionError::NoSheet)?;
        let kind = match kind.or_else(|| ExportKind::from_path(path)) {
            Some(kind) => kind,
            None => return Err(SessionError::UnknownExportKind(path.to_path_buf())),
        };
        if self.stale {
            tracing::warn!("exporting a sheet that predates the latest changes");
        }
        export_sheet(sheet, path, kind, &self.config.export)?;
        Ok(kind)
    }

    /// True when nothing has been rendered yet or inputs changed since.
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}
