//! Compositor: thumbnails into the grid, metadata into the footer band.
//!
//! ## Sheet anatomy
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │            margin                    │
//! │    ┌──┐ ┌──┐ ┌──┐ ┌──┐ ┌──┐ ┌──┐     │  grid: row-major, centred
//! │    │1 │ │2 │ │3 │ │4 │ │5 │ │6 │     │  horizontally, top fixed at
//! │    └──┘ └──┘ └──┘ └──┘ └──┘ └──┘     │  the margin
//! │    ...                               │
//! │                                      │
//! │  ──────────────────────────────────  │  separator (top of footer band)
//! │            section gap               │
//! │  Date: …              Camera: …      │  body rows, line_height apart
//! │  Location: …          Lens: …        │
//! │  Developer: …                        │
//! │            section gap               │
//! │            Film: … (bold)            │  only if it fits above the margin
//! │            margin                    │
//! └──────────────────────────────────────┘
//! ```
//!
//! The footer band is always `footer_height` tall, however many fields are
//! filled in. Positions are computed by [`plan_footer`], a pure function;
//! [`compose`] only paints.
//!
//! Thumbnails are produced in parallel (the producer is `Sync`), then pasted
//! sequentially. Each render allocates a fresh canvas; inputs are never
//! mutated.

use crate::config::{ColumnAlign, SheetConfig};
use crate::formats::FormatSpec;
use crate::imaging::draw::{BLACK, WHITE, hline};
use crate::imaging::{FontSet, ProducerError, ThumbnailProducer, orient_for_format};
use crate::layout::{Geometry, LayoutPlan, SheetLayout, compute_layout, pt_to_px};
use crate::metadata::{FooterLines, MetadataInfo};
use crate::types::{NumberedThumbnail, SourceImage};
use image::RgbImage;
use image::imageops;
use rayon::prelude::*;
use std::borrow::Cow;

/// Footer typography in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub body_px: u32,
    pub film_px: u32,
    pub line_height: u32,
    /// Height the film line must have free above the bottom margin.
    pub film_line_height: u32,
    pub column_align: ColumnAlign,
}

impl Typography {
    pub fn from_config(config: &SheetConfig) -> Self {
        let dpi = config.page.dpi;
        let text = &config.text;
        Self {
            body_px: pt_to_px(text.body_pt, dpi),
            film_px: pt_to_px(text.film_pt, dpi),
            line_height: pt_to_px(text.line_height_pt, dpi),
            film_line_height: pt_to_px(text.film_line_pt, dpi),
            column_align: text.column_align,
        }
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

/// Everything a render needs besides the images and the metadata.
pub struct RenderContext<'a> {
    pub geometry: Geometry,
    pub typography: Typography,
    pub fonts: &'a FontSet,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &SheetConfig, fonts: &'a FontSet) -> Self {
        Self {
            geometry: Geometry::from_config(config),
            typography: Typography::from_config(config),
            fonts,
        }
    }
}

/// The composited canvas, ready for export.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub image: RgbImage,
    pub layout: SheetLayout,
    /// Resolution to record in exported files.
    pub dpi: u32,
    /// False when a film line was requested but did not fit.
    pub film_line_drawn: bool,
    /// Frames left off a clamped sheet because their row would reach the footer.
    pub frames_dropped: u32,
}

impl Sheet {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// One line of footer text with its vertical position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub text: String,
    pub y: i64,
}

/// Where every footer element goes. X positions of text depend on the
/// rendered width and are resolved while painting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterPlan {
    pub separator_y: i64,
    pub separator_x: (i64, i64),
    pub text_top: i64,
    pub left: Vec<TextRow>,
    pub right: Vec<TextRow>,
    pub film: Option<TextRow>,
    /// A film line existed but would have run into the bottom margin.
    pub film_omitted: bool,
}

/// Lay out the footer band for `lines` on a sheet with `layout`.
pub fn plan_footer(
    layout: &SheetLayout,
    geometry: &Geometry,
    typography: &Typography,
    lines: &FooterLines,
) -> FooterPlan {
    let margin = geometry.margin as i64;
    let width = layout.canvas.width as i64;
    let height = layout.canvas.height as i64;
    let separator_y = layout.footer_top(geometry);
    let text_top = separator_y + geometry.section_gap as i64;
    let line_height = typography.line_height as i64;

    let rows = |items: &[String]| -> Vec<TextRow> {
        items
            .iter()
            .enumerate()
            .map(|(i, text)| TextRow {
                text: text.clone(),
                y: text_top + i as i64 * line_height,
            })
            .collect()
    };

    let column_rows = lines.column_rows() as i64;
    let film_y = if column_rows > 0 {
        text_top + column_rows * line_height + geometry.section_gap as i64
    } else {
        text_top
    };
    let film_fits = film_y + typography.film_line_height as i64 <= height - margin;

    let (film, film_omitted) = match &lines.film {
        Some(text) if film_fits => (
            Some(TextRow {
                text: text.clone(),
                y: film_y,
            }),
            false,
        ),
        Some(_) => (None, true),
        None => (None, false),
    };

    FooterPlan {
        separator_y,
        separator_x: (margin, width - margin),
        text_top,
        left: rows(&lines.left),
        right: rows(&lines.right),
        film,
        film_omitted,
    }
}

/// Left edge of a column line of rendered width `text_width`.
fn column_x(
    align: ColumnAlign,
    right_column: bool,
    text_width: u32,
    canvas_width: u32,
    margin: u32,
) -> i64 {
    let (w, m, tw) = (canvas_width as i64, margin as i64, text_width as i64);
    match align {
        ColumnAlign::Start if right_column => w / 2,
        ColumnAlign::Start => m,
        ColumnAlign::Center => {
            let half = (w - 2 * m) / 2;
            let area_start = if right_column { m + half } else { m };
            area_start + (half - tw).div_euclid(2)
        }
    }
}

/// Produce the cell-sized, numbered thumbnail for every source, in order.
pub fn prepare_thumbnails<P: ThumbnailProducer + ?Sized>(
    sources: &[SourceImage],
    format: &FormatSpec,
    plan: &LayoutPlan,
    producer: &P,
) -> Result<Vec<NumberedThumbnail>, ProducerError> {
    sources
        .par_iter()
        .enumerate()
        .map(|(index, source)| {
            let oriented = match orient_for_format(&source.image, format) {
                Some(rotated) => Cow::Owned(rotated),
                None => Cow::Borrowed(&source.image),
            };
            let fitted = producer.resize_to_fit(&oriented, plan.cell_width, plan.cell_height)?;
            let number = index as u32 + 1;
            let image = producer.overlay_number(fitted, number)?;
            Ok(NumberedThumbnail { image, number })
        })
        .collect()
}

/// Paint a sheet from already-prepared thumbnails.
pub fn compose(
    thumbnails: &[NumberedThumbnail],
    layout: &SheetLayout,
    metadata: &MetadataInfo,
    ctx: &RenderContext<'_>,
) -> Sheet {
    let geometry = &ctx.geometry;
    let typography = &ctx.typography;
    let mut canvas = RgbImage::from_pixel(layout.canvas.width, layout.canvas.height, WHITE);

    let mut frames_dropped = 0;
    for thumb in thumbnails {
        let index = thumb.number - 1;
        if !layout.cell_fits(index, geometry) {
            frames_dropped += 1;
            continue;
        }
        let (x, y) = layout.cell_origin(index, geometry);
        imageops::replace(&mut canvas, &thumb.image, x, y);
    }
    if frames_dropped > 0 {
        tracing::warn!(
            dropped = frames_dropped,
            total = thumbnails.len(),
            "frames do not fit above the footer on the clamped sheet; left out"
        );
    }

    let lines = metadata.footer_lines();
    let footer = plan_footer(layout, geometry, typography, &lines);

    hline(
        &mut canvas,
        footer.separator_x.0,
        footer.separator_x.1,
        footer.separator_y,
        geometry.separator_width,
        BLACK,
    );

    let body_px = typography.body_px as f32;
    for (rows, right_column) in [(&footer.left, false), (&footer.right, true)] {
        for row in rows {
            let (text_width, _) = ctx.fonts.measure(&row.text, body_px);
            let x = column_x(
                typography.column_align,
                right_column,
                text_width,
                layout.canvas.width,
                geometry.margin,
            );
            ctx.fonts
                .draw(&mut canvas, &row.text, body_px, x, row.y, BLACK);
        }
    }

    if let Some(film) = &footer.film {
        let film_px = typography.film_px as f32;
        let (text_width, _) = ctx.fonts.measure_bold(&film.text, film_px);
        let x = (layout.canvas.width as i64 - text_width as i64).div_euclid(2);
        ctx.fonts
            .draw_bold(&mut canvas, &film.text, film_px, x, film.y, BLACK);
    }
    if footer.film_omitted {
        tracing::warn!(
            separator_y = footer.separator_y,
            "film line does not fit above the bottom margin; omitted"
        );
    }

    Sheet {
        image: canvas,
        layout: *layout,
        dpi: geometry.dpi,
        film_line_drawn: !footer.film_omitted,
        frames_dropped,
    }
}

/// Layout, thumbnails and painting in one call.
pub fn render_sheet<P: ThumbnailProducer + ?Sized>(
    sources: &[SourceImage],
    format: &FormatSpec,
    metadata: &MetadataInfo,
    ctx: &RenderContext<'_>,
    producer: &P,
) -> Result<Sheet, ProducerError> {
    let layout = compute_layout(sources.len() as u32, format, &ctx.geometry);
    let thumbnails = prepare_thumbnails(sources, format, &layout.plan, producer)?;
    Ok(compose(&thumbnails, &layout, metadata, ctx))
}
