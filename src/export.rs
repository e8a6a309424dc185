//! Exporter: composited sheets to JPEG, PNG or PDF.
//!
//! | Kind | Encoder | Resolution metadata |
//! |------|---------|---------------------|
//! | JPEG | `image::codecs::jpeg::JpegEncoder` | JFIF density in dots per inch |
//! | PNG | `png::Encoder` | `pHYs` chunk in pixels per metre |
//! | PDF | `lopdf` + `flate2` | one page per sheet, Flate RGB image XObject |
//!
//! Every writer goes through a sibling temporary file that is renamed into
//! place only after the encoder finished. A failed export leaves no file
//! under the requested name and removes its temporary.
//!
//! ## PDF pages
//!
//! Each sheet is drawn on a page of `export.pdf_page_mm` (A4 by default).
//! Its physical size is `px × 72 / dpi` points; it is scaled by
//! `min(pageW / sheetW, pageH / sheetH, 1.0)` and centred, so a sheet is
//! never enlarged beyond its native resolution.

use crate::compose::Sheet;
use crate::config::ExportConfig;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export failed: {0}")]
    Encode(String),
    #[error("Export failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Output file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportKind {
    Jpeg,
    Png,
    Pdf,
}

impl ExportKind {
    /// Infer the kind from a file extension (`jpg`/`jpeg`, `png`, `pdf`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ExportKind::Jpeg),
            "png" => Some(ExportKind::Png),
            "pdf" => Some(ExportKind::Pdf),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Jpeg => "JPEG",
            ExportKind::Png => "PNG",
            ExportKind::Pdf => "PDF",
        }
    }
}

/// Points per inch.
const PT_PER_INCH: f64 = 72.0;
const MM_PER_INCH: f64 = 25.4;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_INCH / MM_PER_INCH
}

/// Pixels per metre for a DPI value, as stored in a PNG `pHYs` chunk.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / (MM_PER_INCH / 1000.0)).round() as u32
}

/// Where a sheet lands on a PDF page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fit a `sheet_px` sheet at `dpi` onto a `page_pt` page: scale down if
/// needed, never up, and centre.
pub fn page_placement(sheet_px: (u32, u32), dpi: u32, page_pt: (f64, f64)) -> PagePlacement {
    let sheet_w = sheet_px.0 as f64 * PT_PER_INCH / dpi as f64;
    let sheet_h = sheet_px.1 as f64 * PT_PER_INCH / dpi as f64;
    let (page_w, page_h) = page_pt;

    let scale = (page_w / sheet_w).min(page_h / sheet_h).min(1.0);
    let width = sheet_w * scale;
    let height = sheet_h * scale;
    PagePlacement {
        scale,
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}

/// Write `sheet` to `path` as `kind`.
pub fn export_sheet(
    sheet: &Sheet,
    path: &Path,
    kind: ExportKind,
    config: &ExportConfig,
) -> Result<(), ExportError> {
    match kind {
        ExportKind::Jpeg => write_jpeg(&sheet.image, sheet.dpi, config.jpeg_quality, path),
        ExportKind::Png => write_png(&sheet.image, sheet.dpi, path),
        ExportKind::Pdf => write_pdf(&[sheet], config.pdf_page_mm, path),
    }?;
    tracing::info!(
        path = %path.display(),
        kind = kind.as_str(),
        width = sheet.width(),
        height = sheet.height(),
        "sheet exported"
    );
    Ok(())
}

/// Temporary sibling used while `path` is being written.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

/// Run `write` against a temporary sibling of `path`, then rename it into
/// place. The temporary is removed if `write` or the rename fails.
fn write_atomically<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&Path) -> Result<(), ExportError>,
{
    let partial = partial_path(path);
    let result = write(&partial).and_then(|()| fs::rename(&partial, path).map_err(Into::into));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// JPEG at `quality` with the JFIF density set to `dpi`.
pub fn write_jpeg(image: &RgbImage, dpi: u32, quality: u8, path: &Path) -> Result<(), ExportError> {
    write_atomically(path, |tmp| {
        let mut writer = BufWriter::new(File::create(tmp)?);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        let density = u16::try_from(dpi).unwrap_or(u16::MAX);
        encoder.set_pixel_density(PixelDensity::dpi(density));
        encoder
            .encode_image(image)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer.flush()?;
        Ok(())
    })
}

/// 8-bit RGB PNG with a `pHYs` chunk for `dpi`.
pub fn write_png(image: &RgbImage, dpi: u32, path: &Path) -> Result<(), ExportError> {
    write_atomically(path, |tmp| {
        let writer = BufWriter::new(File::create(tmp)?);
        let mut encoder = png::Encoder::new(writer, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = dpi_to_ppm(dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let encode = |e: png::EncodingError| ExportError::Encode(e.to_string());
        let mut png_writer = encoder.write_header().map_err(encode)?;
        png_writer.write_image_data(image.as_raw()).map_err(encode)?;
        png_writer.finish().map_err(encode)?;
        Ok(())
    })
}

/// Flate-compressed 8-bit DeviceRGB image XObject.
fn image_xobject(image: &RgbImage) -> Result<Stream, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image.as_raw())?;
    let data = encoder.finish()?;

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", image.width() as i64);
    dict.set("Height", image.height() as i64);
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", 8);
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    Ok(Stream::new(dict, data).with_compression(false))
}

/// A PDF with one page per sheet, each page `page_mm` in size.
pub fn write_pdf(sheets: &[&Sheet], page_mm: [f64; 2], path: &Path) -> Result<(), ExportError> {
    let page_pt = (mm_to_pt(page_mm[0]), mm_to_pt(page_mm[1]));
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let placement = page_placement(sheet.image.dimensions(), sheet.dpi, page_pt);
        let image_id = doc.add_object(image_xobject(&sheet.image)?);

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (placement.width as f32).into(),
                        0.into(),
                        0.into(),
                        (placement.height as f32).into(),
                        (placement.x as f32).into(),
                        (placement.y as f32).into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                (page_pt.0 as f32).into(),
                (page_pt.1 as f32).into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    write_atomically(path, |tmp| {
        doc.save(tmp)?;
        Ok(())
    })
}
