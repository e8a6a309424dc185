//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Formats
//!
//! ```text
//! ID         Name         Aspect  Per row  Max  Orientation  Rotate
//! 35mm-full  35mm Full    3:2     6        36   landscape    yes
//! 120-6x6    120mm 6x6    1:1     3        12   square       no
//! ```
//!
//! ## Plan
//!
//! ```text
//! 35mm Full (35mm-full), 36 images
//!     Grid: 6 rows × 6 per row
//!     Cell: 365×243 px
//!     Content: 2240×1508 px
//!     Canvas: 2476×3095 px at 300 dpi
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 frame-01.jpg
//!     Source: roll/frame-01.jpg
//! 002 frame-02.jpg
//!     Source: roll/frame-02.jpg
//! Sheet 2476×3095 px → sheet.jpg (JPEG)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compose::Sheet;
use crate::export::ExportKind;
use crate::formats::{Catalog, FormatSpec};
use crate::layout::SheetLayout;
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// formats
// ============================================================================

/// Format the catalog as an aligned table, one format per line.
pub fn format_formats_table(catalog: &Catalog) -> Vec<String> {
    let rows: Vec<[String; 7]> = catalog
        .iter()
        .map(|f| {
            [
                f.id.to_string(),
                f.name.to_string(),
                f.aspect_label(),
                f.images_per_row.to_string(),
                f.max_images.map_or_else(|| "-".to_string(), |m| m.to_string()),
                f.orientation.as_str().to_string(),
                if f.force_rotation { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();

    let header = ["ID", "Name", "Aspect", "Per row", "Max", "Orientation", "Rotate"];
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut lines = vec![table_row(header.iter().copied(), &widths)];
    for row in &rows {
        lines.push(table_row(row.iter().map(String::as_str), &widths));
    }
    lines
}

/// Left-align each cell to its column width, two spaces between columns.
fn table_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = w))
        .collect();
    padded.join("  ").trim_end().to_string()
}

pub fn print_formats_table(catalog: &Catalog) {
    for line in format_formats_table(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// plan
// ============================================================================

/// Format a computed layout: grid shape, cell and canvas sizes.
pub fn format_plan_output(format: &FormatSpec, layout: &SheetLayout, dpi: u32) -> Vec<String> {
    let plan = &layout.plan;
    let mut lines = vec![format!(
        "{} ({}), {} images",
        format.name, format.id, plan.image_count
    )];
    lines.push(format!(
        "    Grid: {} rows \u{00d7} {} per row",
        plan.rows, plan.images_per_row
    ));
    lines.push(format!(
        "    Cell: {}\u{00d7}{} px",
        plan.cell_width, plan.cell_height
    ));
    lines.push(format!(
        "    Content: {}\u{00d7}{} px",
        plan.content_width, plan.content_height
    ));
    lines.push(format!(
        "    Canvas: {}\u{00d7}{} px at {} dpi",
        layout.canvas.width, layout.canvas.height, dpi
    ));
    if layout.clamped {
        lines.push(format!(
            "    Clamped: needs {}\u{00d7}{} px, content may not fit",
            layout.minimum.width, layout.minimum.height
        ));
    }
    if let Some(max) = format.max_images {
        if plan.image_count > max {
            lines.push(format!("    Note: more than {} frames for this format", max));
        }
    }
    lines
}

pub fn print_plan_output(format: &FormatSpec, layout: &SheetLayout, dpi: u32) {
    for line in format_plan_output(format, layout, dpi) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Format a finished render: numbered inputs, then the written sheet.
pub fn format_render_output(
    images: &[PathBuf],
    sheet: &Sheet,
    output: &Path,
    kind: ExportKind,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, path) in images.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), file_name(path)));
        lines.push(format!("    Source: {}", path.display()));
    }
    if sheet.frames_dropped > 0 {
        lines.push(format!(
            "Frames omitted: {} did not fit above the footer",
            sheet.frames_dropped
        ));
    }
    if !sheet.film_line_drawn {
        lines.push("Film line omitted: no room above the bottom margin".to_string());
    }
    lines.push(format!(
        "Sheet {}\u{00d7}{} px \u{2192} {} ({})",
        sheet.width(),
        sheet.height(),
        output.display(),
        kind.as_str()
    ));
    lines
}

pub fn print_render_output(images: &[PathBuf], sheet: &Sheet, output: &Path, kind: ExportKind) {
    for line in format_render_output(images, sheet, output, kind) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Geometry, compute_layout};
    use image::RgbImage;

    fn layout_for(id: &str, count: u32) -> (FormatSpec, SheetLayout) {
        let catalog = Catalog::standard();
        let format = catalog.get(id).unwrap().clone();
        let layout = compute_layout(count, &format, &Geometry::default());
        (format, layout)
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(7), "007");
        assert_eq!(format_index(123), "123");
    }

    // =========================================================================
    // formats
    // =========================================================================

    #[test]
    fn formats_table_lists_every_format() {
        let lines = format_formats_table(&Catalog::standard());
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("35mm-full"));
        assert!(lines[4].contains("4.5:6"));
        assert!(lines[8].starts_with("127-4x4"));
    }

    #[test]
    fn formats_table_columns_align() {
        let lines = format_formats_table(&Catalog::standard());
        let col = lines[0].find("Name").unwrap();
        for line in &lines[1..] {
            assert_eq!(&line[col - 2..col], "  ");
        }
    }

    // =========================================================================
    // plan
    // =========================================================================

    #[test]
    fn plan_output_full_roll() {
        let (format, layout) = layout_for("35mm-full", 36);
        let lines = format_plan_output(&format, &layout, 300);
        assert_eq!(lines[0], "35mm Full (35mm-full), 36 images");
        assert_eq!(lines[1], "    Grid: 6 rows \u{00d7} 6 per row");
        assert_eq!(lines[2], "    Cell: 365\u{00d7}243 px");
        assert_eq!(lines[4], "    Canvas: 2476\u{00d7}3095 px at 300 dpi");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn plan_output_mentions_clamp_and_overflow() {
        let (format, layout) = layout_for("120-6x7", 100);
        let lines = format_plan_output(&format, &layout, 300);
        assert!(lines.iter().any(|l| l.starts_with("    Clamped:")));
        assert!(lines.iter().any(|l| l == "    Note: more than 10 frames for this format"));
    }

    // =========================================================================
    // render
    // =========================================================================

    #[test]
    fn render_output_numbers_inputs() {
        let (_, layout) = layout_for("120-6x6", 2);
        let sheet = Sheet {
            image: RgbImage::new(20, 25),
            layout,
            dpi: 300,
            film_line_drawn: true,
            frames_dropped: 0,
        };
        let images = vec![PathBuf::from("roll/a.jpg"), PathBuf::from("roll/b.jpg")];
        let lines = format_render_output(&images, &sheet, Path::new("out.pdf"), ExportKind::Pdf);
        assert_eq!(
            lines,
            vec![
                "001 a.jpg",
                "    Source: roll/a.jpg",
                "002 b.jpg",
                "    Source: roll/b.jpg",
                "Sheet 20\u{00d7}25 px \u{2192} out.pdf (PDF)",
            ]
        );
    }

    #[test]
    fn render_output_reports_omitted_film_line() {
        let (_, layout) = layout_for("120-6x6", 1);
        let sheet = Sheet {
            image: RgbImage::new(4, 5),
            layout,
            dpi: 300,
            film_line_drawn: false,
            frames_dropped: 0,
        };
        let lines = format_render_output(&[], &sheet, Path::new("s.png"), ExportKind::Png);
        assert_eq!(lines[0], "Film line omitted: no room above the bottom margin");
    }
    #[test]
    fn render_output_reports_dropped_frames() {
        let (_, layout) = layout_for("120-6x7", 40);
        let sheet = Sheet {
            image: RgbImage::new(4, 5),
            layout,
            dpi: 300,
            film_line_drawn: true,
            frames_dropped: 31,
        };
        let lines = format_render_output(&[], &sheet, Path::new("s.png"), ExportKind::Png);
        assert_eq!(lines[0], "Frames omitted: 31 did not fit above the footer");
    }
}
