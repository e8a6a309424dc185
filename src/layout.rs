//! Layout engine: cell sizing, grid sizing and canvas sizing.
//!
//! All functions here are pure integer math over a [`Geometry`] (the sheet
//! config converted to pixels once) and a [`FormatSpec`]. No images, no I/O.
//!
//! ## Pipeline
//!
//! ```text
//! 1. cells    page-width basis − margins − gaps  →  cell width, cell height
//! 2. grid     ceil(N / per-row) rows             →  content bounding box
//! 3. canvas   content + margins + footer band    →  canvas at the target ratio,
//!                                                   clamped to the maximum page
//! ```
//!
//! ## Canvas tie-break
//!
//! The canvas must be at least `(min_width, min_height)` and match the target
//! ratio `R = rw:rh`. Both ratio-derived candidates are computed; when the
//! width-derived height and the height-derived width both cover the minimums
//! the width drives, otherwise the height does. A post-check then corrects
//! whichever dimension is still short, height first, width second. Because
//! the derived dimension is floored, one pass of each correction is enough
//! for the result to cover the content.
//!
//! Finally the canvas is clamped to the maximum page box. When the clamp
//! engages the canvas becomes exactly the largest ratio-conforming box that
//! fits the maximum, even if the content no longer fits in it.

use crate::config::SheetConfig;
use crate::formats::FormatSpec;
use serde::Serialize;

/// Convert millimetres to pixels at `dpi`: `round(mm × dpi / 25.4)`.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm * dpi as f64 / 25.4).round().max(0.0) as u32
}

/// Convert typographic points to pixels at `dpi`: `round(pt × dpi / 72)`.
pub fn pt_to_px(pt: f64, dpi: u32) -> u32 {
    (pt * dpi as f64 / 72.0).round().max(0.0) as u32
}

/// The sheet's physical constants, converted to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub dpi: u32,
    pub page_width: u32,
    pub max_width: u32,
    pub max_height: u32,
    /// Target canvas ratio as `(width, height)`.
    pub ratio: (u32, u32),
    pub margin: u32,
    pub footer_height: u32,
    pub section_gap: u32,
    pub separator_width: u32,
    pub cell_gap: u32,
    pub min_cell_width: u32,
}

impl Geometry {
    pub fn from_config(config: &SheetConfig) -> Self {
        let page = &config.page;
        let dpi = page.dpi;
        Self {
            dpi,
            page_width: mm_to_px(page.width_mm, dpi),
            max_width: mm_to_px(page.max_width_mm, dpi),
            max_height: mm_to_px(page.max_height_mm, dpi),
            ratio: (page.aspect_ratio[0], page.aspect_ratio[1]),
            margin: mm_to_px(page.margin_mm, dpi),
            footer_height: mm_to_px(page.footer_height_mm, dpi),
            section_gap: mm_to_px(page.section_gap_mm, dpi),
            separator_width: page.separator_width_px,
            cell_gap: config.grid.cell_gap_px,
            min_cell_width: mm_to_px(config.grid.min_cell_width_mm, dpi),
        }
    }

    /// Vertical space between the bottom of the grid and the footer band:
    /// gap, separator line, gap.
    pub fn section_spacing(&self) -> u32 {
        2 * self.section_gap + self.separator_width
    }

    /// The largest box at the target ratio that fits the maximum page.
    pub fn clamped_bounds(&self) -> CanvasSize {
        let (rw, rh) = self.ratio;
        let height_for_width = scale(self.max_width, rh, rw);
        if height_for_width <= self.max_height {
            CanvasSize {
                width: self.max_width,
                height: height_for_width,
            }
        } else {
            CanvasSize {
                width: scale(self.max_height, rw, rh),
                height: self.max_height,
            }
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

/// Cell and grid dimensions for one render. Recomputed fresh every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub image_count: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub rows: u32,
    pub images_per_row: u32,
    /// Width of the content bounding box (cells plus inter-cell gaps).
    pub content_width: u32,
    /// Height of the content bounding box. Zero for an empty sheet.
    pub content_height: u32,
}

/// Final canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// A layout plan together with the canvas it is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SheetLayout {
    pub plan: LayoutPlan,
    pub canvas: CanvasSize,
    /// The smallest canvas that holds the content, before ratio and clamp.
    pub minimum: CanvasSize,
    /// Whether the maximum page clamp replaced the ratio-derived size.
    pub clamped: bool,
}

/// `value × num / den`, floored and saturated at `u32::MAX`.
fn scale(value: u32, num: u32, den: u32) -> u32 {
    saturate(value as u64 * num as u64 / den as u64)
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// `ceil(count / per_row)`.
pub fn rows_needed(count: u32, per_row: u32) -> u32 {
    count.div_ceil(per_row)
}

/// Steps 1 and 2: size the cells and the content bounding box.
pub fn plan_grid(count: u32, format: &FormatSpec, geometry: &Geometry) -> LayoutPlan {
    let per_row = format.images_per_row;
    let gap = geometry.cell_gap;

    let available = geometry.page_width.saturating_sub(2 * geometry.margin);
    let gaps = (per_row - 1) * gap;
    let cell_width = (available.saturating_sub(gaps) / per_row).max(geometry.min_cell_width);

    let (aspect_w, aspect_h) = format.aspect_ratio;
    let cell_height = ((cell_width as f64 * aspect_h / aspect_w).round() as u32).max(1);

    let rows = rows_needed(count, per_row);
    let content_width = saturate(per_row as u64 * cell_width as u64 + gaps as u64);
    let content_height = if rows == 0 {
        0
    } else {
        saturate(rows as u64 * cell_height as u64 + (rows as u64 - 1) * gap as u64)
    };

    LayoutPlan {
        image_count: count,
        cell_width,
        cell_height,
        rows,
        images_per_row: per_row,
        content_width,
        content_height,
    }
}

/// The smallest canvas that fits the grid, margins, section spacing and footer.
pub fn minimum_canvas(plan: &LayoutPlan, geometry: &Geometry) -> CanvasSize {
    CanvasSize {
        width: plan.content_width.saturating_add(2 * geometry.margin),
        height: saturate(
            2 * geometry.margin as u64
                + plan.content_height as u64
                + geometry.section_spacing() as u64
                + geometry.footer_height as u64,
        ),
    }
}

/// Step 3 without the clamp: fit `minimum` into a box at `ratio`.
pub fn fit_to_ratio(minimum: CanvasSize, ratio: (u32, u32)) -> CanvasSize {
    let (rw, rh) = ratio;
    let (min_w, min_h) = (minimum.width, minimum.height);

    let height_from_width = scale(min_w, rh, rw);
    let width_from_height = scale(min_h, rw, rh);

    let (mut width, mut height) = if height_from_width >= min_h && min_w <= width_from_height {
        let w = min_w.max(width_from_height);
        (w, scale(w, rh, rw))
    } else {
        let h = min_h.max(height_from_width);
        (scale(h, rw, rh), h)
    };

    if height < min_h {
        height = min_h;
        width = scale(height, rw, rh);
    }
    if width < min_w {
        width = min_w;
        height = scale(width, rh, rw);
    }

    CanvasSize { width, height }
}

/// Compute the full sheet layout for `count` images of `format`.
#[tracing::instrument(level = "debug", skip(format, geometry), fields(format = format.id))]
pub fn compute_layout(count: u32, format: &FormatSpec, geometry: &Geometry) -> SheetLayout {
    let plan = plan_grid(count, format, geometry);
    let minimum = minimum_canvas(&plan, geometry);
    let fitted = fit_to_ratio(minimum, geometry.ratio);

    let clamped = fitted.width > geometry.max_width || fitted.height > geometry.max_height;
    let canvas = if clamped {
        let bounds = geometry.clamped_bounds();
        tracing::warn!(
            wanted_width = fitted.width,
            wanted_height = fitted.height,
            width = bounds.width,
            height = bounds.height,
            "canvas exceeds the maximum page size; clamped"
        );
        bounds
    } else {
        fitted
    };

    tracing::debug!(
        cell_width = plan.cell_width,
        cell_height = plan.cell_height,
        rows = plan.rows,
        width = canvas.width,
        height = canvas.height,
        "layout computed"
    );

    SheetLayout {
        plan,
        canvas,
        minimum,
        clamped,
    }
}

impl SheetLayout {
    /// Left edge of the grid: the content box is centred horizontally.
    /// Negative when a clamped canvas is narrower than the content.
    pub fn grid_left(&self) -> i64 {
        (self.canvas.width as i64 - self.plan.content_width as i64).div_euclid(2)
    }

    /// Top-left corner of the cell holding the `index`-th image (0-based),
    /// filling rows left to right, top to bottom.
    pub fn cell_origin(&self, index: u32, geometry: &Geometry) -> (i64, i64) {
        let per_row = self.plan.images_per_row;
        let (row, col) = (index / per_row, index % per_row);
        let gap = geometry.cell_gap as i64;
        let x = self.grid_left() + col as i64 * (self.plan.cell_width as i64 + gap);
        let y = geometry.margin as i64 + row as i64 * (self.plan.cell_height as i64 + gap);
        (x, y)
    }

    /// Y coordinate of the separator line, the top edge of the footer band.
    pub fn footer_top(&self, geometry: &Geometry) -> i64 {
        self.canvas.height as i64 - geometry.margin as i64 - geometry.footer_height as i64
    }

    /// Lowest y a cell may reach: the section spacing above the footer band.
    pub fn grid_bottom(&self, geometry: &Geometry) -> i64 {
        self.footer_top(geometry) - geometry.section_spacing() as i64
    }

    /// Whether the cell holding the `index`-th image ends above [`grid_bottom`].
    ///
    /// [`grid_bottom`]: Self::grid_bottom
    pub fn cell_fits(&self, index: u32, geometry: &Geometry) -> bool {
        let (_, y) = self.cell_origin(index, geometry);
        y + self.plan.cell_height as i64 <= self.grid_bottom(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Catalog;

    fn layout_for(id: &str, count: u32) -> SheetLayout {
        let catalog = Catalog::standard();
        compute_layout(count, catalog.get(id).unwrap(), &Geometry::default())
    }

    fn ratio_error(canvas: CanvasSize) -> i64 {
        // |w·5 − h·4|, i.e. how far from 4:5 in scaled pixels
        (canvas.width as i64 * 5 - canvas.height as i64 * 4).abs()
    }

    // =========================================================================
    // Unit conversion
    // =========================================================================

    #[test]
    fn mm_to_px_at_300_dpi() {
        assert_eq!(mm_to_px(10.0, 300), 118);
        assert_eq!(mm_to_px(35.0, 300), 413);
        assert_eq!(mm_to_px(6.0, 300), 71);
        assert_eq!(mm_to_px(30.0, 300), 354);
        assert_eq!(mm_to_px(210.0, 300), 2480);
        assert_eq!(mm_to_px(297.0, 300), 3508);
    }

    #[test]
    fn pt_to_px_at_300_dpi() {
        assert_eq!(pt_to_px(14.0, 300), 58);
        assert_eq!(pt_to_px(16.0, 300), 67);
        assert_eq!(pt_to_px(18.0, 300), 75);
        assert_eq!(pt_to_px(72.0, 300), 300);
    }

    #[test]
    fn default_geometry() {
        let g = Geometry::default();
        assert_eq!(g.page_width, 2480);
        assert_eq!(g.margin, 118);
        assert_eq!(g.footer_height, 413);
        assert_eq!(g.section_gap, 71);
        assert_eq!(g.cell_gap, 10);
        assert_eq!(g.min_cell_width, 354);
        assert_eq!((g.max_width, g.max_height), (2480, 3508));
        assert_eq!(g.section_spacing(), 144);
    }

    #[test]
    fn clamped_bounds_are_a4_at_four_five() {
        let bounds = Geometry::default().clamped_bounds();
        assert_eq!(
            bounds,
            CanvasSize {
                width: 2480,
                height: 3100
            }
        );
    }

    #[test]
    fn clamped_bounds_height_limited() {
        let g = Geometry {
            ratio: (1, 2),
            ..Geometry::default()
        };
        // 2480 wide would need 4960 tall; height-limited instead
        assert_eq!(
            g.clamped_bounds(),
            CanvasSize {
                width: 1754,
                height: 3508
            }
        );
    }

    // =========================================================================
    // Grid sizing
    // =========================================================================

    #[test]
    fn rows_needed_is_ceiling() {
        assert_eq!(rows_needed(0, 6), 0);
        assert_eq!(rows_needed(1, 6), 1);
        assert_eq!(rows_needed(6, 6), 1);
        assert_eq!(rows_needed(7, 6), 2);
        assert_eq!(rows_needed(36, 6), 6);
        assert_eq!(rows_needed(100, 3), 34);
    }

    #[test]
    fn rows_property_over_all_formats() {
        let catalog = Catalog::standard();
        let g = Geometry::default();
        for format in catalog.iter() {
            for n in 0..=120 {
                let plan = plan_grid(n, format, &g);
                let per_row = format.images_per_row;
                assert_eq!(plan.rows, n.div_ceil(per_row), "{} n={n}", format.id);
                assert_eq!(plan.rows == 0, n == 0, "{} n={n}", format.id);
            }
        }
    }

    #[test]
    fn cell_aspect_matches_format_within_a_pixel() {
        let catalog = Catalog::standard();
        let g = Geometry::default();
        for format in catalog.iter() {
            let plan = plan_grid(12, format, &g);
            let (aw, ah) = format.aspect_ratio;
            let ideal = plan.cell_width as f64 * ah / aw;
            assert!(
                (plan.cell_height as f64 - ideal).abs() <= 1.0,
                "{}: {}x{}",
                format.id,
                plan.cell_width,
                plan.cell_height
            );
        }
    }

    #[test]
    fn thirty_five_full_cells() {
        let catalog = Catalog::standard();
        let plan = plan_grid(36, catalog.get("35mm-full").unwrap(), &Geometry::default());
        // (2480 − 236 − 5·10) / 6 = 365.67 → 365; 365·2/3 = 243.3 → 243
        assert_eq!((plan.cell_width, plan.cell_height), (365, 243));
        assert_eq!(plan.content_width, 6 * 365 + 50);
        assert_eq!(plan.content_height, 6 * 243 + 50);
    }

    #[test]
    fn dense_format_hits_minimum_cell_width() {
        let catalog = Catalog::standard();
        let plan = plan_grid(72, catalog.get("35mm-half").unwrap(), &Geometry::default());
        // (2244 − 110) / 12 = 177 < 354
        assert_eq!(plan.cell_width, 354);
        assert_eq!(plan.cell_height, 531);
    }

    #[test]
    fn fractional_aspect_ratio() {
        let catalog = Catalog::standard();
        let plan = plan_grid(3, catalog.get("120-6x4.5").unwrap(), &Geometry::default());
        assert_eq!(plan.cell_width, 741);
        assert_eq!(plan.cell_height, 988);
    }

    #[test]
    fn empty_sheet_has_no_content_height() {
        let catalog = Catalog::standard();
        let plan = plan_grid(0, catalog.get("120-6x6").unwrap(), &Geometry::default());
        assert_eq!(plan.rows, 0);
        assert_eq!(plan.content_height, 0);
        assert!(plan.cell_width > 0 && plan.cell_height > 0);
    }

    // =========================================================================
    // Canvas sizing
    // =========================================================================

    #[test]
    fn fit_to_ratio_height_driven() {
        let canvas = fit_to_ratio(
            CanvasSize {
                width: 1000,
                height: 2000,
            },
            (4, 5),
        );
        assert_eq!(
            canvas,
            CanvasSize {
                width: 1600,
                height: 2000
            }
        );
    }

    #[test]
    fn fit_to_ratio_width_driven_exact() {
        let canvas = fit_to_ratio(
            CanvasSize {
                width: 800,
                height: 1000,
            },
            (4, 5),
        );
        assert_eq!(
            canvas,
            CanvasSize {
                width: 800,
                height: 1000
            }
        );
    }

    #[test]
    fn fit_to_ratio_corrects_floored_width() {
        // 2479·5/4 = 3098.75 → 3098, and 3098·4/5 = 2478.4 → 2478 < 2479
        let canvas = fit_to_ratio(
            CanvasSize {
                width: 2479,
                height: 1534,
            },
            (4, 5),
        );
        assert_eq!(
            canvas,
            CanvasSize {
                width: 2479,
                height: 3098
            }
        );
    }

    #[test]
    fn fit_to_ratio_always_covers_minimum() {
        for w in (100..3000).step_by(37) {
            for h in (100..4000).step_by(41) {
                let min = CanvasSize {
                    width: w,
                    height: h,
                };
                let c = fit_to_ratio(min, (4, 5));
                assert!(c.width >= w && c.height >= h, "{min:?} → {c:?}");
                assert!(ratio_error(c) <= 5, "{min:?} → {c:?}");
            }
        }
    }

    #[test]
    fn scenario_thirty_six_frames_of_35mm() {
        let layout = layout_for("35mm-full", 36);
        assert_eq!(layout.plan.rows, 6);
        assert_eq!(layout.plan.images_per_row, 6);
        assert!(!layout.clamped);
        assert_eq!(
            layout.canvas,
            CanvasSize {
                width: 2476,
                height: 3095
            }
        );
        // Last cell ends inside the canvas and above the separator
        let g = Geometry::default();
        let (x, y) = layout.cell_origin(35, &g);
        assert!(x + layout.plan.cell_width as i64 <= layout.canvas.width as i64 - g.margin as i64);
        assert!(y + (layout.plan.cell_height as i64) < layout.footer_top(&g));
    }

    #[test]
    fn scenario_single_frame() {
        let catalog = Catalog::standard();
        let g = Geometry::default();
        for format in catalog.iter() {
            let layout = compute_layout(1, format, &g);
            assert_eq!(layout.plan.rows, 1, "{}", format.id);
            assert!(ratio_error(layout.canvas) <= 5, "{}", format.id);
            if !layout.clamped {
                assert!(layout.footer_top(&g) >= 0);
                assert!(layout.canvas.height >= layout.minimum.height);
            }
        }
    }

    #[test]
    fn scenario_hundred_frames_clamps() {
        let layout = layout_for("120-6x7", 100);
        assert_eq!(layout.plan.rows, 34);
        assert!(layout.clamped);
        assert_eq!(
            layout.canvas,
            CanvasSize {
                width: 2480,
                height: 3100
            }
        );
    }

    #[test]
    fn content_fits_whenever_not_clamped() {
        let catalog = Catalog::standard();
        let g = Geometry::default();
        for format in catalog.iter() {
            for n in 1..=40 {
                let layout = compute_layout(n, format, &g);
                if layout.clamped {
                    assert_eq!(layout.canvas, g.clamped_bounds());
                    continue;
                }
                let c = layout.canvas;
                let p = layout.plan;
                assert!(p.content_width + 2 * g.margin <= c.width, "{} n={n}", format.id);
                assert!(
                    p.content_height + g.footer_height + 2 * g.margin + g.section_spacing()
                        <= c.height,
                    "{} n={n}",
                    format.id
                );
                assert!(ratio_error(c) <= 5, "{} n={n}", format.id);
            }
        }
    }

    #[test]
    fn clamped_canvas_never_exceeds_maximum() {
        let catalog = Catalog::standard();
        let g = Geometry::default();
        for format in catalog.iter() {
            for n in [0, 1, 12, 36, 72, 100, 500] {
                let c = compute_layout(n, format, &g).canvas;
                assert!(c.width <= g.max_width && c.height <= g.max_height);
            }
        }
    }

    #[test]
    fn twelve_across_always_clamps() {
        let layout = layout_for("35mm-half", 1);
        assert!(layout.clamped);
        assert!(layout.grid_left() < 0);
    }

    #[test]
    fn huge_counts_saturate_and_clamp() {
        let g = Geometry::default();
        for (id, n) in [("35mm-full", u32::MAX), ("120-6x6", 20_000_000)] {
            let layout = layout_for(id, n);
            assert!(layout.clamped, "{id} n={n}");
            assert_eq!(layout.canvas, g.clamped_bounds(), "{id} n={n}");
            assert!(layout.minimum.height > g.max_height, "{id} n={n}");
        }
        // Content height saturates rather than wrapping
        let layout = layout_for("35mm-full", u32::MAX);
        assert_eq!(layout.plan.content_height, u32::MAX);
        assert_eq!(layout.minimum.height, u32::MAX);
    }

    #[test]
    fn empty_sheet_is_sized_by_margins_and_footer() {
        let layout = layout_for("120-6x6", 0);
        assert_eq!(layout.plan.rows, 0);
        assert!(!layout.clamped);
        let g = Geometry::default();
        assert_eq!(
            layout.minimum.height,
            2 * g.margin + g.section_spacing() + g.footer_height
        );
        assert!(layout.canvas.height >= layout.minimum.height);
    }

    #[test]
    fn layout_is_deterministic() {
        assert_eq!(layout_for("120-6x9", 8), layout_for("120-6x9", 8));
    }

    // =========================================================================
    // Placement helpers
    // =========================================================================

    #[test]
    fn cell_origins_are_row_major() {
        let layout = layout_for("35mm-full", 36);
        let g = Geometry::default();
        let left = layout.grid_left();
        let step_x = layout.plan.cell_width as i64 + 10;
        let step_y = layout.plan.cell_height as i64 + 10;

        assert_eq!(layout.cell_origin(0, &g), (left, 118));
        assert_eq!(layout.cell_origin(5, &g), (left + 5 * step_x, 118));
        assert_eq!(layout.cell_origin(6, &g), (left, 118 + step_y));
        assert_eq!(
            layout.cell_origin(35, &g),
            (left + 5 * step_x, 118 + 5 * step_y)
        );
    }

    #[test]
    fn grid_is_horizontally_centred() {
        let layout = layout_for("35mm-full", 36);
        // (2476 − 2240) / 2
        assert_eq!(layout.grid_left(), 118);
    }

    #[test]
    fn unclamped_cells_all_fit() {
        let g = Geometry::default();
        let layout = layout_for("35mm-full", 36);
        assert!((0..36).all(|i| layout.cell_fits(i, &g)));
    }

    #[test]
    fn clamped_rows_past_grid_bottom_do_not_fit() {
        let g = Geometry::default();
        let layout = layout_for("120-6x7", 40);
        assert!(layout.clamped);
        let fitting = (0..40).filter(|&i| layout.cell_fits(i, &g)).count() as u32;
        assert!(fitting > 0 && fitting < 40);
        // Whole rows only
        assert_eq!(fitting % layout.plan.images_per_row, 0);
        let last = fitting - 1;
        let (_, y) = layout.cell_origin(last, &g);
        assert!(y + layout.plan.cell_height as i64 <= layout.grid_bottom(&g));
        let (_, y) = layout.cell_origin(fitting, &g);
        assert!(y + layout.plan.cell_height as i64 > layout.grid_bottom(&g));
    }

    #[test]
    fn footer_top_sits_above_bottom_margin() {
        let layout = layout_for("35mm-full", 36);
        assert_eq!(
            layout.footer_top(&Geometry::default()),
            3095 - 118 - 413
        );
    }
}
