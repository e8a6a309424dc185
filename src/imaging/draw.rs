//! Raster primitives on RGB canvases.
//!
//! Coordinates are signed: shapes may start left of or above the canvas and
//! are clipped to it. Nothing here allocates.

use super::calculations::{Rect, rounded_rect_contains};
use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Mix `color` into `base` with coverage `alpha` in `0.0..=1.0`.
pub fn blend_pixel(base: &mut Rgb<u8>, color: Rgb<u8>, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        *base = color;
        return;
    }
    let inv = 1.0 - alpha;
    for idx in 0..3 {
        base[idx] = (color[idx] as f32 * alpha + base[idx] as f32 * inv)
            .round()
            .clamp(0.0, 255.0) as u8;
    }
}

/// Blend a single pixel, ignoring coordinates outside the canvas.
pub fn plot(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    blend_pixel(canvas.get_pixel_mut(x as u32, y as u32), color, alpha);
}

/// Fill the axis-aligned box `[x, x + w) × [y, y + h)`.
pub fn fill_rect(canvas: &mut RgbImage, x: i64, y: i64, w: u32, h: u32, color: Rgb<u8>) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w as i64).min(canvas.width() as i64);
    let y1 = (y + h as i64).min(canvas.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Horizontal line `thickness` pixels tall from `x0` to `x1` (exclusive).
pub fn hline(canvas: &mut RgbImage, x0: i64, x1: i64, y: i64, thickness: u32, color: Rgb<u8>) {
    if x1 <= x0 {
        return;
    }
    fill_rect(canvas, x0, y, (x1 - x0) as u32, thickness, color);
}

/// Rounded rectangle filled with `fill` and outlined 1px with `outline`.
///
/// The outline is the set of filled pixels that touch an unfilled
/// 4-neighbour, so it follows the rounded corners.
pub fn outlined_rounded_rect(
    canvas: &mut RgbImage,
    rect: Rect,
    radius: i64,
    fill: Rgb<u8>,
    outline: Rgb<u8>,
) {
    let (w, h) = (rect.width(), rect.height());
    if w <= 0 || h <= 0 {
        return;
    }
    let inside = |x: i64, y: i64| rounded_rect_contains(x, y, w, h, radius);
    for ly in 0..h {
        for lx in 0..w {
            if !inside(lx, ly) {
                continue;
            }
            let edge = !inside(lx - 1, ly)
                || !inside(lx + 1, ly)
                || !inside(lx, ly - 1)
                || !inside(lx, ly + 1);
            let color = if edge { outline } else { fill };
            plot(canvas, rect.left + lx, rect.top + ly, color, 1.0);
        }
    }
}
