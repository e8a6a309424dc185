//! Pure calculation functions for thumbnail and badge geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` to fit inside `target` while preserving its aspect ratio.
///
/// Never upscales: a source that already fits is returned unchanged. The
/// result is at least 1×1 so a degenerate target still yields an image.
///
/// # Examples
/// ```
/// # use contact_sheet::imaging::calculations::fit_within;
/// // 3:2 landscape into a square box: width-limited
/// assert_eq!(fit_within((600, 400), (300, 300)), (300, 200));
///
/// // Smaller than the box: untouched
/// assert_eq!(fit_within((120, 80), (300, 300)), (120, 80));
/// ```
pub fn fit_within(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    if src_w <= tgt_w && src_h <= tgt_h {
        return (src_w.max(1), src_h.max(1));
    }

    let scale = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, tgt_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, tgt_h.max(1));
    (w, h)
}

/// Offset that centres `inner` inside `outer` (floor division).
pub fn center_offset(inner: (u32, u32), outer: (u32, u32)) -> (i64, i64) {
    (
        (outer.0 as i64 - inner.0 as i64).div_euclid(2),
        (outer.1 as i64 - inner.1 as i64).div_euclid(2),
    )
}

/// An axis-aligned rectangle with inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Rect {
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top + 1
    }
}

/// Inner margin between the badge outline and the number.
pub const BADGE_INSET: i64 = 2;

/// Corner radius of the badge background.
pub const BADGE_RADIUS: i64 = 3;

/// Badge box for a number whose rendered size is `text` (width, height),
/// drawn with its top-left at `(padding, padding)`.
pub fn badge_rect(text: (u32, u32), padding: u32) -> Rect {
    let pad = padding as i64;
    Rect {
        left: pad - BADGE_INSET,
        top: pad - BADGE_INSET,
        right: pad + text.0 as i64 + BADGE_INSET,
        bottom: pad + text.1 as i64 + BADGE_INSET,
    }
}

/// Whether `(x, y)`, relative to a `w`×`h` box, lies inside a rounded
/// rectangle of corner radius `r`.
pub fn rounded_rect_contains(x: i64, y: i64, w: i64, h: i64, r: i64) -> bool {
    if x < 0 || y < 0 || x >= w || y >= h {
        return false;
    }
    let r = r.min(w / 2).min(h / 2);
    if (x >= r && x < w - r) || (y >= r && y < h - r) {
        return true;
    }
    let cx = if x < r { r } else { w - 1 - r };
    let cy = if y < r { r } else { h - 1 - r };
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= r * r
}
