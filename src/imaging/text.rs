//! Text measurement and drawing for the footer and the sequence badges.
//!
//! ## Font resolution
//!
//! A [`FontSet`] holds a regular and a bold [`Typeface`]. Loading tries, in
//! order:
//!
//! 1. Files listed in `text.font_paths` (regular face only).
//! 2. Well-known system sans-serif files: the Helvetica collection on macOS,
//!    DejaVu Sans and Liberation Sans on Linux, Arial on Windows.
//! 3. A built-in 5×7 bitmap face, scaled to the requested pixel size.
//!
//! The bold face is looked up separately. When none is found the regular
//! face is drawn twice, one pixel apart.
//!
//! Outline fonts are rasterized with `rusttype` and alpha-blended onto the
//! canvas. All positions are the top-left corner of the text's line box:
//! ascent above the baseline, descent below.

use super::draw::plot;
use image::{Rgb, RgbImage};
use rusttype::{Font, Scale, point};
use std::path::{Path, PathBuf};

/// `(path, face index)` pairs tried for the regular face.
const SYSTEM_REGULAR: &[(&str, u32)] = &[
    ("/System/Library/Fonts/Helvetica.ttc", 0),
    ("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", 0),
    ("/usr/share/fonts/TTF/DejaVuSans.ttf", 0),
    ("/usr/share/fonts/dejavu/DejaVuSans.ttf", 0),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        0,
    ),
    ("C:\\Windows\\Fonts\\arial.ttf", 0),
];

/// `(path, face index)` pairs tried for the bold face.
const SYSTEM_BOLD: &[(&str, u32)] = &[
    ("/System/Library/Fonts/Helvetica.ttc", 1),
    ("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf", 0),
    ("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf", 0),
    ("/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf", 0),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        0,
    ),
    ("C:\\Windows\\Fonts\\arialbd.ttf", 0),
];

/// A single face that can measure and draw a line of text.
pub enum Typeface {
    Outline(Box<Font<'static>>),
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::Outline(_) => f.write_str("Outline"),
            Typeface::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Typeface {
    /// Load face `index` of a font file, `None` if it is missing or unparsable.
    pub fn from_file(path: &Path, index: u32) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        let font = Font::try_from_vec_and_index(bytes, index)?;
        tracing::debug!(path = %path.display(), index, "loaded font");
        Some(Typeface::Outline(Box::new(font)))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Builtin)
    }

    /// Rendered `(width, height)` of `text` at `px` pixels.
    ///
    /// Height is the full line box (ascent + descent), independent of which
    /// glyphs appear, so rows of text line up.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        match self {
            Typeface::Outline(font) => {
                let scale = Scale::uniform(px);
                let v = font.v_metrics(scale);
                let height = (v.ascent - v.descent).ceil().max(0.0) as u32;
                let width = font
                    .layout(text, scale, point(0.0, v.ascent))
                    .last()
                    .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                    .unwrap_or(0.0);
                (width.ceil().max(0.0) as u32, height)
            }
            Typeface::Builtin => builtin::measure(text, px),
        }
    }

    /// Draw `text` with its line box's top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbImage, text: &str, px: f32, x: i64, y: i64, color: Rgb<u8>) {
        match self {
            Typeface::Outline(font) => {
                let scale = Scale::uniform(px);
                let v = font.v_metrics(scale);
                for glyph in font.layout(text, scale, point(x as f32, y as f32 + v.ascent)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            let cx = bb.min.x as i64 + gx as i64;
                            let cy = bb.min.y as i64 + gy as i64;
                            plot(canvas, cx, cy, color, coverage);
                        });
                    }
                }
            }
            Typeface::Builtin => builtin::draw(canvas, text, px, x, y, color),
        }
    }
}

/// Regular and bold faces used for one render.
#[derive(Debug)]
pub struct FontSet {
    pub regular: Typeface,
    pub bold: Typeface,
    /// Bold is the regular face drawn twice.
    pub synthetic_bold: bool,
}

impl FontSet {
    /// Resolve fonts from `extra` paths, then the system list, then the
    /// built-in face. Never fails.
    pub fn load(extra: &[PathBuf]) -> Self {
        let from_config = extra.iter().find_map(|p| Typeface::from_file(p, 0));
        let user_regular = from_config.is_some();
        let regular = from_config.or_else(|| first_loadable(SYSTEM_REGULAR));

        let Some(regular) = regular else {
            tracing::warn!("no system font found; using the built-in bitmap font");
            return Self::builtin();
        };

        // A user-chosen face is emboldened rather than mixed with a system bold.
        let bold = if user_regular {
            None
        } else {
            first_loadable(SYSTEM_BOLD)
        };
        match bold {
            Some(bold) => Self {
                regular,
                bold,
                synthetic_bold: false,
            },
            None => Self::with_synthetic_bold(regular),
        }
    }

    /// Only the built-in bitmap face. Deterministic across machines.
    pub fn builtin() -> Self {
        Self::with_synthetic_bold(Typeface::Builtin)
    }

    fn with_synthetic_bold(regular: Typeface) -> Self {
        Self {
            regular,
            bold: Typeface::Builtin,
            synthetic_bold: true,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.regular.is_builtin()
    }

    fn bold_face(&self) -> &Typeface {
        if self.synthetic_bold {
            &self.regular
        } else {
            &self.bold
        }
    }

    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        self.regular.measure(text, px)
    }

    pub fn measure_bold(&self, text: &str, px: f32) -> (u32, u32) {
        let (w, h) = self.bold_face().measure(text, px);
        (w + self.synthetic_bold as u32, h)
    }

    pub fn draw(&self, canvas: &mut RgbImage, text: &str, px: f32, x: i64, y: i64, color: Rgb<u8>) {
        self.regular.draw(canvas, text, px, x, y, color);
    }

    pub fn draw_bold(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        px: f32,
        x: i64,
        y: i64,
        color: Rgb<u8>,
    ) {
        let face = self.bold_face();
        face.draw(canvas, text, px, x, y, color);
        if self.synthetic_bold {
            face.draw(canvas, text, px, x + 1, y, color);
        }
    }
}

fn first_loadable(candidates: &[(&str, u32)]) -> Option<Typeface> {
    candidates
        .iter()
        .find_map(|(path, index)| Typeface::from_file(Path::new(path), *index))
}

/// Built-in 5×7 bitmap face for printable ASCII.
mod builtin {
    use super::plot;
    use image::{Rgb, RgbImage};

    const FIRST: u32 = 0x20;
    const GLYPH_W: i64 = 5;
    const GLYPH_H: i64 = 7;
    /// Horizontal advance per character, in font units.
    const ADVANCE: i64 = 6;
    /// Line box height, in font units.
    const LINE: i64 = 8;

    /// Column-major glyph bitmaps, bit 0 = top row.
    #[rustfmt::skip]
    const GLYPHS: [[u8; 5]; 95] = [
        [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
        [0x00, 0x00, 0x5F, 0x00, 0x00], // !
        [0x00, 0x07, 0x00, 0x07, 0x00], // "
        [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
        [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
        [0x23, 0x13, 0x08, 0x64, 0x62], // %
        [0x36, 0x49, 0x55, 0x22, 0x50], // &
        [0x00, 0x05, 0x03, 0x00, 0x00], // '
        [0x00, 0x1C, 0x22, 0x41, 0x00], // (
        [0x00, 0x41, 0x22, 0x1C, 0x00], // )
        [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
        [0x08, 0x08, 0x3E, 0x08, 0x08], // +
        [0x00, 0x50, 0x30, 0x00, 0x00], // ,
        [0x08, 0x08, 0x08, 0x08, 0x08], // -
        [0x00, 0x60, 0x60, 0x00, 0x00], // .
        [0x20, 0x10, 0x08, 0x04, 0x02], // /
        [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
        [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
        [0x42, 0x61, 0x51, 0x49, 0x46], // 2
        [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
        [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
        [0x27, 0x45, 0x45, 0x45, 0x39], // 5
        [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
        [0x01, 0x71, 0x09, 0x05, 0x03], // 7
        [0x36, 0x49, 0x49, 0x49, 0x36], // 8
        [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
        [0x00, 0x36, 0x36, 0x00, 0x00], // :
        [0x00, 0x56, 0x36, 0x00, 0x00], // ;
        [0x08, 0x14, 0x22, 0x41, 0x00], // <
        [0x14, 0x14, 0x14, 0x14, 0x14], // =
        [0x00, 0x41, 0x22, 0x14, 0x08], // >
        [0x02, 0x01, 0x51, 0x09, 0x06], // ?
        [0x32, 0x49, 0x79, 0x41, 0x3E], // @
        [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
        [0x7F, 0x49, 0x49, 0x49, 0x36], // B
        [0x3E, 0x41, 0x41, 0x41, 0x22], // C
        [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
        [0x7F, 0x49, 0x49, 0x49, 0x41], // E
        [0x7F, 0x09, 0x09, 0x09, 0x01], // F
        [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
        [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
        [0x00, 0x41, 0x7F, 0x41, 0x00], // I
        [0x20, 0x40, 0x41, 0x3F, 0x01], // J
        [0x7F, 0x08, 0x14, 0x22, 0x41], // K
        [0x7F, 0x40, 0x40, 0x40, 0x40], // L
        [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
        [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
        [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
        [0x7F, 0x09, 0x09, 0x09, 0x06], // P
        [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
        [0x7F, 0x09, 0x19, 0x29, 0x46], // R
        [0x46, 0x49, 0x49, 0x49, 0x31], // S
        [0x01, 0x01, 0x7F, 0x01, 0x01], // T
        [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
        [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
        [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
        [0x63, 0x14, 0x08, 0x14, 0x63], // X
        [0x07, 0x08, 0x70, 0x08, 0x07], // Y
        [0x61, 0x51, 0x49, 0x45, 0x43], // Z
        [0x00, 0x7F, 0x41, 0x41, 0x00], // [
        [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
        [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
        [0x04, 0x02, 0x01, 0x02, 0x04], // ^
        [0x40, 0x40, 0x40, 0x40, 0x40], // _
        [0x00, 0x01, 0x02, 0x04, 0x00], // `
        [0x20, 0x54, 0x54, 0x54, 0x78], // a
        [0x7F, 0x48, 0x44, 0x44, 0x38], // b
        [0x38, 0x44, 0x44, 0x44, 0x20], // c
        [0x38, 0x44, 0x44, 0x48, 0x7F], // d
        [0x38, 0x54, 0x54, 0x54, 0x18], // e
        [0x08, 0x7E, 0x09, 0x01, 0x02], // f
        [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
        [0x7F, 0x08, 0x04, 0x04, 0x78], // h
        [0x00, 0x44, 0x7D, 0x40, 0x00], // i
        [0x20, 0x40, 0x44, 0x3D, 0x00], // j
        [0x7F, 0x10, 0x28, 0x44, 0x00], // k
        [0x00, 0x41, 0x7F, 0x40, 0x00], // l
        [0x7C, 0x04, 0x18, 0x04, 0x78], // m
        [0x7C, 0x08, 0x04, 0x04, 0x78], // n
        [0x38, 0x44, 0x44, 0x44, 0x38], // o
        [0x7C, 0x14, 0x14, 0x14, 0x08], // p
        [0x08, 0x14, 0x14, 0x18, 0x7C], // q
        [0x7C, 0x08, 0x04, 0x04, 0x08], // r
        [0x48, 0x54, 0x54, 0x54, 0x20], // s
        [0x04, 0x3F, 0x44, 0x40, 0x20], // t
        [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
        [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
        [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
        [0x44, 0x28, 0x10, 0x28, 0x44], // x
        [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
        [0x44, 0x64, 0x54, 0x4C, 0x44], // z
        [0x00, 0x08, 0x36, 0x41, 0x00], // {
        [0x00, 0x00, 0x7F, 0x00, 0x00], // |
        [0x00, 0x41, 0x36, 0x08, 0x00], // }
        [0x08, 0x04, 0x08, 0x10, 0x08], // ~
    ];

    /// Integer magnification for a requested pixel size.
    pub fn scale_for(px: f32) -> i64 {
        ((px / LINE as f32).round() as i64).max(1)
    }

    fn glyph(ch: char) -> &'static [u8; 5] {
        let code = ch as u32;
        let index = if (FIRST..FIRST + GLYPHS.len() as u32).contains(&code) {
            code - FIRST
        } else {
            '?' as u32 - FIRST
        };
        &GLYPHS[index as usize]
    }

    pub fn measure(text: &str, px: f32) -> (u32, u32) {
        let s = scale_for(px);
        let chars = text.chars().count() as i64;
        let width = if chars == 0 {
            0
        } else {
            (chars * ADVANCE - (ADVANCE - GLYPH_W)) * s
        };
        (width as u32, (LINE * s) as u32)
    }

    pub fn draw(canvas: &mut RgbImage, text: &str, px: f32, x: i64, y: i64, color: Rgb<u8>) {
        let s = scale_for(px);
        for (i, ch) in text.chars().enumerate() {
            let origin_x = x + i as i64 * ADVANCE * s;
            for (col, bits) in glyph(ch).iter().enumerate() {
                for row in 0..GLYPH_H {
                    if bits & (1 << row) == 0 {
                        continue;
                    }
                    let gx = origin_x + col as i64 * s;
                    let gy = y + row * s;
                    for dy in 0..s {
                        for dx in 0..s {
                            plot(canvas, gx + dx, gy + dy, color, 1.0);
                        }
                    }
                }
            }
        }
    }
}
