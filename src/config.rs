//! Sheet configuration module.
//!
//! Every physical constant the layout engine, compositor and exporter use is
//! a named option here. Nothing in the algorithm modules hard-codes a
//! millimetre value: they read a [`SheetConfig`] (usually through
//! [`crate::layout::Geometry`], which converts it to pixels once).
//!
//! ## Config File
//!
//! Pass `--config sheet.toml` on the command line. The file is sparse:
//! override just the values you want, everything else keeps the stock
//! default shown below.
//!
//! ```toml
//! [page]
//! dpi = 300                 # Resolution every mm value is converted at
//! width_mm = 210.0          # Page-width basis used to size the grid cells
//! max_width_mm = 210.0      # Largest canvas allowed (A4)
//! max_height_mm = 297.0
//! aspect_ratio = [4, 5]     # Target canvas ratio, width:height
//! margin_mm = 10.0
//! footer_height_mm = 35.0   # Metadata band at the bottom
//! section_gap_mm = 6.0      # Unified gap between grid, separator and text
//! separator_width_px = 2
//!
//! [grid]
//! cell_gap_px = 10          # Gap between neighbouring thumbnails
//! min_cell_width_mm = 30.0  # Floor for very dense formats
//!
//! [text]
//! body_pt = 14.0
//! film_pt = 16.0
//! line_height_pt = 18.0
//! film_line_pt = 20.0       # Height budget for the film line fit check
//! badge_px = 20.0           # Sequence number size
//! badge_padding_px = 5
//! column_align = "start"    # "start" or "center"
//! font_paths = []           # Extra font files tried before system fonts
//!
//! [export]
//! jpeg_quality = 95
//! pdf_page_mm = [210.0, 297.0]
//!
//! [processing]
//! max_processes = 4         # Max parallel decoders (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Sheet configuration loaded from a TOML file.
///
/// All fields have defaults matching a 300 dpi A4 sheet at 4:5. User config
/// files need only specify the values they want to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Page geometry: resolution, margins, footer band, target ratio.
    pub page: PageConfig,
    /// Thumbnail grid spacing.
    pub grid: GridConfig,
    /// Footer and badge typography.
    pub text: TextConfig,
    /// Output encoder settings.
    pub export: ExportConfig,
    /// Parallel decode settings.
    pub processing: ProcessingConfig,
}

impl SheetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let page = &self.page;
        if page.dpi == 0 {
            return Err(ConfigError::Validation("page.dpi must be non-zero".into()));
        }
        if page.aspect_ratio[0] == 0 || page.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "page.aspect_ratio values must be non-zero".into(),
            ));
        }
        for (name, value) in [
            ("page.width_mm", page.width_mm),
            ("page.max_width_mm", page.max_width_mm),
            ("page.max_height_mm", page.max_height_mm),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        for (name, value) in [
            ("page.margin_mm", page.margin_mm),
            ("page.footer_height_mm", page.footer_height_mm),
            ("page.section_gap_mm", page.section_gap_mm),
            ("grid.min_cell_width_mm", self.grid.min_cell_width_mm),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must not be negative"
                )));
            }
        }
        if 2.0 * page.margin_mm >= page.width_mm {
            return Err(ConfigError::Validation(
                "page.margin_mm leaves no drawable width".into(),
            ));
        }
        if self.grid.min_cell_width_mm == 0.0 {
            return Err(ConfigError::Validation(
                "grid.min_cell_width_mm must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(ConfigError::Validation(
                "export.jpeg_quality must be 1-100".into(),
            ));
        }
        if !(self.export.pdf_page_mm[0] > 0.0 && self.export.pdf_page_mm[1] > 0.0) {
            return Err(ConfigError::Validation(
                "export.pdf_page_mm values must be positive".into(),
            ));
        }
        let text = &self.text;
        for (name, value) in [
            ("text.body_pt", text.body_pt),
            ("text.film_pt", text.film_pt),
            ("text.line_height_pt", text.line_height_pt),
            ("text.badge_px", text.badge_px),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// Page geometry, in millimetres unless the field name says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Resolution used for every mm → px conversion.
    pub dpi: u32,
    /// Page-width basis the grid cells are sized against.
    pub width_mm: f64,
    /// Maximum canvas width before the clamp engages.
    pub max_width_mm: f64,
    /// Maximum canvas height before the clamp engages.
    pub max_height_mm: f64,
    /// Target canvas aspect ratio as `[width, height]`.
    pub aspect_ratio: [u32; 2],
    /// Outer margin on all four sides.
    pub margin_mm: f64,
    /// Height of the metadata band at the bottom of the sheet.
    pub footer_height_mm: f64,
    /// Unified gap between the grid, the separator line and the footer text.
    pub section_gap_mm: f64,
    /// Thickness of the separator line above the footer, in pixels.
    pub separator_width_px: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            width_mm: 210.0,
            max_width_mm: 210.0,
            max_height_mm: 297.0,
            aspect_ratio: [4, 5],
            margin_mm: 10.0,
            footer_height_mm: 35.0,
            section_gap_mm: 6.0,
            separator_width_px: 2,
        }
    }
}

/// Thumbnail grid spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Gap between neighbouring cells, in pixels (not DPI-scaled).
    pub cell_gap_px: u32,
    /// Minimum cell width, so twelve-across formats stay legible.
    pub min_cell_width_mm: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_gap_px: 10,
            min_cell_width_mm: 30.0,
        }
    }
}

/// Horizontal placement of the footer columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    /// Left column starts at the margin, right column at the midpoint.
    #[default]
    Start,
    /// Each line is centred within its half of the drawable width.
    Center,
}

/// Footer and badge typography. Sizes in points unless suffixed `_px`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    /// Size of the left/right column text.
    pub body_pt: f64,
    /// Size of the bold film line.
    pub film_pt: f64,
    /// Distance between consecutive column rows.
    pub line_height_pt: f64,
    /// Height the film line needs below its top to count as fitting.
    pub film_line_pt: f64,
    /// Pixel size of the sequence number inside each badge.
    pub badge_px: f64,
    /// Distance from the thumbnail's top-left corner to the number.
    pub badge_padding_px: u32,
    /// How the two metadata columns are positioned.
    pub column_align: ColumnAlign,
    /// Font files tried before the built-in system list.
    pub font_paths: Vec<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            body_pt: 14.0,
            film_pt: 16.0,
            line_height_pt: 18.0,
            film_line_pt: 20.0,
            badge_px: 20.0,
            badge_padding_px: 5,
            column_align: ColumnAlign::Start,
            font_paths: Vec::new(),
        }
    }
}

/// Output encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// JPEG quality (1 = worst, 100 = best).
    pub jpeg_quality: u8,
    /// PDF page size as `[width, height]` in millimetres.
    pub pdf_page_mm: [f64; 2],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            pdf_page_mm: [210.0, 297.0],
        }
    }
}

/// Parallel decode settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image decoders.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SheetConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SheetConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SheetConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the sheet config.
///
/// With `None`, returns the validated stock defaults. With a path, merges the
/// file on top of the defaults, rejects unknown keys and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<SheetConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Contact Sheet Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# Millimetre values are converted to pixels as round(mm * dpi / 25.4).

# ---------------------------------------------------------------------------
# Page geometry
# ---------------------------------------------------------------------------
[page]
# Resolution every physical size is converted at.
dpi = 300

# Page-width basis used to size the thumbnail cells.
width_mm = 210.0

# Largest canvas allowed. Bigger layouts are scaled down to this box at the
# target ratio, which may no longer fit every row.
max_width_mm = 210.0
max_height_mm = 297.0

# Target canvas ratio as [width, height].
aspect_ratio = [4, 5]

# Outer margin on all sides.
margin_mm = 10.0

# Metadata band at the bottom of the sheet.
footer_height_mm = 35.0

# Unified gap between the grid, the separator line and the footer text.
section_gap_mm = 6.0

# Separator line thickness in pixels.
separator_width_px = 2

# ---------------------------------------------------------------------------
# Thumbnail grid
# ---------------------------------------------------------------------------
[grid]
# Gap between neighbouring thumbnails, in pixels.
cell_gap_px = 10

# Cells never get narrower than this, however many fit on a row.
min_cell_width_mm = 30.0

# ---------------------------------------------------------------------------
# Typography
# ---------------------------------------------------------------------------
[text]
body_pt = 14.0
film_pt = 16.0
line_height_pt = 18.0

# The film line is only drawn when this much height is left above the margin.
film_line_pt = 20.0

# Sequence number badge in the top-left corner of every thumbnail.
badge_px = 20.0
badge_padding_px = 5

# "start": left column at the margin, right column at the midpoint.
# "center": each line centred within its half.
column_align = "start"

# Font files tried before the system sans-serif list.
font_paths = []

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
jpeg_quality = 95

# PDF page size as [width, height] in millimetres.
pdf_page_mm = [210.0, 297.0]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image decoders.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
