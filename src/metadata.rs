//! Sheet metadata: the six free-text fields printed in the footer band.
//!
//! ## Fields
//!
//! | Key | Column | Label |
//! |-----|--------|-------|
//! | `date` | left | `Date:` |
//! | `location` | left | `Location:` |
//! | `developer` | left | `Developer:` |
//! | `camera` | right | `Camera:` |
//! | `lens` | right | `Lens:` |
//! | `film` | centred, bold | `Film:` |
//!
//! Values are pass-through strings with no validation or trimming. An absent
//! value and an empty string are the same thing: the line is left out and the
//! remaining lines in that column move up. Any other value, whitespace
//! included, is printed exactly as given.
//!
//! ## Sources
//!
//! Metadata can come from a TOML info file (`--info roll.toml`) and from
//! individual command-line flags. Each field is resolved independently; a
//! non-empty flag wins over the file.
//!
//! ```toml
//! date = "2024-05-12"
//! location = "Lisbon"
//! film = "Portra 400"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Info file parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Free-text roll information printed in the footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataInfo {
    pub date: Option<String>,
    pub location: Option<String>,
    pub developer: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub film: Option<String>,
}

/// Resolve a field from multiple sources.
///
/// Takes values in priority order and returns the first one that is present
/// and not empty, unchanged.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .flatten()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn labelled(label: &str, value: &Option<String>) -> Option<String> {
    present(value).map(|v| format!("{label}: {v}"))
}

impl MetadataInfo {
    /// Read an info file. Unknown keys are rejected.
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Field-by-field merge where non-empty values in `overrides` win.
    pub fn overlay(&self, overrides: &MetadataInfo) -> MetadataInfo {
        let pick = |over: &Option<String>, base: &Option<String>| {
            resolve(&[over.as_deref(), base.as_deref()])
        };
        MetadataInfo {
            date: pick(&overrides.date, &self.date),
            location: pick(&overrides.location, &self.location),
            developer: pick(&overrides.developer, &self.developer),
            camera: pick(&overrides.camera, &self.camera),
            lens: pick(&overrides.lens, &self.lens),
            film: pick(&overrides.film, &self.film),
        }
    }

    /// True when no field would print anything.
    pub fn is_empty(&self) -> bool {
        self.footer_lines().is_empty()
    }

    /// Labelled lines for the footer, in their fixed order with empty fields removed.
    pub fn footer_lines(&self) -> FooterLines {
        FooterLines {
            left: [
                labelled("Date", &self.date),
                labelled("Location", &self.location),
                labelled("Developer", &self.developer),
            ]
            .into_iter()
            .flatten()
            .collect(),
            right: [labelled("Camera", &self.camera), labelled("Lens", &self.lens)]
                .into_iter()
                .flatten()
                .collect(),
            film: labelled("Film", &self.film),
        }
    }
}

/// The text content of the footer band, before any positioning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterLines {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub film: Option<String>,
}

impl FooterLines {
    /// Number of text rows the taller column occupies.
    pub fn column_rows(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty() && self.film.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn info(pairs: &[(&str, &str)]) -> MetadataInfo {
        let mut m = MetadataInfo::default();
        for (key, value) in pairs {
            let v = Some(value.to_string());
            match *key {
                "date" => m.date = v,
                "location" => m.location = v,
                "developer" => m.developer = v,
                "camera" => m.camera = v,
                "lens" => m.lens = v,
                "film" => m.film = v,
                other => panic!("unknown key {other}"),
            }
        }
        m
    }

    // =========================================================================
    // resolve()
    // =========================================================================

    #[test]
    fn resolve_first_wins() {
        assert_eq!(resolve(&[Some("a"), Some("b")]), Some("a".into()));
    }

    #[test]
    fn resolve_skips_none_and_empty() {
        assert_eq!(resolve(&[None, Some(""), Some("c")]), Some("c".into()));
    }

    #[test]
    fn resolve_all_empty() {
        assert_eq!(resolve(&[None, Some("")]), None);
        assert_eq!(resolve(&[]), None);
    }

    #[test]
    fn resolve_keeps_values_verbatim() {
        assert_eq!(resolve(&[Some("  Portra 400 ")]), Some("  Portra 400 ".into()));
        assert_eq!(resolve(&[Some(" "), Some("c")]), Some(" ".into()));
    }

    // =========================================================================
    // Footer lines
    // =========================================================================

    #[test]
    fn full_metadata_lines() {
        let m = info(&[
            ("date", "2024-05-12"),
            ("location", "Lisbon"),
            ("developer", "Rodinal 1+50"),
            ("camera", "Nikon FM2"),
            ("lens", "50mm f/1.8"),
            ("film", "Tri-X 400"),
        ]);
        let lines = m.footer_lines();
        assert_eq!(
            lines.left,
            vec!["Date: 2024-05-12", "Location: Lisbon", "Developer: Rodinal 1+50"]
        );
        assert_eq!(lines.right, vec!["Camera: Nikon FM2", "Lens: 50mm f/1.8"]);
        assert_eq!(lines.film.as_deref(), Some("Film: Tri-X 400"));
        assert_eq!(lines.column_rows(), 3);
    }

    #[test]
    fn missing_fields_close_up() {
        let m = info(&[("developer", "D-76"), ("lens", "28mm")]);
        let lines = m.footer_lines();
        assert_eq!(lines.left, vec!["Developer: D-76"]);
        assert_eq!(lines.right, vec!["Lens: 28mm"]);
        assert_eq!(lines.film, None);
        assert_eq!(lines.column_rows(), 1);
    }

    #[test]
    fn empty_string_is_absent() {
        let m = info(&[("date", ""), ("camera", ""), ("film", "HP5")]);
        let lines = m.footer_lines();
        assert!(lines.left.is_empty());
        assert!(lines.right.is_empty());
        assert_eq!(lines.film.as_deref(), Some("Film: HP5"));
        assert_eq!(lines.column_rows(), 0);
    }

    #[test]
    fn whitespace_values_print_as_given() {
        let m = info(&[("location", " Lisbon "), ("camera", "   ")]);
        let lines = m.footer_lines();
        assert_eq!(lines.left, vec!["Location:  Lisbon "]);
        assert_eq!(lines.right, vec!["Camera:    "]);
        assert_eq!(lines.column_rows(), 1);
    }

    #[test]
    fn default_is_empty() {
        assert!(MetadataInfo::default().is_empty());
        assert!(info(&[("date", "")]).is_empty());
        assert!(!info(&[("date", " ")]).is_empty());
        assert!(!info(&[("lens", "35mm")]).is_empty());
    }

    // =========================================================================
    // Overlay and loading
    // =========================================================================

    #[test]
    fn overlay_prefers_non_empty_overrides() {
        let file = info(&[("date", "2024-01-01"), ("film", "Portra 160")]);
        let flags = info(&[("film", "Ektar 100"), ("date", "")]);
        let merged = file.overlay(&flags);
        assert_eq!(merged.date.as_deref(), Some("2024-01-01"));
        assert_eq!(merged.film.as_deref(), Some("Ektar 100"));
        assert_eq!(merged.camera, None);
    }

    #[test]
    fn load_info_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("roll.toml");
        fs::write(&path, "date = \"2024-05-12\"\nfilm = \"Portra 400\"\n").unwrap();

        let m = MetadataInfo::load(&path).unwrap();
        assert_eq!(m.date.as_deref(), Some("2024-05-12"));
        assert_eq!(m.film.as_deref(), Some("Portra 400"));
        assert_eq!(m.location, None);
    }

    #[test]
    fn load_info_rejects_unknown_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("roll.toml");
        fs::write(&path, "iso = 400\n").unwrap();
        assert!(matches!(
            MetadataInfo::load(&path),
            Err(MetadataError::Toml(_))
        ));
    }

    #[test]
    fn load_info_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            MetadataInfo::load(&tmp.path().join("none.toml")),
            Err(MetadataError::Io(_))
        ));
    }
}
