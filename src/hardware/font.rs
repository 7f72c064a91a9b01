//! Glyph availability for the counter font
//!
//! Only the glyph table of a BDF font is read: the counter needs to know
//! which characters it may draw, and refuses to start when the font lacks
//! any of the ones it needs.

use std::{collections::BTreeSet, fs, path::Path};

use thiserror::Error;
use tracing::{debug, info};

/// Characters the counter ever draws
pub const COUNTER_GLYPHS: &str = "0123456789:";

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("not a BDF font (missing STARTFONT header)")]
    NotBdf,
    #[error("font is missing glyphs: {0:?}")]
    MissingGlyphs(String),
}

/// Set of drawable characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSet {
    glyphs: BTreeSet<char>,
}

impl GlyphSet {
    pub fn new(chars: &str) -> Self {
        Self {
            glyphs: chars.chars().collect(),
        }
    }

    /// The glyphs the counter needs, without consulting a font file
    pub fn counter() -> Self {
        Self::new(COUNTER_GLYPHS)
    }

    /// Load a BDF font and keep only `required` glyphs, all of which must exist
    pub fn load_bdf(path: &Path, required: &str) -> Result<Self, FontError> {
        let source = fs::read_to_string(path).map_err(|source| FontError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let glyphs = Self::parse_bdf(&source, required)?;
        info!("Loaded {} glyphs from {}", glyphs.len(), path.display());
        Ok(glyphs)
    }

    /// Parse BDF text; see [`GlyphSet::load_bdf`]
    pub fn parse_bdf(source: &str, required: &str) -> Result<Self, FontError> {
        let mut lines = source.lines().map(str::trim);
        if !lines
            .clone()
            .find(|line| !line.is_empty())
            .is_some_and(|line| line.starts_with("STARTFONT"))
        {
            return Err(FontError::NotBdf);
        }

        let available: BTreeSet<char> = lines
            .by_ref()
            .filter_map(|line| line.strip_prefix("ENCODING"))
            .filter_map(|code| code.trim().parse::<u32>().ok())
            .filter_map(char::from_u32)
            .collect();
        debug!("Font declares {} encoded glyphs", available.len());

        let missing: String = required
            .chars()
            .filter(|c| !available.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(FontError::MissingGlyphs(missing));
        }

        Ok(Self::new(required))
    }

    pub fn contains(&self, c: char) -> bool {
        self.glyphs.contains(&c)
    }

    /// First character of `text` that cannot be drawn
    pub fn first_missing(&self, text: &str) -> Option<char> {
        text.chars().find(|c| !self.contains(*c))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl Default for GlyphSet {
    fn default() -> Self {
        Self::counter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bdf(chars: &str) -> String {
        let mut font = String::from("STARTFONT 2.1\nFONT -test-\nCHARS 0\n");
        for c in chars.chars() {
            font.push_str(&format!(
                "STARTCHAR U+{:04X}\nENCODING {}\nBITMAP\n00\nENDCHAR\n",
                c as u32, c as u32
            ));
        }
        font.push_str("ENDFONT\n");
        font
    }

    #[test]
    fn test_parse_keeps_only_required_glyphs() {
        let glyphs = GlyphSet::parse_bdf(&bdf("0123456789:ABC"), COUNTER_GLYPHS).unwrap();
        assert_eq!(glyphs.len(), 11);
        assert!(glyphs.contains(':'));
        assert!(!glyphs.contains('A'));
    }

    #[test]
    fn test_parse_reports_missing_glyphs() {
        let err = GlyphSet::parse_bdf(&bdf("0123456789"), COUNTER_GLYPHS).unwrap_err();
        assert!(matches!(err, FontError::MissingGlyphs(ref m) if m == ":"));
    }

    #[test]
    fn test_parse_rejects_non_bdf() {
        let err = GlyphSet::parse_bdf("hello\nENCODING 48\n", "0").unwrap_err();
        assert!(matches!(err, FontError::NotBdf));
    }

    #[test]
    fn test_first_missing() {
        let glyphs = GlyphSet::counter();
        assert_eq!(glyphs.first_missing("04:59"), None);
        assert_eq!(glyphs.first_missing("4 59"), Some(' '));
    }
}
