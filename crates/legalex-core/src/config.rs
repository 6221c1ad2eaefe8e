use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const CITATION_MIN_CHARS: usize = 20;
pub const CITATION_MAX_CHARS: usize = 200;
/// Citations starting inside this many bytes of a page may be running headers.
pub const HEADER_ZONE_CHARS: usize = 200;
/// Text before a header-zone citation shorter than this marks it as a header.
pub const HEADER_PREFIX_MAX_CHARS: usize = 50;
pub const CONTEXT_RADIUS_CHARS: usize = 100;
pub const HEADER_LINE_MAX_CHARS: usize = 80;
pub const FOOTER_LINE_MAX_CHARS: usize = 10;
pub const EDGE_SCAN_LINES: usize = 3;
pub const MIN_LINES_FOR_EDGE_STRIP: usize = 10;
pub const DEFINITION_SCAN_PAGES: usize = 15;
/// Pages after the section start that still belong to a definitions section.
pub const DEFINITION_SECTION_SPAN: u32 = 5;
pub const MEANS_DENSITY_THRESHOLD: usize = 3;
pub const COLON_DENSITY_THRESHOLD: usize = 5;
pub const CITATION_OVERLAP_THRESHOLD: f64 = 0.85;
pub const DEFINITION_OVERLAP_THRESHOLD: f64 = 0.90;
pub const REVIEW_THRESHOLD: f64 = 0.7;

/// Trailing page-footer fragments that bleed into definitions when a
/// definition runs across a page break. Corpus specific.
pub const DEFAULT_FOOTER_PATTERNS: &[&str] = &[
    r"(?i)\s+Federal Decree-Law of \d{4} on .+$",
    r"(?i)\s+Federal Decree of \d{4} on .+$",
    r"(?i)\s+Cabinet Resolution of \d{4} regarding .+$",
    r"\s+Federal Decree[- ]?Law of \d{4}[^.]*\d+\s*$",
    r"\s+Cabinet Resolution of \d{4}[^.]*\d+\s*$",
    r"\s+Federal Decree-Law of \d{4} On [A-Z][^.]*$",
];

/// Tunables for extraction, merging and review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub citation_min_chars: usize,
    pub citation_max_chars: usize,
    pub header_zone_chars: usize,
    pub header_prefix_max_chars: usize,
    pub context_radius_chars: usize,
    pub header_line_max_chars: usize,
    pub footer_line_max_chars: usize,
    pub edge_scan_lines: usize,
    pub min_lines_for_edge_strip: usize,
    pub definition_scan_pages: usize,
    pub definition_section_span: u32,
    pub means_density_threshold: usize,
    pub colon_density_threshold: usize,
    pub citation_overlap_threshold: f64,
    pub definition_overlap_threshold: f64,
    pub review_threshold: f64,
    /// Use an embedding backend for similarity when one is registered.
    pub use_embeddings: bool,
    pub footer_patterns: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            citation_min_chars: CITATION_MIN_CHARS,
            citation_max_chars: CITATION_MAX_CHARS,
            header_zone_chars: HEADER_ZONE_CHARS,
            header_prefix_max_chars: HEADER_PREFIX_MAX_CHARS,
            context_radius_chars: CONTEXT_RADIUS_CHARS,
            header_line_max_chars: HEADER_LINE_MAX_CHARS,
            footer_line_max_chars: FOOTER_LINE_MAX_CHARS,
            edge_scan_lines: EDGE_SCAN_LINES,
            min_lines_for_edge_strip: MIN_LINES_FOR_EDGE_STRIP,
            definition_scan_pages: DEFINITION_SCAN_PAGES,
            definition_section_span: DEFINITION_SECTION_SPAN,
            means_density_threshold: MEANS_DENSITY_THRESHOLD,
            colon_density_threshold: COLON_DENSITY_THRESHOLD,
            citation_overlap_threshold: CITATION_OVERLAP_THRESHOLD,
            definition_overlap_threshold: DEFINITION_OVERLAP_THRESHOLD,
            review_threshold: REVIEW_THRESHOLD,
            use_embeddings: true,
            footer_patterns: DEFAULT_FOOTER_PATTERNS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ExtractionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path if given, else the user config file if it exists, else
    /// defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading user config");
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env()?;
        Ok(config)
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("legalex").join("config.json"))
    }

    /// Override fields from `LEGALEX_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_f64("LEGALEX_REVIEW_THRESHOLD")? {
            self.review_threshold = v;
        }
        if let Some(v) = env_f64("LEGALEX_CITATION_OVERLAP_THRESHOLD")? {
            self.citation_overlap_threshold = v;
        }
        if let Some(v) = env_f64("LEGALEX_DEFINITION_OVERLAP_THRESHOLD")? {
            self.definition_overlap_threshold = v;
        }
        if let Ok(v) = std::env::var("LEGALEX_USE_EMBEDDINGS") {
            self.use_embeddings = v == "1" || v.eq_ignore_ascii_case("true");
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("citation_overlap_threshold", self.citation_overlap_threshold),
            ("definition_overlap_threshold", self.definition_overlap_threshold),
            ("review_threshold", self.review_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        if self.citation_min_chars > self.citation_max_chars {
            return Err(Error::InvalidConfig(format!(
                "citation_min_chars ({}) exceeds citation_max_chars ({})",
                self.citation_min_chars, self.citation_max_chars
            )));
        }
        Ok(())
    }
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{key} is not a number: {raw}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_named_constants() {
        let config = ExtractionConfig::default();
        assert_eq!(config.citation_min_chars, 20);
        assert_eq!(config.citation_max_chars, 200);
        assert_eq!(config.header_zone_chars, 200);
        assert!((config.review_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.footer_patterns.len(), DEFAULT_FOOTER_PATTERNS.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"review_threshold": 0.5, "use_embeddings": false}}"#).unwrap();

        let config = ExtractionConfig::from_file(&path).unwrap();
        assert!((config.review_threshold - 0.5).abs() < f64::EPSILON);
        assert!(!config.use_embeddings);
        assert_eq!(config.definition_scan_pages, DEFINITION_SCAN_PAGES);
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let config = ExtractionConfig {
            citation_overlap_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = ExtractionConfig {
            citation_min_chars: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
