use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use legalex_core::{DocumentInput, Page};

/// Page separator written by `pdftotext`.
pub const FORM_FEED: char = '\x0C';

const SUPPORTED_EXTENSIONS: &[&str] = &["json", "txt"];

/// Expand directory arguments to their supported files, in name order.
/// Explicit file arguments are kept as given.
pub fn collect_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut collected = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = std::fs::read_dir(path)
                .with_context(|| format!("reading directory {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_supported(p))
                .collect::<Vec<_>>();
            entries.sort();
            collected.extend(entries);
        } else if path.exists() {
            collected.push(path.clone());
        } else {
            bail!("input not found: {}", path.display());
        }
    }
    Ok(collected)
}

fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Document name used when the input does not carry one: the file stem.
fn default_name(path: &Path) -> String {
    path.file_stem().map_or_else(
        || path.display().to_string(),
        |s| s.to_string_lossy().into_owned(),
    )
}

pub fn load_document(path: &Path) -> Result<DocumentInput> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    match extension(path).as_deref() {
        Some("json") => {
            let mut input: DocumentInput =
                serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
            if input.name.trim().is_empty() {
                input.name = default_name(path);
            }
            Ok(input)
        }
        Some("txt") => Ok(DocumentInput::new(default_name(path), pages_from_text(&content))),
        _ => bail!("unsupported input type: {}", path.display()),
    }
}

/// Split text on form feeds into 1-indexed pages. The empty piece after a
/// trailing form feed is not a page.
#[must_use]
pub fn pages_from_text(text: &str) -> Vec<Page> {
    let mut pieces: Vec<&str> = text.split(FORM_FEED).collect();
    if pieces.len() > 1 && pieces.last().is_some_and(|p| p.trim().is_empty()) {
        pieces.pop();
    }
    pieces
        .into_iter()
        .zip(1u32..)
        .map(|(text, number)| Page::new(number, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn form_feeds_split_pages() {
        let pages = pages_from_text("first\x0Csecond\x0C");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], Page::new(2, "second"));
        assert_eq!(pages_from_text("").len(), 1);
    }

    #[test]
    fn directories_expand_in_name_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.txt", "a.json", "notes.md"] {
            std::fs::write(tmp.path().join(name), "x").unwrap();
        }
        let paths = collect_paths(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.txt"]);
    }

    #[test]
    fn missing_input_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(collect_paths(&[tmp.path().join("absent.json")]).is_err());
    }

    #[test]
    fn json_name_defaults_to_stem() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("decree.json");
        std::fs::write(&path, r#"{"pages": [{"page_number": 1, "text": "hello"}]}"#).unwrap();
        let input = load_document(&path).unwrap();
        assert_eq!(input.name, "decree");
        assert_eq!(input.pages.len(), 1);
        assert!(input.ai_citations.is_empty());
    }
}
