use anyhow::{Context, Result};
use ordhent_model::VocabularyEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Words scraped by one fetch run, with provenance.
///
/// This is the hand-off file between `fetch` and `translate` when the passes
/// run as separate invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordList {
    pub source: String,
    pub letters: String,
    pub fetched_at: String,
    pub words: Vec<String>,
}

impl WordList {
    pub fn new(source: &str, letters: &str, words: Vec<String>) -> Self {
        Self {
            source: source.to_string(),
            letters: letters.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
            words,
        }
    }
}

/// Write a fetched word list as pretty JSON, creating parent directories.
pub fn write_words(list: &WordList, path: &str) -> Result<()> {
    write_json(path, list)?;
    tracing::info!(path = %path, words = list.words.len(), "Wrote word list");
    Ok(())
}

pub fn read_words(path: &str) -> Result<WordList> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse word list {path}"))
}

/// Write translated entries as pretty JSON, creating parent directories.
pub fn write_vocabulary(entries: &[VocabularyEntry], path: &str) -> Result<()> {
    write_json(path, entries)?;
    tracing::info!(path = %path, entries = entries.len(), "Wrote vocabulary");
    Ok(())
}

pub fn read_vocabulary(path: &str) -> Result<Vec<VocabularyEntry>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse vocabulary {path}"))
}

fn write_json<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<()> {
    let path = Path::new(path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
