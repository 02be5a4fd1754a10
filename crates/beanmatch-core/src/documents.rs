//! Loads catalog records from JSON-lines files.
//!
//! Each non-blank line is one `Document` object:
//! `{"id": "review_0", "text": "...", "metadata": {"roast": "Light", ...}}`.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::Document;

#[derive(Default)]
pub struct DocumentLoader {
    limit: Option<usize>,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `limit` documents.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    /// Loads a single `.jsonl` file, or every `.jsonl` file under a directory
    /// in sorted path order.
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let files = if path.is_dir() { self.list_jsonl_files(path) } else { vec![path.to_path_buf()] };
        let mut docs = Vec::new();
        for file in &files {
            let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
            for (line_no, line) in content.lines().enumerate() {
                if self.limit.is_some_and(|limit| docs.len() >= limit) {
                    break;
                }
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let doc: Document = serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: malformed document", file.display(), line_no + 1))?;
                docs.push(doc);
            }
        }
        info!(files = files.len(), documents = docs.len(), "loaded catalog");
        Ok(docs)
    }

    fn list_jsonl_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("jsonl"))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}
