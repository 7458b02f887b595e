use anyhow::{Context, Result};
use ordhent_model::{BulkSummary, Query, WriteOp};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StoreError;
use crate::Store;

type Document = Map<String, Value>;

/// In-process collection with the same upsert and delete semantics as the
/// document store. Optionally backed by a JSON file that is read on open and
/// written back on close.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<Vec<Document>>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load documents from `path` if it exists; the file is (re)written on close.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let documents = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Vec::new()
        };

        tracing::info!(path = %path.display(), documents = documents.len(), "Opened in-memory store");
        Ok(Self {
            documents: RefCell::new(documents),
            path: Some(path),
        })
    }

    /// Snapshot of every document, in insertion order.
    pub fn documents(&self) -> Vec<Document> {
        self.documents.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.documents.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply(documents: &mut Vec<Document>, op: &WriteOp, summary: &mut BulkSummary) {
        match op {
            WriteOp::UpdateOne { filter, set, upsert } => {
                if let Some(document) = documents.iter_mut().find(|d| filter.matches(d)) {
                    summary.matched += 1;
                    let mut changed = false;
                    for (key, value) in set {
                        if document.get(key) != Some(value) {
                            document.insert(key.clone(), value.clone());
                            changed = true;
                        }
                    }
                    if changed {
                        summary.modified += 1;
                    }
                } else if *upsert {
                    let mut document = Document::new();
                    document.insert(filter.field.clone(), Value::String(filter.value.clone()));
                    document.extend(set.iter().map(|(k, v)| (k.clone(), v.clone())));
                    documents.push(document);
                    summary.upserted += 1;
                }
            }
            WriteOp::DeleteOne { filter } => {
                if let Some(index) = documents.iter().position(|d| filter.matches(d)) {
                    documents.remove(index);
                    summary.deleted += 1;
                }
            }
        }
    }
}

impl Store for MemoryStore {
    async fn find<T: DeserializeOwned>(
        &self,
        query: &Query,
        projection: &[&str],
        limit: Option<i64>,
    ) -> Result<Vec<T>> {
        let documents = self.documents.try_borrow().map_err(|_| StoreError::Busy)?;
        let limit = limit.and_then(|l| usize::try_from(l).ok()).filter(|&l| l > 0);

        documents
            .iter()
            .filter(|d| query.matches(d))
            .take(limit.unwrap_or(usize::MAX))
            .map(|document| {
                let projected: Document = if projection.is_empty() {
                    document.clone()
                } else {
                    document
                        .iter()
                        .filter(|(key, _)| projection.contains(&key.as_str()))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                };
                serde_json::from_value(Value::Object(projected)).context("Unexpected document shape")
            })
            .collect()
    }

    async fn bulk_write(&self, operations: &[WriteOp]) -> Result<BulkSummary> {
        let mut documents = self.documents.try_borrow_mut().map_err(|_| StoreError::Busy)?;
        let mut summary = BulkSummary::default();
        for op in operations {
            Self::apply(&mut documents, op, &mut summary);
        }
        Ok(summary)
    }

    async fn close(self) -> Result<()> {
        if let Some(path) = &self.path {
            let documents = self.documents.into_inner();
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, serde_json::to_string_pretty(&documents)?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), documents = documents.len(), "Saved in-memory store");
        }
        Ok(())
    }
}
