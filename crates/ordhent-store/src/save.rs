use anyhow::Result;
use ordhent_model::{fields, BulkSummary, Filter, VocabularyEntry, WriteOp};

use crate::Store;

/// One upsert per entry, keyed on the English word, setting the whole entry.
pub fn upserts(vocabulary: &[VocabularyEntry]) -> Result<Vec<WriteOp>> {
    vocabulary
        .iter()
        .map(|entry| -> Result<WriteOp> {
            Ok(WriteOp::upsert(
                Filter::eq(fields::ENGLISH, &entry.english),
                entry.to_fields()?,
            ))
        })
        .collect()
}

/// Insert or overwrite every entry in a single bulk write.
pub async fn save<S: Store>(store: &S, vocabulary: &[VocabularyEntry]) -> Result<BulkSummary> {
    let operations = upserts(vocabulary)?;
    if operations.is_empty() {
        tracing::info!("Nothing to save");
        return Ok(BulkSummary::default());
    }

    let summary = store.bulk_write(&operations).await?;
    tracing::info!(
        entries = operations.len(),
        inserted = summary.upserted,
        updated = summary.modified,
        "Saved vocabulary"
    );
    Ok(summary)
}
