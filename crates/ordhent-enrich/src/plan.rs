use anyhow::Result;
use ordhent_model::{BulkSummary, WriteOp};
use ordhent_store::Store;
use serde::Serialize;

/// Whether a pass submits the batch it builds.
///
/// `DryRun` is the long-standing behaviour of clean and describe: the batch
/// is assembled and reported, and the collection is left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    DryRun,
    Apply,
}

/// The batch a pass built, and what the store reported if it was submitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub operations: Vec<WriteOp>,
    pub submitted: Option<BulkSummary>,
}

impl Plan {
    pub fn deletes(&self) -> usize {
        self.operations.iter().filter(|op| op.is_delete()).count()
    }

    pub fn updates(&self) -> usize {
        self.operations.len() - self.deletes()
    }

    /// Submit `operations` under `Apply`; under `DryRun` only report them.
    pub async fn finish<S: Store>(store: &S, operations: Vec<WriteOp>, execution: Execution) -> Result<Self> {
        let mut plan = Plan {
            operations,
            submitted: None,
        };

        match execution {
            Execution::DryRun => {
                tracing::warn!(
                    operations = plan.operations.len(),
                    deletes = plan.deletes(),
                    updates = plan.updates(),
                    "Dry run: batch built but not submitted (use --apply to write it)"
                );
            }
            Execution::Apply if plan.operations.is_empty() => {
                tracing::info!("Nothing to submit");
            }
            Execution::Apply => {
                let summary = store.bulk_write(&plan.operations).await?;
                tracing::info!(
                    operations = plan.operations.len(),
                    deleted = summary.deleted,
                    modified = summary.modified,
                    "Submitted batch"
                );
                plan.submitted = Some(summary);
            }
        }

        Ok(plan)
    }
}
