use serde::Serialize;
use serde_json::{Map, Value};

/// Equality match on a single string field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        matches!(document.get(&self.field), Some(Value::String(v)) if *v == self.value)
    }
}

/// A single write in a bulk batch.
///
/// Mirrors the store's own bulk vocabulary so a batch can be built, logged
/// and inspected without a connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    /// `$set` the given fields on the first matching document. With `upsert`,
    /// a miss inserts the filter field plus `set`.
    UpdateOne {
        filter: Filter,
        set: Map<String, Value>,
        upsert: bool,
    },
    /// Remove the first matching document.
    DeleteOne { filter: Filter },
}

impl WriteOp {
    pub fn upsert(filter: Filter, set: Map<String, Value>) -> Self {
        WriteOp::UpdateOne {
            filter,
            set,
            upsert: true,
        }
    }

    pub fn update(filter: Filter, set: Map<String, Value>) -> Self {
        WriteOp::UpdateOne {
            filter,
            set,
            upsert: false,
        }
    }

    pub fn delete(filter: Filter) -> Self {
        WriteOp::DeleteOne { filter }
    }

    pub fn filter(&self) -> &Filter {
        match self {
            WriteOp::UpdateOne { filter, .. } | WriteOp::DeleteOne { filter } => filter,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, WriteOp::DeleteOne { .. })
    }
}

/// Read selector for `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All,
    Eq(Filter),
    /// Documents that do not carry the field at all.
    Missing(String),
    /// Documents that carry the field, whatever its value.
    Exists(String),
}

impl Query {
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        match self {
            Query::All => true,
            Query::Eq(filter) => filter.matches(document),
            Query::Missing(field) => !document.contains_key(field),
            Query::Exists(field) => document.contains_key(field),
        }
    }
}

/// Counts reported back from a submitted bulk batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
    pub deleted: u64,
}
