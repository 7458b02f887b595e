use anyhow::{Context, Result};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, Credential, DeleteOneModel, UpdateOneModel, WriteModel};
use mongodb::{Client, Collection, Namespace};
use ordhent_model::{BulkSummary, Filter, Query, WriteOp};
use serde::de::DeserializeOwned;

use crate::config::{StoreConfig, StoreError};
use crate::Store;

/// The vocabulary collection in MongoDB.
///
/// One client per process run: connect at startup, `close` before exit.
/// Batches go through `Client::bulk_write`, which needs a MongoDB 8.0+ server;
/// older servers fail with `StoreError::BulkUnsupported`.
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let mut options = ClientOptions::parse(config.connection_string())
            .await
            .context("Invalid MongoDB connection string")?;
        if let Some((user, password)) = config.credentials() {
            options.credential = Some(
                Credential::builder()
                    .username(user.to_string())
                    .password(password.to_string())
                    .build(),
            );
        }

        let client = Client::with_options(options).context("Failed to create MongoDB client")?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connected to document store"
        );

        Ok(Self { client, collection })
    }
}

impl Store for MongoStore {
    async fn find<T: DeserializeOwned>(
        &self,
        query: &Query,
        projection: &[&str],
        limit: Option<i64>,
    ) -> Result<Vec<T>> {
        let mut find = self
            .collection
            .find(query_document(query))
            .projection(projection_document(projection));
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let documents: Vec<Document> = find
            .await
            .context("Find failed")?
            .try_collect()
            .await
            .context("Failed to read find cursor")?;
        tracing::debug!(query = ?query, documents = documents.len(), "Found documents");

        documents
            .into_iter()
            .map(|document| bson::from_document(document).context("Unexpected document shape"))
            .collect()
    }

    async fn bulk_write(&self, operations: &[WriteOp]) -> Result<BulkSummary> {
        if operations.is_empty() {
            return Ok(BulkSummary::default());
        }

        let namespace = self.collection.namespace();
        let models = operations
            .iter()
            .map(|op| write_model(&namespace, op))
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .client
            .bulk_write(models)
            .await
            .map_err(bulk_error)?;

        Ok(BulkSummary {
            matched: count(result.matched_count),
            modified: count(result.modified_count),
            upserted: count(result.upserted_count),
            deleted: count(result.deleted_count),
        })
    }

    async fn close(self) -> Result<()> {
        self.client.shutdown().await;
        tracing::debug!("Closed document store connection");
        Ok(())
    }
}

/// Server error code for a command the server does not know.
const COMMAND_NOT_FOUND: i32 = 59;

fn bulk_error(err: mongodb::error::Error) -> StoreError {
    let unsupported = match err.kind.as_ref() {
        ErrorKind::IncompatibleServer { .. } => true,
        ErrorKind::Command(command) => command.code == COMMAND_NOT_FOUND,
        _ => false,
    };
    if unsupported {
        StoreError::BulkUnsupported(err)
    } else {
        StoreError::Bulk(err)
    }
}

fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

fn filter_document(filter: &Filter) -> Document {
    let mut document = Document::new();
    document.insert(filter.field.clone(), filter.value.clone());
    document
}

fn query_document(query: &Query) -> Document {
    match query {
        Query::All => Document::new(),
        Query::Eq(filter) => filter_document(filter),
        Query::Missing(field) => {
            let mut document = Document::new();
            document.insert(field.clone(), doc! { "$exists": false });
            document
        }
        Query::Exists(field) => {
            let mut document = Document::new();
            document.insert(field.clone(), doc! { "$exists": true });
            document
        }
    }
}

fn projection_document(fields: &[&str]) -> Document {
    let mut document = Document::new();
    for field in fields {
        document.insert(*field, 1);
    }
    document.insert("_id", 0);
    document
}

fn write_model(namespace: &Namespace, op: &WriteOp) -> Result<WriteModel> {
    let model = match op {
        WriteOp::UpdateOne { filter, set, upsert } => {
            let set = bson::to_document(set).context("Update fields are not a document")?;
            WriteModel::UpdateOne(
                UpdateOneModel::builder()
                    .namespace(namespace.clone())
                    .filter(filter_document(filter))
                    .update(doc! { "$set": set })
                    .upsert(*upsert)
                    .build(),
            )
        }
        WriteOp::DeleteOne { filter } => WriteModel::DeleteOne(
            DeleteOneModel::builder()
                .namespace(namespace.clone())
                .filter(filter_document(filter))
                .build(),
        ),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_documents() {
        assert_eq!(query_document(&Query::All), doc! {});
        assert_eq!(
            query_document(&Query::Eq(Filter::eq("norsk", "katt"))),
            doc! { "norsk": "katt" }
        );
        assert_eq!(
            query_document(&Query::Missing("ids".into())),
            doc! { "ids": { "$exists": false } }
        );
        assert_eq!(
            query_document(&Query::Exists("ids".into())),
            doc! { "ids": { "$exists": true } }
        );
    }

    #[test]
    fn test_bulk_errors_keep_their_cause() {
        let err = bulk_error(mongodb::error::Error::from(std::io::Error::other("reset")));
        assert!(matches!(err, StoreError::Bulk(_)));

        let unsupported =
            StoreError::BulkUnsupported(mongodb::error::Error::from(std::io::Error::other("no bulkWrite")));
        assert!(unsupported.to_string().contains("MongoDB 8.0"));
    }

    #[test]
    fn test_projection_hides_object_id() {
        assert_eq!(
            projection_document(&["norsk", "ids"]),
            doc! { "norsk": 1, "ids": 1, "_id": 0 }
        );
    }

    #[test]
    fn test_json_fields_convert_to_bson() {
        let set = json!({"uttalelse": [{"transcription": "kat"}], "definisjoner": {}});
        let document = bson::to_document(set.as_object().unwrap()).unwrap();
        assert_eq!(
            document,
            doc! { "uttalelse": [{ "transcription": "kat" }], "definisjoner": {} }
        );
    }
}
