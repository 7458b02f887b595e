use anyhow::Result;
use ordhent_model::{fields, Filter, Query, SearchResponse, WriteOp};
use ordhent_store::Store;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dictionary::Dictionary;
use crate::plan::{Execution, Plan};
use crate::LookupError;

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    pub execution: Execution,
    /// Only entries that have not been through clean yet (no `ids`).
    pub pending_only: bool,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(default)]
    norsk: String,
}

/// Look every stored translation up in the dictionary.
///
/// Entries the dictionary does not know are queued for deletion; the rest get
/// their article IDs. Writes match on the Norwegian word.
pub async fn clean<S: Store, D: Dictionary>(store: &S, dictionary: &D, options: &CleanOptions) -> Result<Plan> {
    let query = if options.pending_only {
        Query::Missing(fields::DICTIONARY_IDS.to_string())
    } else {
        Query::All
    };

    let translations: Vec<Translation> = store.find(&query, &[fields::NORWEGIAN], None).await?;
    tracing::info!(
        entries = translations.len(),
        pending_only = options.pending_only,
        dictionary = dictionary.code(),
        "Cleaning vocabulary"
    );

    let mut operations = Vec::new();
    for translation in &translations {
        if translation.norsk.is_empty() {
            tracing::debug!("Skipping entry without a translation");
            continue;
        }
        operations.extend(check(dictionary, &translation.norsk).await?);
    }

    Plan::finish(store, operations, options.execution).await
}

/// Operations for one Norwegian word.
///
/// A failed lookup and an empty result each queue a delete, so a failed
/// lookup whose body still reports zero matches queues two.
///
/// The body is parsed even after a failed lookup. An error page that is not
/// search JSON (an HTML 404, say) fails with `LookupError::Search` and stops
/// the whole pass, so the delete for a failed lookup is only kept when the
/// service answered with JSON.
async fn check<D: Dictionary>(dictionary: &D, word: &str) -> Result<Vec<WriteOp>> {
    let by_word = Filter::eq(fields::NORWEGIAN, word);
    let reply = dictionary.search(word).await?;

    let mut operations = Vec::new();
    if !reply.success {
        tracing::warn!(word = %word, status = reply.status, "Dictionary search failed");
        operations.push(WriteOp::delete(by_word.clone()));
    }

    let response: SearchResponse = serde_json::from_str(&reply.body).map_err(|source| LookupError::Search {
        word: word.to_string(),
        source,
    })?;

    if response.total(dictionary.code()) == 0 {
        tracing::debug!(word = %word, "No dictionary matches");
        operations.push(WriteOp::delete(by_word));
    } else {
        let ids = response.article_ids(dictionary.code());
        tracing::debug!(word = %word, articles = ids.len(), "Dictionary matches");
        let mut set = Map::new();
        set.insert(fields::DICTIONARY_IDS.to_string(), Value::from(ids));
        operations.push(WriteOp::update(by_word, set));
    }

    Ok(operations)
}
