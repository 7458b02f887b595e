use anyhow::Result;
use ordhent_model::{fields, ArticleBody, ArticleResponse, Filter, Query, WriteOp};
use ordhent_store::Store;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dictionary::Dictionary;
use crate::plan::{Execution, Plan};
use crate::LookupError;

#[derive(Debug, Clone, Default)]
pub struct DescribeOptions {
    /// Describe only entries with this Norwegian word. Otherwise every entry
    /// that already has dictionary IDs.
    pub word: Option<String>,
    pub limit: Option<i64>,
    pub execution: Execution,
    /// Also write explanation and example texts (`beskrivelse`, `eksempel`).
    pub detailed: bool,
}

#[derive(Debug, Deserialize)]
struct Target {
    #[serde(default)]
    norsk: String,
    #[serde(default)]
    ids: Vec<String>,
}

/// Fetch the dictionary article behind every stored article ID and queue the
/// pronunciation and etymology for the entry.
pub async fn describe<S: Store, D: Dictionary>(
    store: &S,
    dictionary: &D,
    options: &DescribeOptions,
) -> Result<Plan> {
    let query = match &options.word {
        Some(word) => Query::Eq(Filter::eq(fields::NORWEGIAN, word)),
        None => Query::Exists(fields::DICTIONARY_IDS.to_string()),
    };

    let targets: Vec<Target> = store
        .find(&query, &[fields::NORWEGIAN, fields::DICTIONARY_IDS], options.limit)
        .await?;
    tracing::info!(
        entries = targets.len(),
        word = options.word.as_deref().unwrap_or("*"),
        "Describing vocabulary"
    );

    let mut operations = Vec::new();
    for target in &targets {
        let by_word = Filter::eq(fields::NORWEGIAN, &target.norsk);

        for id in &target.ids {
            let reply = dictionary.article(id).await?;
            if !reply.success {
                tracing::warn!(word = %target.norsk, id = %id, status = reply.status, "Article lookup failed");
                operations.push(WriteOp::delete(by_word.clone()));
                continue;
            }

            let article: ArticleResponse =
                serde_json::from_str(&reply.body).map_err(|source| LookupError::Article {
                    id: id.clone(),
                    source,
                })?;
            operations.push(WriteOp::update(
                by_word.clone(),
                description(&article.body, options.detailed),
            ));
        }
    }

    Plan::finish(store, operations, options.execution).await
}

/// Fields written for one article. Definitions are left as an empty object;
/// the article's own definitions are not carried over. `detailed` adds the
/// explanation and example texts as flat lists.
pub fn description(body: &ArticleBody, detailed: bool) -> Map<String, Value> {
    let mut set = Map::new();
    set.insert(fields::PRONUNCIATION.to_string(), body.pronunciation.clone());
    set.insert(fields::ETYMOLOGY.to_string(), body.etymology.clone());
    set.insert(fields::DEFINITIONS.to_string(), Value::Object(Map::new()));
    if detailed {
        set.insert(fields::EXPLANATIONS.to_string(), Value::from(body.explanations()));
        set.insert(fields::EXAMPLES.to_string(), Value::from(body.examples()));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Reply;
    use crate::fake::FakeDictionary;
    use ordhent_model::VocabularyEntry;
    use ordhent_store::{save, MemoryStore};
    use serde_json::json;

    const ARTICLE: &str = r#"{"body": {"pronunciation": "p", "etymology": "e"}}"#;
    const DETAILED_ARTICLE: &str = r#"{"body": {
        "pronunciation": "p",
        "etymology": "e",
        "definitions": [{"elements": [
            {"type_": "explanation", "content": "lite rovdyr"},
            {"type_": "explanation", "content": "jf. $"},
            {"type_": "example", "quote": {"content": "katten sover"}}
        ]}]
    }}"#;

    fn entry(english: &str, norwegian: &str, ids: &[&str]) -> VocabularyEntry {
        let mut entry = VocabularyEntry::translated(english, norwegian);
        entry.dictionary_ids = Some(ids.iter().map(|id| id.to_string()).collect());
        entry
    }

    async fn store_with(vocabulary: &[VocabularyEntry]) -> MemoryStore {
        let store = MemoryStore::new();
        save(&store, vocabulary).await.unwrap();
        store
    }

    fn execution(execution: Execution) -> DescribeOptions {
        DescribeOptions {
            word: Some("katt".into()),
            execution,
            ..DescribeOptions::default()
        }
    }

    #[test]
    fn test_description_leaves_definitions_empty() {
        let article: ArticleResponse = serde_json::from_str(
            r#"{"body": {"pronunciation": "p", "etymology": "e", "definitions": [{"elements": []}]}}"#,
        )
        .unwrap();

        let set = description(&article.body, false);
        assert_eq!(
            Value::Object(set),
            json!({"uttalelse": "p", "etymologi": "e", "definisjoner": {}})
        );
    }

    #[test]
    fn test_detailed_description_adds_texts() {
        let article: ArticleResponse = serde_json::from_str(DETAILED_ARTICLE).unwrap();

        let set = description(&article.body, true);
        assert_eq!(
            Value::Object(set),
            json!({
                "uttalelse": "p",
                "etymologi": "e",
                "definisjoner": {},
                "beskrivelse": ["lite rovdyr"],
                "eksempel": ["katten sover"]
            })
        );
    }

    #[tokio::test]
    async fn test_describe_queues_update_per_article() {
        let store = store_with(&[entry("cat", "katt", &["1", "2"])]).await;
        let dictionary = FakeDictionary::default()
            .with_article("1", Reply::ok(ARTICLE))
            .with_article("2", Reply::ok(ARTICLE));

        let plan = describe(&store, &dictionary, &execution(Execution::DryRun)).await.unwrap();

        assert_eq!(plan.updates(), 2);
        assert!(plan.submitted.is_none());
        let entries: Vec<VocabularyEntry> = store.find(&Query::All, &[], None).await.unwrap();
        assert!(entries[0].pronunciation.is_none(), "dry run must not touch the store");
    }

    #[tokio::test]
    async fn test_describe_apply_writes_empty_definitions() {
        let store = store_with(&[entry("cat", "katt", &["1"])]).await;
        let dictionary = FakeDictionary::default().with_article("1", Reply::ok(ARTICLE));

        describe(&store, &dictionary, &execution(Execution::Apply)).await.unwrap();

        let entries: Vec<VocabularyEntry> = store.find(&Query::All, &[], None).await.unwrap();
        assert_eq!(entries[0].pronunciation, Some(json!("p")));
        assert_eq!(entries[0].etymology, Some(json!("e")));
        assert_eq!(entries[0].definitions, Some(json!({})));
    }

    #[tokio::test]
    async fn test_failed_article_queues_delete_and_continues() {
        let store = store_with(&[entry("cat", "katt", &["missing", "1"])]).await;
        let dictionary = FakeDictionary::default().with_article("1", Reply::ok(ARTICLE));

        let plan = describe(&store, &dictionary, &execution(Execution::DryRun)).await.unwrap();

        assert_eq!(plan.operations[0], WriteOp::delete(Filter::eq("norsk", "katt")));
        assert_eq!(plan.updates(), 1);
    }

    #[tokio::test]
    async fn test_describe_only_matching_word() {
        let store = store_with(&[entry("cat", "katt", &["1"]), entry("dog", "hund", &["2"])]).await;
        let dictionary = FakeDictionary::default()
            .with_article("1", Reply::ok(ARTICLE))
            .with_article("2", Reply::ok(ARTICLE));

        describe(&store, &dictionary, &execution(Execution::DryRun)).await.unwrap();
        assert_eq!(*dictionary.requests.borrow(), vec!["article:1"]);
    }

    #[tokio::test]
    async fn test_describe_all_respects_limit() {
        let store = store_with(&[entry("cat", "katt", &["1"]), entry("dog", "hund", &["2"])]).await;
        let dictionary = FakeDictionary::default()
            .with_article("1", Reply::ok(ARTICLE))
            .with_article("2", Reply::ok(ARTICLE));
        let options = DescribeOptions {
            limit: Some(1),
            ..DescribeOptions::default()
        };

        let plan = describe(&store, &dictionary, &options).await.unwrap();
        assert_eq!(plan.operations.len(), 1);
    }

    #[tokio::test]
    async fn test_limit_counts_only_entries_with_ids() {
        let store = store_with(&[VocabularyEntry::translated("cat", "katt"), entry("dog", "hund", &["2"])]).await;
        let dictionary = FakeDictionary::default().with_article("2", Reply::ok(ARTICLE));
        let options = DescribeOptions {
            limit: Some(1),
            ..DescribeOptions::default()
        };

        let plan = describe(&store, &dictionary, &options).await.unwrap();
        assert_eq!(plan.updates(), 1);
        assert_eq!(*dictionary.requests.borrow(), vec!["article:2"]);
    }

    #[tokio::test]
    async fn test_detailed_apply_stores_texts() {
        let store = store_with(&[entry("cat", "katt", &["1"])]).await;
        let dictionary = FakeDictionary::default().with_article("1", Reply::ok(DETAILED_ARTICLE));
        let options = DescribeOptions {
            detailed: true,
            ..execution(Execution::Apply)
        };

        describe(&store, &dictionary, &options).await.unwrap();

        let entries: Vec<VocabularyEntry> = store.find(&Query::All, &[], None).await.unwrap();
        assert_eq!(entries[0].explanations, Some(vec!["lite rovdyr".to_string()]));
        assert_eq!(entries[0].examples, Some(vec!["katten sover".to_string()]));
        assert_eq!(entries[0].definitions, Some(json!({})));
    }

    #[tokio::test]
    async fn test_unparseable_article_aborts_pass() {
        let store = store_with(&[entry("cat", "katt", &["1"])]).await;
        let dictionary = FakeDictionary::default().with_article("1", Reply::ok("<html>oops</html>"));

        let err = describe(&store, &dictionary, &execution(Execution::DryRun)).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<LookupError>(), Some(LookupError::Article { .. })));
    }
}
