use anyhow::{Context, Result};
use ordhent_model::VocabularyEntry;
use scraper::{Html, Selector};

use crate::http;

pub const GOOGLE_URL: &str = "https://translate.google.com/m";

pub const SOURCE_LANGUAGE: &str = "en";
pub const DEFAULT_TARGET: &str = "no";

/// A text translation backend. Source and target languages are fixed when
/// the backend is built.
#[allow(async_fn_in_trait)]
pub trait Translator {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Google Translate's no-script mobile page. The translation is the text of
/// `div.result-container`.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    source: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(target: &str) -> Result<Self> {
        Ok(Self {
            client: http::client()?,
            endpoint: GOOGLE_URL.to_string(),
            source: SOURCE_LANGUAGE.to_string(),
            target: target.to_string(),
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("sl", self.source.as_str()), ("tl", self.target.as_str()), ("q", text)])
            .send()
            .await
            .with_context(|| format!("Translation request failed for '{text}'"))?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "HTTP {status} translating '{text}'");

        let html = response.text().await.context("Failed to read translation response")?;
        parse_result(&html).with_context(|| format!("No translation returned for '{text}'"))
    }
}

/// Pull the translated text out of the mobile result page.
fn parse_result(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let result_sel = Selector::parse("div.result-container").expect("valid selector");

    let container = document
        .select(&result_sel)
        .next()
        .context("Could not find div.result-container")?;

    Ok(container.text().collect::<String>().trim().to_string())
}

/// Translate every word, one backend call per word, in input order.
///
/// The first failure aborts the pass.
pub async fn translate<T: Translator>(translator: &T, vocabulary: &[String]) -> Result<Vec<VocabularyEntry>> {
    let mut entries = Vec::with_capacity(vocabulary.len());

    for (index, word) in vocabulary.iter().enumerate() {
        let norwegian = translator.translate(word).await?;
        tracing::debug!(english = %word, norwegian = %norwegian, "Translated");
        entries.push(VocabularyEntry::translated(word.as_str(), norwegian));

        if (index + 1) % 100 == 0 {
            tracing::info!(done = index + 1, total = vocabulary.len(), "Translating");
        }
    }

    tracing::info!(entries = entries.len(), "Translation complete");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct Glossary {
        words: HashMap<&'static str, &'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl Glossary {
        fn new(words: &[(&'static str, &'static str)]) -> Self {
            Self {
                words: words.iter().copied().collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Translator for Glossary {
        async fn translate(&self, text: &str) -> Result<String> {
            self.calls.borrow_mut().push(text.to_string());
            self.words
                .get(text)
                .map(|s| s.to_string())
                .with_context(|| format!("unknown word {text}"))
        }
    }

    #[test]
    fn test_parse_result() {
        let html = r#"
        <html><body>
        <div class="header">Google Translate</div>
        <div class="result-container"> hei </div>
        </body></html>
        "#;
        assert_eq!(parse_result(html).unwrap(), "hei");
    }

    #[test]
    fn test_parse_result_decodes_entities() {
        let html = r#"<div class="result-container">bl&aring;b&aelig;r</div>"#;
        assert_eq!(parse_result(html).unwrap(), "blåbær");
    }

    #[test]
    fn test_parse_result_missing_container() {
        assert!(parse_result("<html><body>captcha</body></html>").is_err());
    }

    #[tokio::test]
    async fn test_translate_builds_entries() {
        let glossary = Glossary::new(&[("hello", "hei")]);
        let entries = translate(&glossary, &["hello".to_string()]).await.unwrap();

        assert_eq!(entries, vec![VocabularyEntry::translated("hello", "hei")]);
        assert_eq!(
            serde_json::to_value(&entries).unwrap(),
            serde_json::json!([{"engelsk": "hello", "norsk": "hei"}])
        );
    }

    #[tokio::test]
    async fn test_translate_calls_once_per_word_in_order() {
        let glossary = Glossary::new(&[("cat", "katt"), ("dog", "hund")]);
        let words = vec!["dog".to_string(), "cat".to_string(), "dog".to_string()];
        let entries = translate(&glossary, &words).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(*glossary.calls.borrow(), vec!["dog", "cat", "dog"]);
    }

    #[tokio::test]
    async fn test_translate_failure_aborts_pass() {
        let glossary = Glossary::new(&[("cat", "katt")]);
        let words = vec!["cat".to_string(), "zzz".to_string(), "cat".to_string()];
        assert!(translate(&glossary, &words).await.is_err());
        assert_eq!(glossary.calls.borrow().len(), 2);
    }
}
