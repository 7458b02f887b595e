use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

use crate::http;

pub const BASE_URL: &str = "https://phrontistery.info";

/// Letters fetched when none are given.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Word cell at the start of a listing row. Rows are CRLF-separated; the
/// first `<td>` holds the word, the second starts the definition.
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\r\n<tr><td>(.*?)<td>").expect("valid regex"));

/// Source of per-letter listing pages.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Body of the page for `letter`, or `None` when the server answered
    /// with a non-success status.
    async fn page(&self, letter: char) -> Result<Option<String>>;
}

/// The phrontistery.info word lists, one static page per letter.
pub struct Phrontistery {
    client: reqwest::Client,
    base_url: String,
}

impl Phrontistery {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: http::client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn page_url(&self, letter: char) -> String {
        format!("{}/{letter}.html", self.base_url)
    }
}

impl PageSource for Phrontistery {
    async fn page(&self, letter: char) -> Result<Option<String>> {
        let url = self.page_url(letter);
        tracing::debug!(url = %url, "Fetching word list");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Skipping letter");
            return Ok(None);
        }

        let body = response.text().await.context("Failed to read response body")?;
        Ok(Some(body))
    }
}

/// All raw word tokens on one listing page, in page order.
pub fn extract_words(html: &str) -> Vec<String> {
    ROW.captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Partial matches that swallowed markup or entities are not words.
pub fn is_well_formed(token: &str) -> bool {
    !token.contains('<') && !token.contains('&')
}

/// Raw tokens for one letter. A page that could not be served yields nothing.
pub async fn words<S: PageSource>(source: &S, letter: char) -> Result<Vec<String>> {
    Ok(source
        .page(letter)
        .await?
        .map(|html| extract_words(&html))
        .unwrap_or_default())
}

/// Well-formed tokens for every letter, concatenated in letter order.
///
/// Duplicates across letters are kept.
pub async fn fetch<S: PageSource>(source: &S, letters: &str) -> Result<Vec<String>> {
    let mut vocabulary = Vec::new();

    for letter in letters.chars() {
        let tokens = words(source, letter).await?;
        let before = vocabulary.len();
        vocabulary.extend(tokens.iter().filter(|t| is_well_formed(t)).cloned());
        tracing::info!(
            letter = %letter,
            extracted = tokens.len(),
            kept = vocabulary.len() - before,
            "Fetched words"
        );
    }

    Ok(vocabulary)
}
