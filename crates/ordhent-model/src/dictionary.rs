use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Response of the dictionary search endpoint (`/api/articles?w=..&dict=..`).
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Per-dictionary match counts, keyed by dictionary code (e.g. "bm").
    pub meta: HashMap<String, DictionaryMeta>,
    #[serde(default)]
    pub articles: Articles,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryMeta {
    #[serde(default)]
    pub total: u64,
}

/// Article IDs as returned by search.
///
/// The live service groups them by dictionary code; a flat list is accepted
/// as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Articles {
    Flat(Vec<ArticleId>),
    ByDictionary(BTreeMap<String, Vec<ArticleId>>),
}

impl Default for Articles {
    fn default() -> Self {
        Articles::Flat(Vec::new())
    }
}

/// Opaque article identifier. Numeric on the wire, kept as text in the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::Number(n) => write!(f, "{n}"),
            ArticleId::Text(s) => f.write_str(s),
        }
    }
}

impl SearchResponse {
    /// Match count for one dictionary. A code absent from `meta` counts as zero.
    pub fn total(&self, code: &str) -> u64 {
        self.meta.get(code).map_or(0, |m| m.total)
    }

    /// Article IDs for one dictionary, in response order.
    pub fn article_ids(&self, code: &str) -> Vec<String> {
        let ids = match &self.articles {
            Articles::Flat(ids) => ids.as_slice(),
            Articles::ByDictionary(by_code) => by_code.get(code).map_or(&[][..], |v| v.as_slice()),
        };
        ids.iter().map(ToString::to_string).collect()
    }
}

/// Response of the per-article endpoint (`/{dict}/article/{id}.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleResponse {
    pub body: ArticleBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleBody {
    pub pronunciation: Value,
    pub etymology: Value,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// One sense of an article. Only its direct elements are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A definition element. Explanations carry `content`, examples carry `quote`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Element {
    #[serde(rename = "type_", alias = "_type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub content: Value,
}

/// Texts with `$` still hold unresolved item placeholders and are dropped.
fn resolved(text: &str) -> bool {
    !text.contains('$')
}

impl ArticleBody {
    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.definitions.iter().flat_map(|d| d.elements.iter())
    }

    /// Explanation texts across all definitions, in article order.
    pub fn explanations(&self) -> Vec<String> {
        self.elements()
            .filter(|e| e.kind == "explanation")
            .filter_map(|e| e.content.as_str())
            .filter(|text| resolved(text))
            .map(str::to_string)
            .collect()
    }

    /// Example quotes across all definitions, in article order.
    pub fn examples(&self) -> Vec<String> {
        self.elements()
            .filter(|e| e.kind == "example")
            .filter_map(|e| e.quote.as_ref())
            .filter_map(|q| q.content.as_str())
            .filter(|text| resolved(text))
            .map(str::to_string)
            .collect()
    }
}
