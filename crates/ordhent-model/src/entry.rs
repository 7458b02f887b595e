use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ModelError;

/// Stored field names. Documents in the collection use the Norwegian names.
pub mod fields {
    pub const ENGLISH: &str = "engelsk";
    pub const NORWEGIAN: &str = "norsk";
    pub const DICTIONARY_IDS: &str = "ids";
    pub const PRONUNCIATION: &str = "uttalelse";
    pub const ETYMOLOGY: &str = "etymologi";
    pub const DEFINITIONS: &str = "definisjoner";
    pub const EXPLANATIONS: &str = "beskrivelse";
    pub const EXAMPLES: &str = "eksempel";
}

/// One vocabulary document: an English word, its Norwegian translation and
/// whatever the dictionary passes have added so far.
///
/// `english` is the unique key. Everything past `norwegian` is absent until
/// the clean and describe passes have run over the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(rename = "engelsk")]
    pub english: String,
    #[serde(rename = "norsk", default)]
    pub norwegian: String,
    /// Dictionary article IDs, in the order the search endpoint returned them.
    #[serde(rename = "ids", default, skip_serializing_if = "Option::is_none")]
    pub dictionary_ids: Option<Vec<String>>,
    #[serde(rename = "uttalelse", default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<Value>,
    #[serde(rename = "etymologi", default, skip_serializing_if = "Option::is_none")]
    pub etymology: Option<Value>,
    #[serde(rename = "definisjoner", default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Value>,
    /// Explanation texts from the dictionary article; written by detailed describe runs only.
    #[serde(rename = "beskrivelse", default, skip_serializing_if = "Option::is_none")]
    pub explanations: Option<Vec<String>>,
    #[serde(rename = "eksempel", default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

impl VocabularyEntry {
    /// A freshly translated entry with no dictionary data yet.
    pub fn translated(english: impl Into<String>, norwegian: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            norwegian: norwegian.into(),
            dictionary_ids: None,
            pronunciation: None,
            etymology: None,
            definitions: None,
            explanations: None,
            examples: None,
        }
    }

    /// The entry as a flat field map, as written by `$set`.
    pub fn to_fields(&self) -> Result<Map<String, Value>, ModelError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(ModelError::NotAnObject),
        }
    }
}
