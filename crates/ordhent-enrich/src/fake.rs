//! Canned dictionary for pass tests.

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::dictionary::{Dictionary, Reply};

#[derive(Default)]
pub struct FakeDictionary {
    pub searches: HashMap<String, Reply>,
    pub articles: HashMap<String, Reply>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeDictionary {
    pub fn with_search(mut self, word: &str, reply: Reply) -> Self {
        self.searches.insert(word.to_string(), reply);
        self
    }

    pub fn with_article(mut self, id: &str, reply: Reply) -> Self {
        self.articles.insert(id.to_string(), reply);
        self
    }
}

impl Dictionary for FakeDictionary {
    fn code(&self) -> &str {
        "bm"
    }

    async fn search(&self, word: &str) -> Result<Reply> {
        self.requests.borrow_mut().push(format!("search:{word}"));
        Ok(self
            .searches
            .get(word)
            .cloned()
            .unwrap_or_else(|| Reply::failed(404, "Not Found")))
    }

    async fn article(&self, id: &str) -> Result<Reply> {
        self.requests.borrow_mut().push(format!("article:{id}"));
        Ok(self
            .articles
            .get(id)
            .cloned()
            .unwrap_or_else(|| Reply::failed(404, "Not Found")))
    }
}
