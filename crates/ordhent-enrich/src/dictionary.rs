use anyhow::{Context, Result};
use ordhent_acquire::http;

pub const API_URL: &str = "https://ord.uib.no";

/// Bokmål. "nn" selects Nynorsk.
pub const DEFAULT_DICTIONARY: &str = "bm";

/// Status and raw body of one dictionary request.
///
/// Passes decide for themselves what a non-success reply means, and some of
/// them still read the body afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub success: bool,
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            success: true,
            status: 200,
            body: body.into(),
        }
    }

    pub fn failed(status: u16, body: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            body: body.into(),
        }
    }
}

/// Read-only lookups against one dictionary of the Norwegian dictionary service.
#[allow(async_fn_in_trait)]
pub trait Dictionary {
    /// Dictionary code used in requests and in the `meta` block of search results.
    fn code(&self) -> &str;

    /// Search by headword.
    async fn search(&self, word: &str) -> Result<Reply>;

    /// Fetch one article by ID.
    async fn article(&self, id: &str) -> Result<Reply>;
}

/// ord.uib.no (Ordbøkene).
pub struct Ordbokene {
    client: reqwest::Client,
    base_url: String,
    code: String,
    exact: bool,
}

impl Ordbokene {
    pub fn new(code: &str) -> Result<Self> {
        Self::with_base_url(API_URL, code)
    }

    pub fn with_base_url(base_url: &str, code: &str) -> Result<Self> {
        Ok(Self {
            client: http::client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            code: code.to_string(),
            exact: false,
        })
    }

    /// Restrict searches to exact headword matches (`scope=e`).
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn search_url(&self) -> String {
        format!("{}/api/articles", self.base_url)
    }

    pub fn search_query<'a>(&'a self, word: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut query = vec![("w", word), ("dict", self.code.as_str())];
        if self.exact {
            query.push(("scope", "e"));
        }
        query
    }

    pub fn article_url(&self, id: &str) -> String {
        format!("{}/{}/article/{id}.json", self.base_url, self.code)
    }

    async fn get(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Reply> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Dictionary request failed: {what}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read dictionary response: {what}"))?;

        tracing::debug!(request = %what, status = %status, bytes = body.len(), "Dictionary reply");
        Ok(Reply {
            success: status.is_success(),
            status: status.as_u16(),
            body,
        })
    }
}

impl Dictionary for Ordbokene {
    fn code(&self) -> &str {
        &self.code
    }

    async fn search(&self, word: &str) -> Result<Reply> {
        let request = self
            .client
            .get(self.search_url())
            .query(&self.search_query(word));
        self.get(request, &format!("search '{word}'")).await
    }

    async fn article(&self, id: &str) -> Result<Reply> {
        let request = self.client.get(self.article_url(id));
        self.get(request, &format!("article {id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let dictionary = Ordbokene::new(DEFAULT_DICTIONARY).unwrap();
        assert_eq!(dictionary.search_url(), "https://ord.uib.no/api/articles");
        assert_eq!(dictionary.article_url("5521"), "https://ord.uib.no/bm/article/5521.json");
    }

    #[test]
    fn test_nynorsk_article_url() {
        let dictionary = Ordbokene::with_base_url("http://localhost:8080/", "nn").unwrap();
        assert_eq!(dictionary.code(), "nn");
        assert_eq!(dictionary.article_url("9"), "http://localhost:8080/nn/article/9.json");
    }

    #[test]
    fn test_search_query_scope() {
        let dictionary = Ordbokene::new(DEFAULT_DICTIONARY).unwrap();
        assert_eq!(dictionary.search_query("katt"), vec![("w", "katt"), ("dict", "bm")]);

        let exact = dictionary.exact(true);
        assert_eq!(
            exact.search_query("katt"),
            vec![("w", "katt"), ("dict", "bm"), ("scope", "e")]
        );
    }
}
