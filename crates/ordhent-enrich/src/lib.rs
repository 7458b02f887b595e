use thiserror::Error;

pub mod clean;
pub mod describe;
pub mod dictionary;
pub mod plan;

#[cfg(test)]
mod fake;

pub use clean::{clean, CleanOptions};
pub use describe::{describe, DescribeOptions};
pub use dictionary::{Dictionary, Ordbokene, Reply};
pub use plan::{Execution, Plan};

/// A dictionary reply whose body is not what the pass expects.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("unexpected search response for '{word}'")]
    Search {
        word: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response for article {id}")]
    Article {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
