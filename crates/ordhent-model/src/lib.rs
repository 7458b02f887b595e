pub mod dictionary;
pub mod entry;
pub mod operation;

pub use dictionary::*;
pub use entry::*;
pub use operation::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entry did not serialize to a JSON object")]
    NotAnObject,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
