//! Error types for the OpenSearch client and the user store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },
    #[error("document {id} not found in index {index}")]
    DocumentNotFound { index: String, id: String },
    #[error("bulk request reported item failures: {detail}")]
    BulkFailure { detail: String },
    #[error("a user with email {email} already exists")]
    UserAlreadyExists { email: String },
    #[error("invalid stored document: {reason}")]
    InvalidDocument { reason: String },
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    /// True for the duplicate-email rejection raised by create.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::UserAlreadyExists { .. })
    }
}
