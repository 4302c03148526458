// OpenSearch Users - user database adapter backed by OpenSearch
// This exposes the client, the record types, and the store

pub mod client;
pub mod error;
pub mod model;
pub mod store;

// Re-export key types for easy access
pub use client::{
    BulkOperation, ClusterInfo, OpenSearchClient, OpenSearchConfig, Refresh, SearchHit,
};
pub use error::{Error, Result};
pub use model::{OAuthAccount, User, UserRecord};
pub use store::{OpenSearchUserStore, UserDatabase, OAUTH_ACCOUNT_INDEX, USER_INDEX};
