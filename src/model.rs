//! User and OAuth account records stored by the adapter.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contract between a user-management framework and the store.
///
/// The serialized form must be a JSON object carrying `id` and `email`
/// fields. An optional `oauth_accounts` array drives linked-account
/// bookkeeping: when present, the store pulls it out of the user document and
/// maintains one document per account in a separate index.
pub trait UserRecord: Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> Uuid;
    fn email(&self) -> &str;
}

/// An OAuth account linked to a user.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OAuthAccount {
    pub id: Uuid,
    pub oauth_name: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub account_id: String,
    pub account_email: String,
}

impl OAuthAccount {
    pub fn new(
        oauth_name: &str,
        account_id: &str,
        account_email: &str,
        access_token: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            oauth_name: oauth_name.to_string(),
            access_token: access_token.to_string(),
            expires_at: None,
            refresh_token: None,
            account_id: account_id.to_string(),
            account_email: account_email.to_string(),
        }
    }
}

/// Default user record.
///
/// `oauth_accounts` is always serialized, even when empty; updating a user
/// with an empty list clears their linked accounts. Deserialization supplies
/// the empty default because stored user documents never carry the field.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub oauth_accounts: Vec<OAuthAccount>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create an active, non-superuser, unverified user with a fresh id.
    pub fn new(email: &str, hashed_password: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
            oauth_accounts: Vec::new(),
        }
    }

    pub fn with_oauth_accounts(mut self, accounts: Vec<OAuthAccount>) -> Self {
        self.oauth_accounts = accounts;
        self
    }
}

impl UserRecord for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }
}
