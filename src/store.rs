//! The user store: maps a `UserDatabase` interface onto OpenSearch indices.
//!
//! Users live in one index, their OAuth accounts in another, linked through a
//! `user_id` field on each account document. Email lookups go through the
//! `email.keyword` sub-field and are case-insensitive: emails are lowercased
//! when stored and when queried.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

use crate::client::{BulkOperation, OpenSearchClient, Refresh};
use crate::error::{Error, Result};
use crate::model::UserRecord;

/// Default index holding user documents.
pub const USER_INDEX: &str = "user";
/// Default index holding OAuth account documents.
pub const OAUTH_ACCOUNT_INDEX: &str = "oauth_account";

/// Database interface expected by the user-management side.
#[async_trait]
pub trait UserDatabase<U: UserRecord>: Send + Sync {
    /// Get a single user by id.
    async fn get(&self, id: Uuid) -> Result<Option<U>>;

    /// Get a single user by email, case-insensitively.
    async fn get_by_email(&self, email: &str) -> Result<Option<U>>;

    /// Get the user linked to the given OAuth provider account.
    async fn get_by_oauth_account(&self, oauth_name: &str, account_id: &str)
        -> Result<Option<U>>;

    /// Create a user. Fails with [`Error::UserAlreadyExists`] when another
    /// user already has the same email (compared case-insensitively).
    async fn create(&self, user: &U) -> Result<()>;

    /// Update a user in place, rewriting their OAuth account documents when
    /// the record carries them.
    async fn update(&self, user: &U) -> Result<()>;

    /// Delete a user document. The caller's record is untouched.
    async fn delete(&self, user: &U) -> Result<()>;
}

/// OpenSearch-backed implementation of [`UserDatabase`].
pub struct OpenSearchUserStore<U: UserRecord> {
    client: OpenSearchClient,
    user_index: String,
    oauth_account_index: String,
    _record: PhantomData<fn() -> U>,
}

impl<U: UserRecord> OpenSearchUserStore<U> {
    /// Build a store over the default `user` and `oauth_account` indices.
    pub fn new(client: OpenSearchClient) -> Self {
        Self::with_indices(client, USER_INDEX, OAUTH_ACCOUNT_INDEX)
    }

    /// Build a store over custom index names.
    pub fn with_indices(
        client: OpenSearchClient,
        user_index: &str,
        oauth_account_index: &str,
    ) -> Self {
        Self {
            client,
            user_index: user_index.to_string(),
            oauth_account_index: oauth_account_index.to_string(),
            _record: PhantomData,
        }
    }

    /// The underlying client, e.g. for liveness checks.
    pub fn client(&self) -> &OpenSearchClient {
        &self.client
    }

    fn user_doc(user: &U) -> Result<Map<String, Value>> {
        match serde_json::to_value(user)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::InvalidDocument {
                reason: "user record does not serialize to an object".to_string(),
            }),
        }
    }

    /// Turn the serialized `oauth_accounts` array into bulk rows for the
    /// account index. Each account's own id becomes the document id, and the
    /// owning user's id is stamped into the document body.
    fn oauth_rows(&self, user_id: Uuid, accounts: Value) -> Result<Vec<BulkOperation>> {
        let Value::Array(accounts) = accounts else {
            return Err(Error::InvalidDocument {
                reason: "oauth_accounts is not an array".to_string(),
            });
        };

        accounts
            .into_iter()
            .map(|account| {
                let Value::Object(mut fields) = account else {
                    return Err(Error::InvalidDocument {
                        reason: "oauth account is not an object".to_string(),
                    });
                };

                let id = match fields.remove("id") {
                    Some(Value::String(id)) => id,
                    Some(other) => other.to_string(),
                    None => {
                        return Err(Error::InvalidDocument {
                            reason: "oauth account without an id".to_string(),
                        })
                    }
                };
                fields.insert("user_id".to_string(), Value::String(user_id.to_string()));

                Ok(BulkOperation {
                    index: self.oauth_account_index.clone(),
                    id,
                    source: Value::Object(fields),
                })
            })
            .collect()
    }

    /// Load the user's OAuth account documents and rebuild the record.
    ///
    /// When the account search comes back empty the `oauth_accounts` key is
    /// left out entirely and the record's default fills it in.
    async fn load_user(&self, mut doc: Map<String, Value>) -> Result<U> {
        let user_id = doc
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidDocument {
                reason: "user document without an id".to_string(),
            })?
            .to_string();

        let hits = self
            .client
            .search(&self.oauth_account_index, &user_id_query(&user_id))
            .await?;

        if !hits.is_empty() {
            let accounts = hits
                .into_iter()
                .map(|hit| {
                    let Value::Object(mut fields) = hit.source else {
                        return Err(Error::InvalidDocument {
                            reason: "oauth account document is not an object".to_string(),
                        });
                    };
                    fields.insert("id".to_string(), Value::String(hit.id));
                    Ok(Value::Object(fields))
                })
                .collect::<Result<Vec<_>>>()?;
            doc.insert("oauth_accounts".to_string(), Value::Array(accounts));
        }

        Ok(serde_json::from_value(Value::Object(doc))?)
    }
}

#[async_trait]
impl<U: UserRecord> UserDatabase<U> for OpenSearchUserStore<U> {
    async fn get(&self, id: Uuid) -> Result<Option<U>> {
        let Some(source) = self.client.get_doc(&self.user_index, &id.to_string()).await? else {
            return Ok(None);
        };

        let Value::Object(mut doc) = source else {
            return Err(Error::InvalidDocument {
                reason: "user document is not an object".to_string(),
            });
        };
        doc.insert("id".to_string(), Value::String(id.to_string()));

        Ok(Some(self.load_user(doc).await?))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<U>> {
        let hits = self
            .client
            .search(&self.user_index, &email_query(email))
            .await?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let Value::Object(mut doc) = hit.source else {
            return Err(Error::InvalidDocument {
                reason: "user document is not an object".to_string(),
            });
        };
        doc.insert("id".to_string(), Value::String(hit.id));

        Ok(Some(self.load_user(doc).await?))
    }

    async fn get_by_oauth_account(
        &self,
        oauth_name: &str,
        account_id: &str,
    ) -> Result<Option<U>> {
        let hits = self
            .client
            .search(
                &self.oauth_account_index,
                &oauth_lookup_query(oauth_name, account_id),
            )
            .await?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let user_id = hit
            .source
            .get("user_id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidDocument {
                reason: "oauth account document without a user_id".to_string(),
            })?;
        let user_id = Uuid::parse_str(user_id).map_err(|e| Error::InvalidDocument {
            reason: format!("stored user_id is not a UUID: {e}"),
        })?;

        self.get(user_id).await
    }

    async fn create(&self, user: &U) -> Result<()> {
        let mut doc = Self::user_doc(user)?;
        let oauth_rows = match doc.remove("oauth_accounts") {
            Some(accounts) => Some(self.oauth_rows(user.id(), accounts)?),
            None => None,
        };

        let email = user.email().to_lowercase();
        if self.get_by_email(&email).await?.is_some() {
            return Err(Error::UserAlreadyExists { email });
        }

        // The stored form is normalized; the caller's record keeps its case.
        doc.insert("email".to_string(), Value::String(email));
        doc.remove("id");

        debug!(user_id = %user.id(), "indexing user");
        self.client
            .index_doc(
                &self.user_index,
                &user.id().to_string(),
                &Value::Object(doc),
                Refresh::WaitFor,
            )
            .await?;

        if let Some(rows) = oauth_rows {
            self.client.bulk(&rows, Refresh::WaitFor).await?;
        }

        Ok(())
    }

    async fn update(&self, user: &U) -> Result<()> {
        let mut doc = Self::user_doc(user)?;

        if let Some(accounts) = doc.remove("oauth_accounts") {
            debug!(user_id = %user.id(), "rewriting oauth account documents");
            self.client
                .delete_by_query(
                    &self.oauth_account_index,
                    &user_id_query(&user.id().to_string()),
                )
                .await?;

            let rows = self.oauth_rows(user.id(), accounts)?;
            self.client.bulk(&rows, Refresh::WaitFor).await?;
        }

        doc.remove("id");
        self.client
            .update_doc(
                &self.user_index,
                &user.id().to_string(),
                &Value::Object(doc),
            )
            .await?;

        Ok(())
    }

    async fn delete(&self, user: &U) -> Result<()> {
        debug!(user_id = %user.id(), "deleting user");
        self.client
            .delete_doc(&self.user_index, &user.id().to_string())
            .await
    }
}

fn email_query(email: &str) -> Value {
    json!({ "query": { "match": { "email.keyword": email.to_lowercase() } } })
}

fn user_id_query(user_id: &str) -> Value {
    json!({ "query": { "match": { "user_id.keyword": user_id } } })
}

fn oauth_lookup_query(oauth_name: &str, account_id: &str) -> Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "match": { "oauth_name.keyword": oauth_name } },
                    { "match": { "account_id.keyword": account_id } },
                ],
            }
        }
    })
}
