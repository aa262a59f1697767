//! Typed Roster operations over the request pipeline and query cache.
//!
//! Reads go through [`QueryCache::fetch`] so identical concurrent reads are
//! coalesced. Mutations write their result back into the cached lists.

use std::sync::Arc;

use log::{debug, info};
use reqwest::Method;
use roster_core::models::{Character, CharacterForm, NewCharacter, User, UserRole};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::query::{QueryCache, QueryKey, RetryPolicy};
use crate::request::{ApiClient, RequestOptions};

#[derive(Serialize)]
struct RoleUpdate {
    role: UserRole,
}

/// Roster API operations with client-side caching.
#[derive(Clone)]
pub struct RosterService {
    client: ApiClient,
    cache: Arc<QueryCache>,
    retry: RetryPolicy,
}

impl RosterService {
    pub fn new(client: ApiClient, cache: Arc<QueryCache>, retry: RetryPolicy) -> Self {
        Self {
            client,
            cache,
            retry,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// The signed-in user, or `None` when no access token is stored.
    ///
    /// Never retried: a failure here usually means an expired credential.
    pub async fn current_user(&self) -> ApiResult<Option<User>> {
        if !self.client.session().is_authenticated() {
            debug!("no session; skipping /me");
            return Ok(None);
        }
        let value = self
            .read(QueryKey::CurrentUser, "/me".to_string(), RetryPolicy::none())
            .await?;
        from_value(value).map(Some)
    }

    /// Forget the credentials and every cached query.
    pub fn logout(&self) -> Result<(), roster_core::storage::StorageError> {
        self.cache.clear();
        self.client.session().clear()?;
        info!("signed out");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        let value = self
            .read(QueryKey::Users, "/admin/users".to_string(), self.retry)
            .await?;
        from_value(value)
    }

    /// Change a user's role and drop the cached user list.
    pub async fn update_user_role(&self, user_id: &str, role: UserRole) -> ApiResult<()> {
        let endpoint = format!("/admin/users/{user_id}/role");
        let _: Option<Value> = self
            .client
            .post(&endpoint, &RoleUpdate { role }, &RequestOptions::authenticated())
            .await?;
        self.cache.invalidate(&QueryKey::Users);
        info!("user {user_id} is now {role}");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    pub async fn characters(&self, server_id: i32) -> ApiResult<Vec<Character>> {
        let value = self
            .read(
                QueryKey::Characters { server_id },
                format!("/servers/{server_id}/characters"),
                self.retry,
            )
            .await?;
        from_value(value)
    }

    /// Create a character on `server_id` and append it to that server's
    /// cached list.
    pub async fn create_character(
        &self,
        server_id: i32,
        form: CharacterForm,
    ) -> ApiResult<Character> {
        let payload = NewCharacter { form, server_id };
        let created: Character = self
            .client
            .post("/characters", &payload, &RequestOptions::authenticated())
            .await?;

        self.rewrite_characters(server_id, |list| list.push(created.clone()))?;
        info!("created character {} on server {server_id}", created.id);
        Ok(created)
    }

    /// Update a character and replace it in `server_id`'s cached list.
    ///
    /// A cached list that does not contain the character is left as is; an
    /// empty cache is seeded with the updated character.
    pub async fn update_character(
        &self,
        id: &str,
        server_id: i32,
        form: &CharacterForm,
    ) -> ApiResult<Character> {
        let updated: Character = self
            .client
            .put(&format!("/characters/{id}"), form, &RequestOptions::authenticated())
            .await?;

        let key = QueryKey::Characters { server_id };
        if self.cache.get(&key).is_none() {
            self.cache.set(key, serde_json::to_value([&updated])?);
        } else {
            self.rewrite_characters(server_id, |list| {
                if let Some(slot) = list.iter_mut().find(|c| c.id == updated.id) {
                    *slot = updated.clone();
                }
            })?;
        }
        Ok(updated)
    }

    /// Delete a character and drop it from `server_id`'s cached list.
    pub async fn delete_character(&self, id: &str, server_id: i32) -> ApiResult<()> {
        let _: Option<Value> = self
            .client
            .delete(&format!("/characters/{id}"), &RequestOptions::authenticated())
            .await?;

        let key = QueryKey::Characters { server_id };
        if self.cache.get(&key).is_some() {
            self.rewrite_characters(server_id, |list| list.retain(|c| c.id != id))?;
        }
        info!("deleted character {id}");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    async fn read(&self, key: QueryKey, endpoint: String, retry: RetryPolicy) -> ApiResult<Value> {
        let client = self.client.clone();
        self.cache
            .fetch(key, move || async move {
                let client = &client;
                let endpoint = endpoint.as_str();
                retry
                    .run(move || async move {
                        client
                            .send(Method::GET, endpoint, None, &RequestOptions::authenticated())
                            .await
                    })
                    .await
                    .map(|body| body.unwrap_or(Value::Null))
            })
            .await
    }

    /// Apply `edit` to the cached character list of `server_id`, seeding an
    /// empty list when nothing is cached yet.
    fn rewrite_characters<F>(&self, server_id: i32, edit: F) -> ApiResult<()>
    where
        F: FnOnce(&mut Vec<Character>),
    {
        let key = QueryKey::Characters { server_id };
        let mut list: Vec<Character> = match self.cache.get(&key) {
            Some(value) => from_value(value)?,
            None => Vec::new(),
        };
        edit(&mut list);
        self.cache.set(key, serde_json::to_value(&list)?);
        Ok(())
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
