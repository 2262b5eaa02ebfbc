//! Typed access to the remote user collection
//!
//! Resources: `{base}/users` (collection) and `{base}/users/{id}` (item).

use crate::config::IdStrategy;
use crate::types::{User, UserDraft, UserId};
use roster_core::{HttpClient, RequestError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from [`UserApi`]
///
/// The display text becomes the message of the matching failure action.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request itself failed
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The service answered with JSON of the wrong shape
    #[error("unexpected payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The largest existing identifier has no successor
    #[error("no identifier left after {0}")]
    IdSpaceExhausted(UserId),
}

/// User service over an [`HttpClient`]
pub struct UserApi<H> {
    http: Arc<H>,
    base_url: Arc<str>,
    id_strategy: IdStrategy,
    create_lock: Arc<Mutex<()>>,
}

impl<H> Clone for UserApi<H> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            base_url: Arc::clone(&self.base_url),
            id_strategy: self.id_strategy,
            create_lock: Arc::clone(&self.create_lock),
        }
    }
}

impl<H> std::fmt::Debug for UserApi<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserApi")
            .field("base_url", &self.base_url)
            .field("id_strategy", &self.id_strategy)
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

impl<H: HttpClient> UserApi<H> {
    /// Create a service rooted at `base_url` (e.g. `http://localhost:3001`)
    #[must_use]
    pub fn new(http: H, base_url: &str) -> Self {
        Self {
            http: Arc::new(http),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            id_strategy: IdStrategy::default(),
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Choose how new users get their identifier
    #[must_use]
    pub const fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// The identifier strategy in use
    #[must_use]
    pub const fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// URL of the user collection
    #[must_use]
    pub fn collection_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    /// URL of one user
    #[must_use]
    pub fn item_url(&self, id: UserId) -> String {
        format!("{}/users/{id}", self.base_url)
    }

    /// `GET /users`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the body is not a user list.
    pub async fn list_users(&self) -> Result<Arc<[User]>, ApiError> {
        let users: Vec<User> = decode(self.http.get(&self.collection_url()).await?)?;
        Ok(users.into())
    }

    /// `GET /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the body is not a user.
    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        decode(self.http.get(&self.item_url(id)).await?)
    }

    /// Create a user according to the configured [`IdStrategy`]
    ///
    /// Returns the user as echoed by the service.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if any request fails or a body has the wrong shape.
    pub async fn create_user(&self, draft: &UserDraft) -> Result<User, ApiError> {
        match self.id_strategy {
            IdStrategy::MaxPlusOne => self.create_with_next_id(draft).await,
            IdStrategy::Serialized => {
                let _guard = self.create_lock.lock().await;
                self.create_with_next_id(draft).await
            },
            IdStrategy::ServerAssigned => {
                let body = serde_json::to_value(draft)?;
                decode(self.http.post(&self.collection_url(), body).await?)
            },
        }
    }

    /// Read the collection, take `max(id) + 1` (1 when empty), then `POST`
    ///
    /// Not atomic: two concurrent calls may read the same maximum.
    async fn create_with_next_id(&self, draft: &UserDraft) -> Result<User, ApiError> {
        let users = self.list_users().await?;
        let max_id = users.iter().map(|u| u.id).max().unwrap_or(UserId::new(0));
        let next_id = max_id.get().checked_add(1).ok_or(ApiError::IdSpaceExhausted(max_id))?;
        let user = User::from_draft(UserId::new(next_id), draft.clone());
        tracing::debug!(id = next_id, "Assigned identifier for new user");

        let body = serde_json::to_value(&user)?;
        decode(self.http.post(&self.collection_url(), body).await?)
    }

    /// `PUT /users/{id}` with the full user
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the body is not a user.
    pub async fn update_user(&self, user: &User) -> Result<User, ApiError> {
        let body = serde_json::to_value(user)?;
        decode(self.http.put(&self.item_url(user.id), body).await?)
    }

    /// `DELETE /users/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        Ok(self.http.delete(&self.item_url(id)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_testing::{Method, MockHttpClient};
    use serde_json::json;

    const BASE: &str = "http://localhost:3001";
    const USERS: &str = "http://localhost:3001/users";

    fn draft() -> UserDraft {
        UserDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: "Editor".into(),
        }
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let api = UserApi::new(MockHttpClient::new(), "http://localhost:3001/");
        assert_eq!(api.collection_url(), USERS);
        assert_eq!(api.item_url(UserId::new(4)), "http://localhost:3001/users/4");
    }

    #[tokio::test]
    async fn test_create_assigns_max_plus_one() -> Result<(), ApiError> {
        let http = MockHttpClient::new()
            .with_response(
                Method::Get,
                USERS,
                Ok(json!([
                    {"id": 3, "name": "A", "email": "a@x", "role": "Admin"},
                    {"id": 7, "name": "B", "email": "b@x", "role": "Admin"}
                ])),
            )
            .echo_writes();
        let api = UserApi::new(http.clone(), BASE);

        let created = api.create_user(&draft()).await?;
        assert_eq!(created.id, UserId::new(8));

        let calls = http.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].method, Method::Post);
        assert_eq!(calls[1].body.as_ref().map(|b| b["id"].clone()), Some(json!(8)));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_on_empty_collection_starts_at_one() -> Result<(), ApiError> {
        let http = MockHttpClient::new()
            .with_response(Method::Get, USERS, Ok(json!([])))
            .echo_writes();
        let created = UserApi::new(http, BASE).create_user(&draft()).await?;
        assert_eq!(created.id, UserId::new(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_server_assigned_posts_draft_only() -> Result<(), ApiError> {
        let http = MockHttpClient::new().with_response(
            Method::Post,
            USERS,
            Ok(json!({"id": 41, "name": "Ada", "email": "ada@example.com", "role": "Editor"})),
        );
        let api = UserApi::new(http.clone(), BASE).with_id_strategy(IdStrategy::ServerAssigned);

        let created = api.create_user(&draft()).await?;
        assert_eq!(created.id, UserId::new(41));

        let calls = http.calls();
        assert_eq!(calls.len(), 1, "no collection read before the write");
        assert_eq!(
            calls[0].body,
            Some(json!({"name": "Ada", "email": "ada@example.com", "role": "Editor"}))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_create_fails_when_listing_fails() {
        let http = MockHttpClient::new().with_response(
            Method::Get,
            USERS,
            Err(RequestError::Transport("timeout".into())),
        );
        let result = UserApi::new(http.clone(), BASE).create_user(&draft()).await;

        assert_eq!(result.err().map(|e| e.to_string()).as_deref(), Some("timeout"));
        assert_eq!(http.calls_to(Method::Post, USERS), 0);
    }

    #[tokio::test]
    async fn test_create_after_largest_id_is_an_error() {
        let http = MockHttpClient::new()
            .with_response(
                Method::Get,
                USERS,
                Ok(json!([{"id": u64::MAX, "name": "Max", "email": "max@x", "role": "Admin"}])),
            )
            .echo_writes();
        let result = UserApi::new(http.clone(), BASE).create_user(&draft()).await;

        assert!(matches!(result, Err(ApiError::IdSpaceExhausted(id)) if id == UserId::new(u64::MAX)));
        assert_eq!(http.calls_to(Method::Post, USERS), 0);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_payload_error() {
        let http = MockHttpClient::new().with_response(Method::Get, USERS, Ok(json!({"users": []})));
        let result = UserApi::new(http, BASE).list_users().await;
        assert!(matches!(result, Err(ApiError::Payload(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_use_item_url() -> Result<(), ApiError> {
        let http = MockHttpClient::new()
            .with_response(Method::Delete, "http://localhost:3001/users/2", Ok(Value::Null))
            .echo_writes();
        let api = UserApi::new(http.clone(), BASE);
        let user = User::from_draft(UserId::new(2), draft());

        assert_eq!(api.update_user(&user).await?, user);
        api.delete_user(UserId::new(2)).await?;

        assert_eq!(http.calls_to(Method::Put, "http://localhost:3001/users/2"), 1);
        assert_eq!(http.calls_to(Method::Delete, "http://localhost:3001/users/2"), 1);
        Ok(())
    }
}
