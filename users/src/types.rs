//! User domain types

use roster_core::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Server-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wrap a raw identifier
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Identity for UserId {
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

/// A user record
///
/// `email` is a soft uniqueness key for callers; nothing here enforces it.
/// `role` is an open set (`"Admin"`, `"Editor"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier, unique within the collection
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
    /// Role name
    pub role: String,
}

impl User {
    /// Complete a draft with an identifier
    #[must_use]
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
        }
    }
}

/// A user that has not been created yet (no identifier)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
    /// Role name
    pub role: String,
}

/// State of the user feature
///
/// `selected_id` is a weak reference: it may name a user that is no longer
/// in `users`. `detail` holds the last user delivered individually (by a
/// load, an update or a selection), so a selected user that was never part
/// of a listed page can still be shown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserState {
    /// Known users, unique by id, in server order
    pub users: Arc<[User]>,
    /// Currently selected user id
    pub selected_id: Option<UserId>,
    /// Last individually delivered user
    pub detail: Option<Arc<User>>,
    /// True while a request is in flight
    pub loading: bool,
    /// Message of the most recent failure, cleared by the next request
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_json_shape() -> Result<(), serde_json::Error> {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "John Doe",
            "email": "john@example.com",
            "role": "Admin"
        }))?;

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(serde_json::to_value(&user)?["id"], json!(1));
        Ok(())
    }

    #[test]
    fn test_from_draft() {
        let draft = UserDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: "Editor".into(),
        };
        let user = User::from_draft(UserId::new(7), draft);
        assert_eq!(user.id.get(), 7);
        assert_eq!(user.name, "Ada");
        assert_eq!(user.id.to_string(), "7");
    }

    #[test]
    fn test_initial_state() {
        let state = UserState::default();
        assert!(state.users.is_empty());
        assert_eq!(state.selected_id, None);
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }
}
