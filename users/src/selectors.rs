//! Read projections of [`UserState`]
//!
//! Every selector is memoized on the slice of state it reads, so repeated
//! calls against an unchanged slice return the cached value (for `Arc`
//! outputs, the very same allocation).

use crate::types::{User, UserId, UserState};
use roster_core::{Memoized, Selector, create_selector};
use std::sync::Arc;

type SelectedInput = (Arc<[User]>, Option<UserId>, Option<Arc<User>>);

/// Memoized selectors over [`UserState`]
///
/// Cloning shares the caches.
#[derive(Debug, Clone)]
pub struct UserSelectors {
    /// The full user list
    pub users: Arc<Memoized<UserState, Arc<[User]>, Arc<[User]>>>,
    /// The selected user, if it can be resolved
    pub selected_user: Arc<Memoized<UserState, SelectedInput, Option<Arc<User>>>>,
    /// The loading flag
    pub loading: Arc<Memoized<UserState, bool, bool>>,
    /// The last failure message
    pub error: Arc<Memoized<UserState, Option<String>, Option<String>>>,
}

impl Default for UserSelectors {
    fn default() -> Self {
        Self::new()
    }
}

impl UserSelectors {
    /// Build a fresh set of selectors with empty caches
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(create_selector(|s: &UserState| Arc::clone(&s.users), Arc::clone)),
            selected_user: Arc::new(create_selector(
                |s: &UserState| (Arc::clone(&s.users), s.selected_id, s.detail.clone()),
                |(users, selected_id, detail)| resolve_selected(users, *selected_id, detail.as_ref()),
            )),
            loading: Arc::new(create_selector(|s: &UserState| s.loading, |loading| *loading)),
            error: Arc::new(create_selector(|s: &UserState| s.error.clone(), Clone::clone)),
        }
    }

    /// Selector for one user by id
    ///
    /// Recomputes only when the user list changes.
    #[must_use]
    pub fn by_id(&self, id: UserId) -> Memoized<UserState, Arc<[User]>, Option<User>> {
        self.users
            .compose(move |users| users.iter().find(|u| u.id == id).cloned())
    }

    /// Selector for the user with `email`, compared trimmed and case-insensitively
    ///
    /// Lets callers check the soft email uniqueness before adding a user.
    #[must_use]
    pub fn by_email(&self, email: &str) -> Memoized<UserState, Arc<[User]>, Option<User>> {
        let wanted = email.trim().to_lowercase();
        self.users.compose(move |users| {
            users
                .iter()
                .find(|u| u.email.trim().to_lowercase() == wanted)
                .cloned()
        })
    }

    /// Selector for users matching a free-text query
    ///
    /// The query has `<` and `>` removed, is trimmed and lowercased, and
    /// matches when it is contained in the id, name, email or role. An
    /// empty query matches every user.
    #[must_use]
    pub fn filtered(&self, query: &str) -> Memoized<UserState, Arc<[User]>, Arc<[User]>> {
        let needle = normalize_query(query);
        self.users.compose(move |users| {
            if needle.is_empty() {
                return Arc::clone(users);
            }
            users.iter().filter(|u| matches_query(u, &needle)).cloned().collect()
        })
    }

    /// Current user list
    #[must_use]
    pub fn select_users(&self, state: &UserState) -> Arc<[User]> {
        self.users.select(state)
    }

    /// Current selected user
    #[must_use]
    pub fn select_selected_user(&self, state: &UserState) -> Option<Arc<User>> {
        self.selected_user.select(state)
    }
}

/// List entry first, then the detail read model; a dangling id resolves to `None`
fn resolve_selected(users: &[User], selected_id: Option<UserId>, detail: Option<&Arc<User>>) -> Option<Arc<User>> {
    let id = selected_id?;
    if let Some(user) = users.iter().find(|u| u.id == id) {
        return Some(Arc::new(user.clone()));
    }
    detail.filter(|d| d.id == id).cloned()
}

fn normalize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

fn matches_query(user: &User, needle: &str) -> bool {
    user.id.to_string().contains(needle)
        || user.name.to_lowercase().contains(needle)
        || user.email.to_lowercase().contains(needle)
        || user.role.to_lowercase().contains(needle)
}
