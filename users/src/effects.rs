//! Side effects of the user feature
//!
//! Every request action triggers exactly one [`UserApi`] call, and the
//! outcome is mapped onto exactly one success or failure action. Errors
//! never escape: they become the failure action's message.

use crate::actions::UserAction;
use crate::api::UserApi;
use roster_core::{Effect, Effects, HttpClient, SmallVec, request_effect, smallvec};

/// Effect logic for [`UserAction`]
#[derive(Debug, Clone)]
pub struct UserEffects<H> {
    api: UserApi<H>,
}

impl<H: HttpClient> UserEffects<H> {
    /// Create effects backed by `api`
    #[must_use]
    pub const fn new(api: UserApi<H>) -> Self {
        Self { api }
    }

    fn load_users(&self) -> Effect<UserAction> {
        let api = self.api.clone();
        request_effect! {
            run: api.list_users(),
            on_success: |users| UserAction::LoadUsersSuccess { users },
            on_error: |error| {
                tracing::warn!(%error, "Loading users failed");
                UserAction::LoadUsersFailure { error: error.to_string() }
            }
        }
    }

    fn load_user(&self, id: crate::UserId) -> Effect<UserAction> {
        let api = self.api.clone();
        request_effect! {
            run: api.get_user(id),
            on_success: |user| UserAction::LoadUserSuccess { user },
            on_error: |error| {
                tracing::warn!(%error, %id, "Loading user failed");
                UserAction::LoadUserFailure { error: error.to_string() }
            }
        }
    }

    fn add_user(&self, draft: crate::UserDraft) -> Effect<UserAction> {
        let api = self.api.clone();
        request_effect! {
            run: api.create_user(&draft),
            on_success: |user| UserAction::AddUserSuccess { user },
            on_error: |error| {
                tracing::warn!(%error, strategy = %api.id_strategy(), "Creating user failed");
                UserAction::AddUserFailure { error: error.to_string() }
            }
        }
    }

    fn update_user(&self, user: crate::User) -> Effect<UserAction> {
        let api = self.api.clone();
        request_effect! {
            run: api.update_user(&user),
            on_success: |user| UserAction::UpdateUserSuccess { user },
            on_error: |error| {
                tracing::warn!(%error, id = %user.id, "Updating user failed");
                UserAction::UpdateUserFailure { error: error.to_string() }
            }
        }
    }

    fn delete_user(&self, id: crate::UserId) -> Effect<UserAction> {
        let api = self.api.clone();
        request_effect! {
            run: api.delete_user(id),
            on_success: |()| UserAction::DeleteUserSuccess { id },
            on_error: |error| {
                tracing::warn!(%error, %id, "Deleting user failed");
                UserAction::DeleteUserFailure { error: error.to_string() }
            }
        }
    }
}

impl<H: HttpClient> Effects for UserEffects<H> {
    type Action = UserAction;

    fn handle(&self, action: &UserAction) -> SmallVec<[Effect<UserAction>; 4]> {
        match action {
            UserAction::LoadUsers => smallvec![self.load_users()],
            UserAction::LoadUser { id } => smallvec![self.load_user(*id)],
            UserAction::AddUser { draft } => smallvec![self.add_user(draft.clone())],
            UserAction::UpdateUser { user } => smallvec![self.update_user(user.clone())],
            UserAction::DeleteUser { id } => smallvec![self.delete_user(*id)],
            _ => SmallVec::new(),
        }
    }
}
