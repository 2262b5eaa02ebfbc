//! Pure state transitions for the user feature

use crate::actions::UserAction;
use crate::types::{User, UserId, UserState};
use roster_core::Reducer;
use std::collections::HashSet;
use std::sync::Arc;

/// Reducer for [`UserState`]
///
/// | Action | Result |
/// |---|---|
/// | any request | `loading = true`, `error = None` |
/// | `LoadUsersSuccess` | list replaced (later duplicate ids dropped) |
/// | `LoadUserSuccess` | user selected and kept as `detail` |
/// | `AddUserSuccess` | user appended, or replaced in place if the id is known |
/// | `UpdateUserSuccess` | matching user replaced, user selected |
/// | `DeleteUserSuccess` | user removed, selection cleared if it was that user |
/// | any failure | `error` set |
/// | `SelectUser` | user selected |
/// | `Reset` | initial state |
///
/// Every success and failure also sets `loading = false`. When a step
/// changes nothing, the input `Arc` is returned as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserReducer;

impl Reducer for UserReducer {
    type State = UserState;
    type Action = UserAction;

    fn reduce(&self, state: &Arc<UserState>, action: &UserAction) -> Arc<UserState> {
        let mut next = UserState::clone(state);

        match action {
            UserAction::LoadUsers
            | UserAction::LoadUser { .. }
            | UserAction::AddUser { .. }
            | UserAction::UpdateUser { .. }
            | UserAction::DeleteUser { .. } => {
                next.loading = true;
                next.error = None;
            },

            UserAction::LoadUsersSuccess { users } => {
                next.users = unique_by_id(users);
                next.loading = false;
            },
            UserAction::LoadUserSuccess { user } => {
                select(&mut next, user);
                next.loading = false;
            },
            UserAction::AddUserSuccess { user } => {
                next.users = upsert(&state.users, user);
                next.loading = false;
            },
            UserAction::UpdateUserSuccess { user } => {
                if state.users.iter().any(|u| u.id == user.id) {
                    next.users = upsert(&state.users, user);
                }
                select(&mut next, user);
                next.loading = false;
            },
            UserAction::DeleteUserSuccess { id } => {
                if state.users.iter().any(|u| u.id == *id) {
                    next.users = without(&state.users, *id);
                }
                if next.selected_id == Some(*id) {
                    next.selected_id = None;
                }
                if next.detail.as_ref().is_some_and(|d| d.id == *id) {
                    next.detail = None;
                }
                next.loading = false;
            },

            UserAction::LoadUsersFailure { error }
            | UserAction::LoadUserFailure { error }
            | UserAction::AddUserFailure { error }
            | UserAction::UpdateUserFailure { error }
            | UserAction::DeleteUserFailure { error } => {
                next.error = Some(error.clone());
                next.loading = false;
            },

            UserAction::SelectUser { user } => select(&mut next, user),

            UserAction::Reset => next = UserState::default(),
        }

        if next == **state {
            Arc::clone(state)
        } else {
            Arc::new(next)
        }
    }
}

fn select(state: &mut UserState, user: &User) {
    state.selected_id = Some(user.id);
    state.detail = Some(Arc::new(user.clone()));
}

/// Keep the first occurrence of every id; reuse the slice when already unique
fn unique_by_id(users: &Arc<[User]>) -> Arc<[User]> {
    let mut seen = HashSet::with_capacity(users.len());
    if users.iter().all(|u| seen.insert(u.id)) {
        return Arc::clone(users);
    }

    seen.clear();
    users.iter().filter(|u| seen.insert(u.id)).cloned().collect()
}

fn upsert(users: &[User], user: &User) -> Arc<[User]> {
    let mut next = users.to_vec();
    match next.iter_mut().find(|u| u.id == user.id) {
        Some(existing) => *existing = user.clone(),
        None => next.push(user.clone()),
    }
    next.into()
}

fn without(users: &[User], id: UserId) -> Arc<[User]> {
    users.iter().filter(|u| u.id != id).cloned().collect()
}
