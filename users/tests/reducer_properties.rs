//! Property tests for `UserReducer`

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use roster_core::composition::scope_reducer;
use roster_core::{Action, Reducer};
use roster_users::{User, UserAction, UserDraft, UserId, UserReducer, UserState};
use std::collections::HashSet;
use std::sync::Arc;

fn user_strategy() -> impl Strategy<Value = User> {
    (1u64..12, "[a-z]{1,6}", prop_oneof![Just("Admin"), Just("Editor")]).prop_map(|(id, name, role)| User {
        id: UserId::new(id),
        email: format!("{name}@example.com"),
        name,
        role: role.to_string(),
    })
}

fn action_strategy() -> impl Strategy<Value = UserAction> {
    let id = (1u64..12).prop_map(UserId::new);
    let error = "[a-z ]{0,12}";
    let requests = prop_oneof![
        Just(UserAction::LoadUsers),
        id.clone().prop_map(|id| UserAction::LoadUser { id }),
        user_strategy().prop_map(|user| UserAction::AddUser {
            draft: UserDraft {
                name: user.name,
                email: user.email,
                role: user.role,
            }
        }),
        user_strategy().prop_map(|user| UserAction::UpdateUser { user }),
        id.clone().prop_map(|id| UserAction::DeleteUser { id }),
    ];
    let outcomes = prop_oneof![
        prop::collection::vec(user_strategy(), 0..8).prop_map(|users| UserAction::LoadUsersSuccess { users: users.into() }),
        error.prop_map(|error| UserAction::LoadUsersFailure { error }),
        user_strategy().prop_map(|user| UserAction::LoadUserSuccess { user }),
        user_strategy().prop_map(|user| UserAction::AddUserSuccess { user }),
        error.prop_map(|error| UserAction::AddUserFailure { error }),
        user_strategy().prop_map(|user| UserAction::UpdateUserSuccess { user }),
        id.prop_map(|id| UserAction::DeleteUserSuccess { id }),
        error.prop_map(|error| UserAction::DeleteUserFailure { error }),
    ];
    let local = prop_oneof![
        user_strategy().prop_map(|user| UserAction::SelectUser { user }),
        Just(UserAction::Reset),
    ];
    prop_oneof![4 => requests, 5 => outcomes, 1 => local]
}

fn run(actions: &[UserAction]) -> Arc<UserState> {
    actions
        .iter()
        .fold(Arc::new(UserState::default()), |state, action| UserReducer.reduce(&state, action))
}

fn ids_unique(state: &UserState) -> bool {
    let mut seen = HashSet::new();
    state.users.iter().all(|u| seen.insert(u.id))
}

proptest! {
    #[test]
    fn reduce_is_deterministic(history in prop::collection::vec(action_strategy(), 0..20), action in action_strategy()) {
        let state = run(&history);
        let before = UserState::clone(&state);

        let first = UserReducer.reduce(&state, &action);
        let second = UserReducer.reduce(&state, &action);

        prop_assert_eq!(&*first, &*second);
        prop_assert_eq!(&*state, &before, "input state was modified");
    }

    #[test]
    fn ids_stay_unique(history in prop::collection::vec(action_strategy(), 0..40)) {
        let mut state = Arc::new(UserState::default());
        for action in &history {
            state = UserReducer.reduce(&state, action);
            prop_assert!(ids_unique(&state), "duplicate ids after {:?}", action);
        }
    }

    #[test]
    fn requests_set_loading_and_clear_error(history in prop::collection::vec(action_strategy(), 0..20), action in action_strategy()) {
        prop_assume!(action.is_request());
        let next = UserReducer.reduce(&run(&history), &action);
        prop_assert!(next.loading);
        prop_assert_eq!(&next.error, &None);
    }

    #[test]
    fn outcomes_clear_loading(history in prop::collection::vec(action_strategy(), 0..20), action in action_strategy()) {
        prop_assume!(action.is_terminal());
        let next = UserReducer.reduce(&run(&history), &action);
        prop_assert!(!next.loading);
        if action.is_failure() {
            prop_assert!(next.error.is_some());
        }
    }

    #[test]
    fn deleted_user_is_never_selected(history in prop::collection::vec(action_strategy(), 0..20), id in (1u64..12).prop_map(UserId::new)) {
        let next = UserReducer.reduce(&run(&history), &UserAction::DeleteUserSuccess { id });
        prop_assert!(next.users.iter().all(|u| u.id != id));
        prop_assert_ne!(next.selected_id, Some(id));
    }
}

#[derive(Clone, Default)]
struct AppState {
    users: Arc<UserState>,
    theme: String,
}

#[derive(Clone)]
enum AppAction {
    Users(UserAction),
    SetTheme(String),
}

#[test]
fn scoped_reducer_ignores_foreign_actions() {
    let app = scope_reducer(
        UserReducer,
        |s: &AppState| &s.users,
        |s: &AppState, users| AppState { users, ..s.clone() },
        |a: &AppAction| match a {
            AppAction::Users(inner) => Some(inner),
            AppAction::SetTheme(_) => None,
        },
    );

    let state = Arc::new(AppState::default());
    let same = app.reduce(&state, &AppAction::SetTheme("dark".into()));
    assert!(Arc::ptr_eq(&state, &same));
    assert!(same.theme.is_empty());

    let loading = app.reduce(&state, &AppAction::Users(UserAction::LoadUsers));
    assert!(loading.users.loading);

    let again = app.reduce(&loading, &AppAction::Users(UserAction::LoadUsers));
    assert!(Arc::ptr_eq(&loading, &again));
}
