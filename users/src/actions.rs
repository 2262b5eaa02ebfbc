//! The user action catalog
//!
//! Each remote operation has a request, a success and a failure action.
//! Failures carry the error's display text.

use crate::types::{User, UserDraft, UserId};
use roster_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Every state transition of the user feature
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserAction {
    /// Fetch the full user list
    #[request]
    LoadUsers,
    /// The user list arrived
    #[success]
    LoadUsersSuccess {
        /// The users, in server order
        users: Arc<[User]>,
    },
    /// Fetching the list failed
    #[failure]
    LoadUsersFailure {
        /// Error message
        error: String,
    },

    /// Fetch one user
    #[request]
    LoadUser {
        /// User to fetch
        id: UserId,
    },
    /// The user arrived
    #[success]
    LoadUserSuccess {
        /// The user
        user: User,
    },
    /// Fetching the user failed
    #[failure]
    LoadUserFailure {
        /// Error message
        error: String,
    },

    /// Create a user; the identifier is assigned on the way
    #[request]
    AddUser {
        /// Fields of the new user
        draft: UserDraft,
    },
    /// The user was created
    #[success]
    AddUserSuccess {
        /// The created user as returned by the service
        user: User,
    },
    /// Creating the user failed
    #[failure]
    AddUserFailure {
        /// Error message
        error: String,
    },

    /// Replace a user
    #[request]
    UpdateUser {
        /// The full replacement
        user: User,
    },
    /// The user was replaced
    #[success]
    UpdateUserSuccess {
        /// The user as returned by the service
        user: User,
    },
    /// Replacing the user failed
    #[failure]
    UpdateUserFailure {
        /// Error message
        error: String,
    },

    /// Remove a user
    #[request]
    DeleteUser {
        /// User to remove
        id: UserId,
    },
    /// The user was removed
    #[success]
    DeleteUserSuccess {
        /// The removed user
        id: UserId,
    },
    /// Removing the user failed
    #[failure]
    DeleteUserFailure {
        /// Error message
        error: String,
    },

    /// Mark a user as selected
    SelectUser {
        /// The selected user
        user: User,
    },

    /// Return to the initial state
    Reset,
}
