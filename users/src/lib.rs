//! # Roster Users
//!
//! The user records feature: one authoritative [`UserState`] kept consistent
//! while list/get/add/update/delete requests against a remote service are in
//! flight.
//!
//! ## Wiring
//!
//! ```ignore
//! use roster_runtime::{EffectOrchestrator, ReqwestClient, Store};
//! use roster_users::*;
//!
//! let config = UsersConfig::from_env()?;
//! let http = ReqwestClient::new(config.request_timeout())?;
//! let api = UserApi::new(http, &config.api_base_url).with_id_strategy(config.id_strategy);
//!
//! let store: UserStore = Store::with_config(UserState::default(), UserReducer, config.store_config());
//! let orchestrator = EffectOrchestrator::spawn(&store, UserEffects::new(api));
//!
//! store.dispatch(UserAction::LoadUsers)?;
//! let mut users = store.select(UserSelectors::new().users);
//! users.changed().await?;
//! ```

/// The action catalog
pub mod actions;

/// Typed access to the user service
pub mod api;

/// Environment-driven configuration
pub mod config;

/// Request actions to service calls
pub mod effects;

/// State transitions
pub mod reducer;

/// Read projections
pub mod selectors;

/// Domain types
pub mod types;

pub use actions::UserAction;
pub use api::{ApiError, UserApi};
pub use config::{ConfigError, IdStrategy, MAX_HISTORY_LIMIT, UsersConfig};
pub use effects::UserEffects;
pub use reducer::UserReducer;
pub use selectors::UserSelectors;
pub use types::{User, UserDraft, UserId, UserState};

/// A store holding the user feature
pub type UserStore = roster_runtime::Store<UserState, UserAction>;
