//! `roster`: load the configured user list once and print it

use anyhow::Context;
use roster_core::Action;
use roster_runtime::{EffectOrchestrator, ReqwestClient, Store, metrics::describe_metrics};
use roster_users::{UserAction, UserApi, UserEffects, UserReducer, UserSelectors, UserState, UsersConfig};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=info,roster_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    describe_metrics();

    let config = UsersConfig::from_env().context("reading configuration")?;
    config.validate().context("validating configuration")?;
    tracing::info!(
        api = %config.api_base_url,
        id_strategy = %config.id_strategy,
        "Starting roster"
    );

    let http = ReqwestClient::new(config.request_timeout()).context("building HTTP client")?;
    let api = UserApi::new(http, &config.api_base_url).with_id_strategy(config.id_strategy);

    let store = Store::with_config(UserState::default(), UserReducer, config.store_config());
    let orchestrator = EffectOrchestrator::spawn(&store, UserEffects::new(api));
    let selectors = UserSelectors::new();

    // One request timeout for the call plus a second of slack for dispatch
    let wait = config.request_timeout() + Duration::from_secs(1);
    let outcome = store
        .send_and_wait_for(UserAction::LoadUsers, Action::is_terminal, wait)
        .await
        .context("waiting for the user list")?;

    match outcome {
        UserAction::LoadUsersSuccess { .. } => {
            let users = store.state(|s| selectors.select_users(s));
            println!("{} user(s) at {}", users.len(), config.api_base_url);
            for user in users.iter() {
                println!("  #{:<4} {:<24} {:<32} {}", user.id.get(), user.name, user.email, user.role);
            }
        },
        other => {
            let error = store.state(|s| s.error.clone()).unwrap_or_default();
            tracing::error!(action = other.action_type(), %error, "Could not load users");
        },
    }

    store.dispatch(UserAction::Reset)?;
    orchestrator.shutdown(store.config().default_shutdown_timeout).await?;
    store.shutdown().await?;
    Ok(())
}
