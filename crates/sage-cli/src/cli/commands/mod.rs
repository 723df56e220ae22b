//! Command handlers for CLI subcommands.

pub mod auth;
pub mod config;
pub mod key;
pub mod repos;

use anyhow::{Context, Result};
use sage_core::auth::{Session, SessionStore};
use sage_core::config::Config;
use sage_core::identity::IdentityClient;

/// Restores the cached session for one-shot commands, refreshing it when
/// stale. Fails with guidance when no one is signed in.
async fn require_session(config: &Config) -> Result<Session> {
    let identity = IdentityClient::from_config(&config.identity)?;
    let store = SessionStore::new(identity);
    store.initialize(None).await;

    let session = store.snapshot().session;
    store.shutdown();
    session.context("Not signed in. Run `sage login` first.")
}
