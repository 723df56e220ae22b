//! Application state composition.
//!
//! This module defines the top-level state for the TUI:
//!
//! ```text
//! AppState
//! ├── snapshot: AuthSnapshot   (mirror of the session store's last publish)
//! ├── intent: RouteIntent      (where the user wants to be)
//! ├── screen: Screen           (what is actually shown)
//! ├── login / api_key / repos  (per-view state)
//! └── status: Option<StatusMessage>
//! ```
//!
//! `screen` always follows from running `intent` and `snapshot` through the
//! route guard; the reducer never sets a protected screen directly.

use std::time::Instant;

use sage_core::api::ApiClient;
use sage_core::auth::{AuthSnapshot, RouteIntent, SessionStore};
use sage_core::config::Config;
use sage_core::identity::IdentityClient;

use crate::features::api_key::state::ApiKeyState;
use crate::features::login::state::LoginState;
use crate::features::repos::state::ReposState;

// ============================================================================
// Screen
// ============================================================================

/// What the TUI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Startup: session restore still running, no view decided yet.
    Waiting,
    Login,
    ApiKey,
    Repos,
}

// ============================================================================
// StatusMessage
// ============================================================================

/// Transient message shown in the status line.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    /// When the message was set; ticks expire it.
    pub set_at: Instant,
}

// ============================================================================
// AppState
// ============================================================================

/// TUI application state.
pub struct AppState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Loaded configuration.
    pub config: Config,
    /// Session store handle (absent when the identity service is unconfigured).
    pub store: Option<SessionStore>,
    /// Identity client for login URL building and redirect resolution.
    pub identity: Option<IdentityClient>,
    /// Backend API client (absent when the API is unconfigured).
    pub api: Option<ApiClient>,
    /// Shown on the login view when clients could not be built from config.
    pub config_error: Option<String>,
    /// Mirror of the last auth snapshot seen by the reducer.
    pub snapshot: AuthSnapshot,
    /// Where the user is headed; survives a guard denial so a later
    /// sign-in can return there.
    pub intent: RouteIntent,
    /// The view currently rendered.
    pub screen: Screen,
    /// Login view state.
    pub login: LoginState,
    /// API key view state.
    pub api_key: ApiKeyState,
    /// Repository view state.
    pub repos: ReposState,
    /// Transient status line message.
    pub status: Option<StatusMessage>,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Option<SessionStore>,
        identity: Option<IdentityClient>,
        api: Option<ApiClient>,
        config_error: Option<String>,
    ) -> Self {
        Self {
            should_quit: false,
            config,
            store,
            identity,
            api,
            config_error,
            snapshot: AuthSnapshot::initial(),
            intent: RouteIntent::ApiKey,
            screen: Screen::Waiting,
            login: LoginState::default(),
            api_key: ApiKeyState::default(),
            repos: ReposState::default(),
            status: None,
            spinner_frame: 0,
        }
    }

    /// Sets a transient status line message.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            set_at: Instant::now(),
        });
    }

    /// True while any async view work is in flight (drives fast polling).
    pub fn is_busy(&self) -> bool {
        self.snapshot.loading
            || self.login.is_busy()
            || self.api_key.is_busy()
            || self.repos.is_busy()
    }

    /// Access token of the current session, if any.
    pub fn access_token(&self) -> Option<String> {
        self.snapshot
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }
}

#[cfg(test)]
impl AppState {
    /// Builds a state with no clients, for reducer tests.
    pub fn for_tests() -> Self {
        Self::new(Config::default(), None, None, None, None)
    }
}
