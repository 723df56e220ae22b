//! Central reducer: applies events to state and returns effects.
//!
//! All navigation goes through [`navigate`], which runs the requested
//! route through the guard before any screen change. The reducer never
//! sets a protected screen directly, so there is no way to show one
//! without a session.

use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use sage_core::auth::{GuardDecision, Resolution, RouteIntent, guard};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features;
use crate::features::api_key::state::ApiKeyState;
use crate::features::login::state::{LoginFlow, LoginState};
use crate::features::repos::state::ReposState;
use crate::state::{AppState, Screen};

/// How long a status line message stays up.
const STATUS_TTL: Duration = Duration::from_secs(4);

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            if let Some(status) = &app.status
                && status.set_at.elapsed() >= STATUS_TTL
            {
                app.status = None;
            }
            vec![]
        }

        UiEvent::Terminal(event) => handle_terminal_event(app, event),

        UiEvent::StoreChanged(snapshot) => {
            app.snapshot = snapshot;
            navigate(app, app.intent)
        }

        UiEvent::InitializeCompleted {
            resolution,
            snapshot,
        } => {
            app.snapshot = snapshot;
            match resolution {
                Resolution::Resolved { target, .. } => {
                    app.set_status("Signed in.");
                    navigate(app, target)
                }
                Resolution::Failed { reason } => {
                    app.login.error = Some(reason);
                    navigate(app, app.intent)
                }
                Resolution::NotApplicable => navigate(app, app.intent),
            }
        }

        UiEvent::SignOutCompleted { remote_ok } => {
            // The store has already cleared the session; reflect that here
            // instead of waiting for the watcher to catch up. Per-view state
            // must not leak into the next sign-in.
            app.snapshot.session = None;
            app.api_key = ApiKeyState::default();
            app.repos = ReposState::default();
            if remote_ok {
                app.set_status("Signed out.");
            } else {
                app.set_status("Signed out locally; the identity service could not be reached.");
            }
            navigate(app, RouteIntent::Login)
        }

        UiEvent::LoginCallbackResult { redirect } => {
            app.login.listener_active = false;
            match redirect {
                Some(url) if matches!(app.login.flow, LoginFlow::AwaitingRedirect { .. }) => {
                    app.login.flow = LoginFlow::Resolving;
                    vec![UiEffect::ResolveRedirect {
                        input: url.to_string(),
                    }]
                }
                // Flow was reset or completed some other way; drop the result.
                Some(_) => vec![],
                None => {
                    if matches!(app.login.flow, LoginFlow::AwaitingRedirect { .. }) {
                        app.login.flow = LoginFlow::Idle;
                        app.login.error =
                            Some("Timed out waiting for the browser redirect.".to_string());
                    }
                    vec![]
                }
            }
        }

        UiEvent::RedirectResolved { resolution } => match resolution {
            Resolution::Resolved {
                session, target, ..
            } => {
                app.snapshot.session = Some(session);
                app.login = LoginState {
                    listener_active: app.login.listener_active,
                    ..LoginState::default()
                };
                app.set_status("Signed in.");
                navigate(app, target)
            }
            Resolution::Failed { reason } => {
                app.login.flow = LoginFlow::Idle;
                app.login.error = Some(reason);
                vec![]
            }
            Resolution::NotApplicable => {
                app.login.flow = LoginFlow::Idle;
                app.login.error = Some("That URL has no access token in it.".to_string());
                vec![]
            }
        },

        UiEvent::ApiKeyLoaded { result } => features::api_key::update::handle_loaded(app, result),
        UiEvent::ApiKeyGenerated { result } => {
            features::api_key::update::handle_generated(app, result)
        }
        UiEvent::ReposLoaded { result } => features::repos::update::handle_loaded(app, result),
        UiEvent::RecommendationLoaded { repo, result } => {
            features::repos::update::handle_recommendation(app, repo, result)
        }

        UiEvent::ClipboardCopied { result } => {
            match result {
                Ok(()) => app.set_status("Copied to clipboard."),
                Err(e) => app.set_status(format!("Clipboard copy failed: {e}")),
            }
            vec![]
        }
    }
}

// ============================================================================
// Navigation
// ============================================================================

/// Applies a navigation request through the route guard.
///
/// `Pending` holds the waiting view. `Deny` shows the login view but keeps
/// the requested intent, so a later sign-in can return the user there. A
/// signed-in user asking for the login view is sent to the API key view
/// instead.
pub fn navigate(app: &mut AppState, intent: RouteIntent) -> Vec<UiEffect> {
    let intent = if intent == RouteIntent::Login
        && !app.snapshot.loading
        && app.snapshot.session_present()
    {
        RouteIntent::ApiKey
    } else {
        intent
    };
    app.intent = intent;

    let target = match guard::decide(intent, &app.snapshot) {
        GuardDecision::Pending => Screen::Waiting,
        GuardDecision::Deny => Screen::Login,
        GuardDecision::Allow => match intent {
            RouteIntent::Login => Screen::Login,
            RouteIntent::ApiKey => Screen::ApiKey,
            RouteIntent::Repos => Screen::Repos,
        },
    };

    // Re-running the guard on a store publish must not reload the current
    // view; only an actual screen change enters one.
    if app.screen == target {
        return vec![];
    }
    app.screen = target;

    match target {
        Screen::ApiKey => features::api_key::update::enter(app),
        Screen::Repos => features::repos::update::enter(app),
        Screen::Waiting | Screen::Login => vec![],
    }
}

// ============================================================================
// Terminal Events
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Paste(text) => {
            if app.screen == Screen::Login {
                return features::login::update::handle_paste(app, &text);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Ctrl+C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    match app.screen {
        Screen::Waiting => match key.code {
            KeyCode::Char('q') => vec![UiEffect::Quit],
            _ => vec![],
        },
        Screen::Login => features::login::update::handle_key(app, key),
        Screen::ApiKey => features::api_key::update::handle_key(app, key),
        Screen::Repos => features::repos::update::handle_key(app, key),
    }
}
