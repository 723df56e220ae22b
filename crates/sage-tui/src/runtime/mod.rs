//! TUI runtime - owns the terminal, runs the event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here. The
//! reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Async results are collected through a single "inbox" channel:
//! - Effect handlers send `UiEvent`s to `inbox_tx` when their work finishes
//! - The runtime drains `inbox_rx` each frame
//! - Session store publishes are forwarded into the same inbox by a watcher
//!   task, so guard decisions re-run on every session change

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use sage_core::api::ApiClient;
use sage_core::auth::session::AuthSnapshot;
use sage_core::auth::{Resolution, SessionStore, callback};
use sage_core::config::Config;
use sage_core::identity::IdentityClient;
use tokio::sync::mpsc;
use tracing::error;
use url::Url;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Target frame rate while something is in flight (60fps = ~16ms per frame).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle. Longer timeout reduces CPU usage when nothing
/// is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Runs the event loop and executes effects.
/// Terminal state is guaranteed to be restored on drop, panic, or Ctrl+C.
pub struct TuiRuntime {
    /// Terminal instance.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state.
    pub state: AppState,
    /// Inbox sender - handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - runtime drains this each frame.
    inbox_rx: UiEventReceiver,
    /// Last time a Tick event was emitted.
    last_tick: Instant,
    /// Last time a terminal event was received (for fast tick during
    /// interaction).
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates a new TUI runtime and kicks off startup resolution.
    ///
    /// `redirect` carries a login redirect URL passed on the command line.
    /// Must be called inside a tokio runtime; effect handlers are spawned
    /// onto it.
    pub fn new(config: Config, redirect: Option<Url>) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        // Clients are optional: with a missing config the shell still renders
        // and explains itself on the login view instead of refusing to start.
        let (store, identity, mut config_error) =
            match IdentityClient::from_config(&config.identity) {
                Ok(identity) => (
                    Some(SessionStore::new(identity.clone())),
                    Some(identity),
                    None,
                ),
                Err(e) => {
                    error!("Identity service not configured: {e:#}");
                    (None, None, Some(format!("{e:#}")))
                }
            };
        let api = match ApiClient::from_config(&config.api) {
            Ok(api) => Some(api),
            Err(e) => {
                error!("Backend API not configured: {e:#}");
                config_error.get_or_insert_with(|| format!("{e:#}"));
                None
            }
        };

        let state = AppState::new(config, store.clone(), identity, api, config_error);

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        // Forward store publishes (background refresh, revocation) into the
        // inbox; stops when the runtime or the store goes away.
        if let Some(store) = &store {
            let mut rx = store.subscribe();
            let tx = inbox_tx.clone();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    if tx.send(UiEvent::StoreChanged(snapshot)).is_err() {
                        return;
                    }
                }
            });
        }

        let now = Instant::now();
        let mut runtime = Self {
            terminal,
            state,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
        };

        // Startup resolution runs before any view is decided; the waiting
        // screen shows until it completes.
        runtime.execute_effect(UiEffect::Initialize { redirect });

        Ok(runtime)
    }

    /// Runs the main event loop.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let result = self.event_loop();

        let _ = terminal::disable_input_features();

        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.should_quit {
            let events = self.collect_events()?;

            for event in events {
                // Track terminal activity for fast tick mode
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }

                // Only Tick triggers render - this caps the frame rate at
                // tick cadence; other events batch renders to the next Tick.
                let marks_dirty = matches!(&event, UiEvent::Tick);

                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from the terminal and the inbox, then emits a Tick
    /// when its interval has elapsed.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Fast polling while async work is in flight or the user is actively
        // typing; slow polling otherwise to save CPU.
        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.is_busy() || recent_terminal_activity;

        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        // Drain inbox - all async results arrive here
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Poll terminal events:
        // - If we already have events to process, do a non-blocking poll
        // - Otherwise, block until the next tick is due
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            // Drain any remaining buffered events (non-blocking)
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    /// Spawns an async effect whose result event lands in the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    /// The backend API client plus the current access token, or a readable
    /// reason why a request cannot be made.
    fn api_and_token(&self) -> Result<(ApiClient, String), String> {
        let Some(api) = self.state.api.clone() else {
            return Err("Backend API is not configured. Run `sage config init` and set \
                        [api] base_url."
                .to_string());
        };
        let Some(token) = self.state.access_token() else {
            return Err("Not signed in.".to_string());
        };
        Ok((api, token))
    }

    /// Executes a single effect by dispatching to the appropriate handler.
    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }

            UiEffect::OpenBrowser { url } => {
                let _ = open::that(&url);
            }

            UiEffect::Initialize { redirect } => match self.state.store.clone() {
                Some(store) => {
                    self.spawn_effect(move || async move {
                        let resolution = store.initialize(redirect.as_ref()).await;
                        let snapshot = store.snapshot();
                        UiEvent::InitializeCompleted {
                            resolution,
                            snapshot,
                        }
                    });
                }
                // No identity service: startup is trivially done and the
                // guard must stop holding navigation.
                None => {
                    self.dispatch_event(UiEvent::InitializeCompleted {
                        resolution: Resolution::NotApplicable,
                        snapshot: AuthSnapshot {
                            session: None,
                            loading: false,
                            revision: 0,
                        },
                    });
                }
            },

            UiEffect::StartLoginListener => {
                let port = self.state.config.oauth.redirect_port;
                self.spawn_effect(move || async move {
                    let redirect = callback::wait_for_redirect(port, callback::LOGIN_TIMEOUT).await;
                    UiEvent::LoginCallbackResult { redirect }
                });
            }

            UiEffect::ResolveRedirect { input } => match self.state.store.clone() {
                Some(store) => {
                    self.spawn_effect(move || async move {
                        let resolution = match Url::parse(input.trim()) {
                            Ok(url) => store.resolve_redirect(&url).await,
                            Err(e) => Resolution::Failed {
                                reason: format!("That is not a valid URL: {e}"),
                            },
                        };
                        UiEvent::RedirectResolved { resolution }
                    });
                }
                None => {
                    self.dispatch_event(UiEvent::RedirectResolved {
                        resolution: Resolution::Failed {
                            reason: "Identity service is not configured.".to_string(),
                        },
                    });
                }
            },

            UiEffect::SignOut => match self.state.store.clone() {
                Some(store) => {
                    self.spawn_effect(move || async move {
                        let remote_ok = store.sign_out().await;
                        UiEvent::SignOutCompleted { remote_ok }
                    });
                }
                None => {
                    self.dispatch_event(UiEvent::SignOutCompleted { remote_ok: true });
                }
            },

            UiEffect::LoadApiKey => match self.api_and_token() {
                Ok((api, token)) => {
                    self.spawn_effect(move || async move {
                        let result = api
                            .fetch_api_key(&token)
                            .await
                            .map_err(|e| format!("{e:#}"));
                        UiEvent::ApiKeyLoaded { result }
                    });
                }
                Err(reason) => {
                    self.dispatch_event(UiEvent::ApiKeyLoaded {
                        result: Err(reason),
                    });
                }
            },

            UiEffect::GenerateApiKey => match self.api_and_token() {
                Ok((api, token)) => {
                    self.spawn_effect(move || async move {
                        let result = api
                            .generate_api_key(&token)
                            .await
                            .map_err(|e| format!("{e:#}"));
                        UiEvent::ApiKeyGenerated { result }
                    });
                }
                Err(reason) => {
                    self.dispatch_event(UiEvent::ApiKeyGenerated {
                        result: Err(reason),
                    });
                }
            },

            UiEffect::LoadRepos => match self.api_and_token() {
                Ok((api, token)) => {
                    self.spawn_effect(move || async move {
                        let result = api.list_repos(&token).await.map_err(|e| format!("{e:#}"));
                        UiEvent::ReposLoaded { result }
                    });
                }
                Err(reason) => {
                    self.dispatch_event(UiEvent::ReposLoaded {
                        result: Err(reason),
                    });
                }
            },

            UiEffect::LoadRecommendation { repo } => match self.api_and_token() {
                Ok((api, token)) => {
                    self.spawn_effect(move || async move {
                        let result = api
                            .latest_recommendation(&token, &repo)
                            .await
                            .map_err(|e| format!("{e:#}"));
                        UiEvent::RecommendationLoaded { repo, result }
                    });
                }
                Err(reason) => {
                    self.dispatch_event(UiEvent::RecommendationLoaded {
                        repo,
                        result: Err(reason),
                    });
                }
            },

            UiEffect::CopyToClipboard { text } => {
                let result = arboard::Clipboard::new()
                    .and_then(|mut clipboard| clipboard.set_text(text))
                    .map_err(|e| e.to_string());
                self.dispatch_event(UiEvent::ClipboardCopied { result });
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        if let Some(store) = &self.state.store {
            store.shutdown();
        }
        let _ = terminal::restore_terminal();
    }
}
