//! UI event types.
//!
//! Events are the only inputs to the reducer: terminal input, timer ticks,
//! session store publishes, and completions of async work the runtime
//! spawned. Handlers send these to the runtime inbox.

use sage_core::api::Recommendation;
use sage_core::auth::{AuthSnapshot, Resolution};
use url::Url;

/// Events processed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick for animations and status message expiry.
    Tick,

    /// Raw terminal input (keys, paste, resize).
    Terminal(crossterm::event::Event),

    /// The session store published a new snapshot.
    StoreChanged(AuthSnapshot),

    /// Startup resolution finished. Carries the post-startup snapshot so
    /// navigation does not wait on the store watcher.
    InitializeCompleted {
        resolution: Resolution,
        snapshot: AuthSnapshot,
    },

    /// Sign-out finished; `remote_ok` is false when only local state could
    /// be cleared.
    SignOutCompleted { remote_ok: bool },

    /// The login listener finished, with or without a redirect URL.
    LoginCallbackResult { redirect: Option<Url> },

    /// A pasted or listener-delivered redirect URL was resolved.
    RedirectResolved { resolution: Resolution },

    /// The workflow API key arrived (`None`: never generated).
    ApiKeyLoaded {
        result: Result<Option<String>, String>,
    },

    /// A key generation request finished.
    ApiKeyGenerated { result: Result<String, String> },

    /// The repository list arrived.
    ReposLoaded {
        result: Result<Vec<String>, String>,
    },

    /// The latest recommendation for a repository arrived.
    RecommendationLoaded {
        repo: String,
        result: Result<Option<Recommendation>, String>,
    },

    /// A clipboard copy finished.
    ClipboardCopied { result: Result<(), String> },
}
