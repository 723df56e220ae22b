//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! This keeps the reducer pure: it only mutates state and returns effects,
//! never performs I/O or spawns tasks directly.

/// Effects returned by the reducer for the runtime to execute.
///
/// The reducer returns `Vec<UiEffect>` from each update call.
/// The runtime executes these effects after the event is applied.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Run startup resolution on the session store.
    Initialize { redirect: Option<url::Url> },

    /// Listen on the loopback port for the browser login redirect.
    StartLoginListener,

    /// Resolve a redirect URL (pasted or delivered by the listener).
    ResolveRedirect { input: String },

    /// Sign out of the current session.
    SignOut,

    /// Fetch the workflow API key.
    LoadApiKey,

    /// Generate a fresh workflow API key.
    GenerateApiKey,

    /// Fetch the repository list.
    LoadRepos,

    /// Fetch the latest recommendation for a repository.
    LoadRecommendation { repo: String },

    /// Copy text to the clipboard.
    CopyToClipboard { text: String },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
