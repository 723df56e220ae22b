//! Route guard for protected views.
//!
//! Every navigation goes through `decide`, which maps the requested view and
//! the current auth snapshot to a single decision. The guard never triggers
//! side effects; callers act on the decision (show the view, show login, or
//! hold while loading).

use crate::auth::session::AuthSnapshot;

/// The view a user is trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteIntent {
    /// The sign-in view. Public.
    Login,
    /// The API key / workflow setup view. Protected.
    ApiKey,
    /// The repositories and recommendations view. Protected.
    Repos,
}

impl RouteIntent {
    /// Returns true if this view requires a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, RouteIntent::Login)
    }

    /// Returns the short display name for this view.
    pub fn display_name(&self) -> &'static str {
        match self {
            RouteIntent::Login => "login",
            RouteIntent::ApiKey => "api-key",
            RouteIntent::Repos => "repos",
        }
    }

    /// Returns all views for iteration.
    pub fn all() -> &'static [RouteIntent] {
        &[RouteIntent::Login, RouteIntent::ApiKey, RouteIntent::Repos]
    }
}

/// The guard's verdict for a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state is still resolving; hold navigation, render nothing yet.
    Pending,
    /// Navigation may proceed to the requested view.
    Allow,
    /// Session required but absent; send the user to login instead.
    Deny,
}

/// Decides whether navigation to `intent` may proceed under `snapshot`.
///
/// Public views are always allowed, even while auth state is still loading.
/// Protected views wait for loading to finish, then require a session.
pub fn decide(intent: RouteIntent, snapshot: &AuthSnapshot) -> GuardDecision {
    if !intent.is_protected() {
        return GuardDecision::Allow;
    }

    if snapshot.loading {
        return GuardDecision::Pending;
    }

    if snapshot.session_present() {
        GuardDecision::Allow
    } else {
        GuardDecision::Deny
    }
}
