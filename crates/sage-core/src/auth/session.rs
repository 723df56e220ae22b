//! Session and identity types, plus the published auth snapshot.
//!
//! Tokens are never logged or displayed in full; use `mask_token` for any
//! user-facing output.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Returns the current unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(u64::MAX)
}

/// The signed-in user, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier.
    pub user_id: String,
    /// Email address, when the provider shares one.
    pub email: Option<String>,
    /// Provider-specific metadata (display name, avatar, etc.).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Identity {
    /// Returns the best human-readable label for this user.
    pub fn display_name(&self) -> &str {
        self.metadata
            .get("user_name")
            .or_else(|| self.metadata.get("name"))
            .and_then(|v| v.as_str())
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token (short-lived)
    pub access_token: String,
    /// The refresh token (long-lived)
    pub refresh_token: Option<String>,
    /// Expiry timestamp in seconds since epoch
    pub expires_at: u64,
    /// The user this session belongs to.
    pub identity: Identity,
}

impl Session {
    /// Returns true if the access token is expired.
    pub fn is_expired(&self) -> bool {
        now_secs() >= self.expires_at
    }

    /// Returns true if the access token expires within `secs` seconds.
    pub fn expires_within(&self, secs: u64) -> bool {
        now_secs().saturating_add(secs) >= self.expires_at
    }
}

/// The auth state published to subscribers.
///
/// `loading` is true until the first `initialize` pass (redirect resolution
/// plus cache restore) has finished. `revision` increments on every publish
/// so writers can detect that a newer state landed in between.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    /// The current session, if signed in.
    pub session: Option<Session>,
    /// True while startup resolution is still in flight.
    pub loading: bool,
    /// Monotonic publish counter.
    pub revision: u64,
}

impl AuthSnapshot {
    /// The state before `initialize` has run: no session, still loading.
    pub fn initial() -> Self {
        Self {
            session: None,
            loading: true,
            revision: 0,
        }
    }

    /// Returns true if a session is present.
    pub fn session_present(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.session.as_ref().map(|s| &s.identity)
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
