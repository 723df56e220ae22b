//! Redirect resolution.
//!
//! After a browser login the identity service sends the user back with
//! session tokens in the URL fragment (`#access_token=...`). This module
//! decides whether a URL is such a redirect, validates the token against the
//! identity service, and reports what should happen next. It never mutates
//! auth state itself; the session store applies the outcome.

use anyhow::Result;
use url::Url;

use crate::auth::guard::RouteIntent;
use crate::auth::session::{Session, now_secs};
use crate::identity::IdentityClient;

/// Marker that identifies a login redirect URL.
const TOKEN_MARKER: &str = "access_token=";

/// Fallback token lifetime when the fragment carries no expiry at all.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// The outcome of looking at one URL exactly once.
#[derive(Debug)]
pub enum Resolution {
    /// The URL is not a login redirect; nothing was done.
    NotApplicable,
    /// A session was established from the redirect.
    Resolved {
        /// The validated session.
        session: Session,
        /// The redirect URL with the token fragment removed. Safe to show
        /// or store; the original URL should not be kept around.
        stripped_url: Url,
        /// Where the user should land after login.
        target: RouteIntent,
    },
    /// The URL looked like a login redirect but no session came of it.
    Failed {
        /// Human-readable reason, shown on the login view.
        reason: String,
    },
}

/// Tokens carried by a login redirect fragment.
#[derive(Debug)]
struct RedirectTokens {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: u64,
}

/// Returns true if the URL carries a token fragment.
pub fn has_token_fragment(url: &Url) -> bool {
    url.fragment().is_some_and(|f| f.contains(TOKEN_MARKER))
}

/// Returns the URL with its fragment removed.
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}

/// Parses session tokens out of a redirect fragment.
fn parse_fragment(url: &Url) -> Result<RedirectTokens> {
    let fragment = url.fragment().unwrap_or("");
    let params: Vec<(String, String)> = url::form_urlencoded::parse(fragment.as_bytes())
        .into_owned()
        .collect();

    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let Some(access_token) = get("access_token").filter(|t| !t.is_empty()) else {
        anyhow::bail!("Redirect fragment has no access_token");
    };

    // Prefer the absolute expiry when present; fall back to relative.
    let expires_at = get("expires_at")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or_else(|| {
            let expires_in = get("expires_in")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
            now_secs() + expires_in
        });

    Ok(RedirectTokens {
        access_token,
        refresh_token: get("refresh_token").filter(|t| !t.is_empty()),
        expires_at,
    })
}

/// Resolves a URL into a session if (and only if) it is a login redirect.
///
/// Looking at the same URL twice is harmless: once resolved, the stripped
/// URL no longer carries the marker and resolves to `NotApplicable`.
pub async fn resolve_if_present(identity: &IdentityClient, url: &Url) -> Resolution {
    if !has_token_fragment(url) {
        return Resolution::NotApplicable;
    }

    let tokens = match parse_fragment(url) {
        Ok(tokens) => tokens,
        Err(e) => {
            return Resolution::Failed {
                reason: format!("{e:#}"),
            };
        }
    };

    // Validate the token before trusting anything in the fragment.
    match identity.get_user(&tokens.access_token).await {
        Ok(user) => Resolution::Resolved {
            session: Session {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_at: tokens.expires_at,
                identity: user,
            },
            stripped_url: strip_fragment(url),
            target: RouteIntent::ApiKey,
        },
        Err(e) => Resolution::Failed {
            reason: format!("{e:#}"),
        },
    }
}
