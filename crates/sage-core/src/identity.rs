//! Identity service client (Supabase auth / GoTrue REST surface).
//!
//! All requests carry the project anon key; authenticated requests add a
//! bearer access token on top.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::auth::session::{Identity, Session, now_secs};
use crate::config::IdentityConfig;

/// Fallback access-token lifetime when the service reports neither
/// `expires_at` nor `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Marker error for a session the identity service no longer accepts.
///
/// Callers downcast to this to tell "token is dead, clear it" apart from
/// transient failures (network down, 5xx) where the session should be kept.
#[derive(Debug)]
pub struct SessionRevoked {
    pub status: reqwest::StatusCode,
}

impl std::fmt::Display for SessionRevoked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Session revoked by identity service (HTTP {})", self.status)
    }
}

impl std::error::Error for SessionRevoked {}

pub(crate) fn is_local_url(url: &str) -> bool {
    url.contains("127.0.0.1") || url.contains("localhost")
}

/// Builds the browser URL that starts an OAuth login.
///
/// The identity service redirects the browser to `redirect_to` with the
/// session tokens in the URL fragment once the provider approves. Free
/// function so view code can build the URL without holding a client.
pub fn authorize_url(base_url: &str, provider: &str, scopes: &str, redirect_to: &str) -> String {
    let params = [
        ("provider", provider),
        ("redirect_to", redirect_to),
        ("scopes", scopes),
    ];

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    format!("{}/authorize?{query}", base_url.trim_end_matches('/'))
}

/// Identity service API client.
#[derive(Clone, Debug)]
pub struct IdentityClient {
    base_url: String,
    anon_key: String,
    http: reqwest::Client,
}

impl IdentityClient {
    /// Creates a new identity client.
    ///
    /// # Panics
    /// - In test builds (`#[cfg(test)]`), panics unless `base_url` points at
    ///   localhost.
    /// - At runtime, panics if `SAGE_BLOCK_REAL_API=1` and `base_url` is not
    ///   localhost.
    ///
    /// This prevents tests from accidentally making real network requests.
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        // Compile-time guard for unit tests
        #[cfg(test)]
        if !is_local_url(&base_url) {
            panic!(
                "Tests must not use a real identity service!\n\
                 Point base_url at a mock server (e.g., wiremock).\n\
                 Found base_url: {base_url}"
            );
        }

        // Runtime guard for integration tests (set SAGE_BLOCK_REAL_API=1 in test harness)
        #[cfg(not(test))]
        if std::env::var("SAGE_BLOCK_REAL_API").is_ok_and(|v| v == "1") && !is_local_url(&base_url)
        {
            panic!(
                "SAGE_BLOCK_REAL_API=1 but trying to use a real identity service!\n\
                 Point base_url at a mock server.\n\
                 Found base_url: {base_url}"
            );
        }

        Self {
            base_url,
            anon_key: anon_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client from config, failing with guidance if unset.
    pub fn from_config(config: &IdentityConfig) -> Result<Self> {
        let (Some(base_url), Some(anon_key)) =
            (config.effective_base_url(), config.effective_anon_key())
        else {
            anyhow::bail!(
                "Identity service is not configured.\n\
                 Set [identity] base_url and anon_key in {}\n\
                 (run `sage config init` to create the file).",
                crate::config::paths::config_path().display()
            );
        };

        Ok(Self::new(base_url, anon_key))
    }

    /// Builds the browser URL that starts an OAuth login.
    pub fn authorize_url(&self, provider: &str, scopes: &str, redirect_to: &str) -> String {
        authorize_url(&self.base_url, provider, scopes, redirect_to)
    }

    /// Fetches the user behind an access token, validating the token.
    pub async fn get_user(&self, access_token: &str) -> Result<Identity> {
        let url = format!("{}/user", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send user info request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if matches!(status.as_u16(), 400 | 401 | 403) {
                return Err(anyhow::Error::new(SessionRevoked { status })
                    .context(format!("User info request rejected (HTTP {status}): {body}")));
            }
            anyhow::bail!("User info request failed (HTTP {status}): {body}");
        }

        let user: UserResponse = response
            .json()
            .await
            .context("Failed to parse user info response")?;

        Ok(user.into_identity())
    }

    /// Exchanges a refresh token for a fresh session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let url = format!("{}/token?grant_type=refresh_token", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if matches!(status.as_u16(), 400 | 401 | 403) {
                return Err(anyhow::Error::new(SessionRevoked { status })
                    .context(format!("Token refresh rejected (HTTP {status}): {body}")));
            }
            anyhow::bail!("Token refresh failed (HTTP {status}): {body}");
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        Ok(token.into_session())
    }

    /// Revokes the session on the identity service.
    ///
    /// Local state is the caller's responsibility; a failure here means the
    /// remote side may still consider the token valid.
    pub async fn logout(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send logout request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Logout failed (HTTP {status}): {body}");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl UserResponse {
    fn into_identity(self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.filter(|e| !e.is_empty()),
            metadata: self.user_metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    expires_at: Option<u64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now_secs() + self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            identity: self.user.into_identity(),
        }
    }
}
