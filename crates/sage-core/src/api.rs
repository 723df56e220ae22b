//! Client for the Build Sage backend API.
//!
//! Everything here requires a signed-in session; callers pass the current
//! access token explicitly so the session store remains the only place
//! that holds auth state.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::{ApiConfig, paths};
use crate::identity::is_local_url;

/// One stored debugging recommendation for a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Recommendation {
    pub file_name: String,
    pub old_code: String,
    pub new_code: String,
    pub response_data: String,
    pub created_at: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        #[cfg(test)]
        {
            if !is_local_url(&base_url) {
                panic!(
                    "Tests must not use a real backend API!\n\
                     Point the client at a mock server (e.g., wiremock).\n\
                     Found base_url: {base_url}"
                );
            }
        }

        #[cfg(not(test))]
        {
            if std::env::var("SAGE_BLOCK_REAL_API").is_ok_and(|v| v == "1")
                && !is_local_url(&base_url)
            {
                panic!("SAGE_BLOCK_REAL_API=1 but base_url is not local: {base_url}");
            }
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Builds a client from config, with guidance when it is missing.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let Some(base_url) = config.effective_base_url() else {
            anyhow::bail!(
                "Backend API is not configured.\n\
                 Set [api] base_url in {}\n\
                 (run `sage config init` to create the file).",
                paths::config_path().display()
            );
        };
        Ok(Self::new(base_url))
    }

    /// Fetches the workflow API key, or `None` if one was never generated.
    pub async fn fetch_api_key(&self, access_token: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!("{}/api/key", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send API key request")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API key request failed (HTTP {status}): {body}");
        }

        let body: KeyResponse = response
            .json()
            .await
            .context("Failed to parse API key response")?;
        Ok(Some(body.api_key))
    }

    /// Generates a fresh workflow API key, replacing any existing one.
    pub async fn generate_api_key(&self, access_token: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/generate-key", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send key generation request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Key generation failed (HTTP {status}): {body}");
        }

        let body: KeyResponse = response
            .json()
            .await
            .context("Failed to parse key generation response")?;
        Ok(body.api_key)
    }

    /// Lists repositories that have reported workflow failures.
    pub async fn list_repos(&self, access_token: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/api/repos", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send repository list request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Repository list request failed (HTTP {status}): {body}");
        }

        let body: ReposResponse = response
            .json()
            .await
            .context("Failed to parse repository list response")?;
        Ok(dedup_preserving_order(body.repos))
    }

    /// Fetches the latest recommendation for a repository, or `None` if the
    /// repository has none yet.
    pub async fn latest_recommendation(
        &self,
        access_token: &str,
        repository: &str,
    ) -> Result<Option<Recommendation>> {
        let response = self
            .http
            .get(format!("{}/api/recommendations", self.base_url))
            .query(&[("repository", repository)])
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send recommendation request")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Recommendation request failed (HTTP {status}): {body}");
        }

        let body: Recommendation = response
            .json()
            .await
            .context("Failed to parse recommendation response")?;
        Ok(Some(body))
    }
}

/// Removes duplicate repository names while keeping first-seen order.
pub fn dedup_preserving_order(repos: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    repos.into_iter().filter(|r| seen.insert(r.clone())).collect()
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ReposResponse {
    repos: Vec<String>,
}
