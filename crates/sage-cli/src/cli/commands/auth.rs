//! Sign-in, sign-out, and status command handlers.

use anyhow::{Context, Result};
use sage_core::auth::session::mask_token;
use sage_core::auth::{Resolution, SessionStore, cache, callback};
use sage_core::config::Config;
use sage_core::identity::IdentityClient;
use url::Url;

/// Signs in with GitHub.
///
/// Without `--redirect-url` this opens the browser on the identity service
/// authorize URL and waits for the loopback redirect. With it, the given
/// URL is resolved directly (for environments where the listener cannot
/// receive the redirect).
pub async fn login(config: &Config, redirect_url: Option<Url>, no_browser: bool) -> Result<()> {
    let identity = IdentityClient::from_config(&config.identity)?;
    let store = SessionStore::new(identity.clone());

    let redirect = match redirect_url {
        Some(url) => Some(url),
        None => {
            let oauth = &config.oauth;
            let url =
                identity.authorize_url(&oauth.provider, &oauth.scopes, &oauth.redirect_uri());

            if no_browser {
                println!("Open this URL in your browser to sign in:\n\n  {url}\n");
            } else {
                println!("Opening your browser to sign in...");
                if open::that(&url).is_err() {
                    println!("Could not open a browser. Visit:\n\n  {url}\n");
                }
            }
            println!(
                "Waiting for the login redirect (up to {} seconds)...",
                callback::LOGIN_TIMEOUT.as_secs()
            );
            callback::wait_for_redirect(oauth.redirect_port, callback::LOGIN_TIMEOUT).await
        }
    };

    let Some(redirect) = redirect else {
        anyhow::bail!(
            "Timed out waiting for the browser redirect.\n\
             Try again, or pass --redirect-url with the URL from the browser address bar."
        );
    };

    let resolution = store.initialize(Some(&redirect)).await;
    store.shutdown();

    match resolution {
        Resolution::Resolved { session, .. } => {
            println!("Signed in as {}.", session.identity.display_name());
            Ok(())
        }
        Resolution::Failed { reason } => anyhow::bail!("Sign-in failed: {reason}"),
        Resolution::NotApplicable => anyhow::bail!("That URL has no access token in it."),
    }
}

/// Signs out.
///
/// Remote revocation is best-effort; the local session is always cleared.
pub async fn logout(config: &Config) -> Result<()> {
    let session = cache::load().context("load cached session")?;

    if let Some(session) = session
        && let Ok(identity) = IdentityClient::from_config(&config.identity)
        && identity.logout(&session.access_token).await.is_err()
    {
        eprintln!("The identity service could not be reached; cleared the local session only.");
    }

    cache::clear().context("clear cached session")?;
    println!("Signed out.");
    Ok(())
}

/// Shows who is signed in, from the local cache only. Never touches the
/// network, so it works offline.
pub fn status() -> Result<()> {
    match cache::load().context("load cached session")? {
        Some(session) => {
            println!("Signed in as {}.", session.identity.display_name());
            if let Some(email) = &session.identity.email {
                println!("Email: {email}");
            }
            println!("Access token: {}", mask_token(&session.access_token));
            if session.is_expired() {
                println!("The access token has expired; it will be refreshed on next use.");
            }
        }
        None => println!("Not signed in. Run `sage login` first."),
    }
    Ok(())
}
