//! Workflow API key command handler.

use anyhow::Result;
use sage_core::api::ApiClient;
use sage_core::config::Config;
use sage_core::snippet;

use super::require_session;

pub async fn run(config: &Config, generate: bool) -> Result<()> {
    let session = require_session(config).await?;
    let api = ApiClient::from_config(&config.api)?;

    let key = if generate {
        api.generate_api_key(&session.access_token).await?
    } else {
        match api.fetch_api_key(&session.access_token).await? {
            Some(key) => key,
            None => {
                // First use: provision a key right away.
                eprintln!("No API key yet; generating one.");
                api.generate_api_key(&session.access_token).await?
            }
        }
    };

    println!("{key}");
    println!();
    println!("{}", snippet::WORKFLOW_NOTE);
    println!();
    println!("{}", snippet::workflow_snippet(&key));
    Ok(())
}
