//! Repository and recommendation command handlers.

use anyhow::Result;
use sage_core::api::{ApiClient, Recommendation};
use sage_core::config::Config;
use sage_core::highlight;

use super::require_session;

pub async fn run(config: &Config, repo: Option<&str>) -> Result<()> {
    let session = require_session(config).await?;
    let api = ApiClient::from_config(&config.api)?;

    match repo {
        None => {
            let repos = api.list_repos(&session.access_token).await?;
            if repos.is_empty() {
                println!("No repositories have reported builds yet.");
            } else {
                for repo in repos {
                    println!("{repo}");
                }
            }
        }
        Some(repo) => match api.latest_recommendation(&session.access_token, repo).await? {
            Some(rec) => print_recommendation(&rec),
            None => println!("No recommendations for {repo} yet."),
        },
    }
    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    let language = highlight::language_for_file(&rec.file_name);
    println!("{} ({language})", rec.file_name);
    if let Some(created_at) = &rec.created_at {
        println!("{created_at}");
    }
    println!();
    println!("{}", rec.response_data);
    println!();
    println!("--- before ---");
    println!("{}", rec.old_code);
    println!();
    println!("--- after ---");
    println!("{}", rec.new_code);
}
