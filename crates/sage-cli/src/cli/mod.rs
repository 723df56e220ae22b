//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use sage_core::config::Config;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "sage")]
#[command(version = "0.2")]
#[command(about = "Terminal client for the Build Sage GitHub Actions debugging bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Resolve a login redirect URL before the first view is shown
    #[arg(long, value_name = "URL")]
    redirect_url: Option<Url>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with GitHub
    Login {
        /// Resolve this redirect URL instead of waiting for the browser
        #[arg(long, value_name = "URL")]
        redirect_url: Option<Url>,

        /// Print the login URL instead of opening a browser
        #[arg(long = "no-browser")]
        no_browser: bool,
    },

    /// Sign out and clear the cached session
    Logout,

    /// Show who is signed in
    Status,

    /// Show the workflow API key
    Key {
        /// Generate a fresh key, replacing any existing one
        #[arg(long)]
        generate: bool,
    },

    /// List repositories, or show the latest recommendation for one
    Repos {
        /// Repository to show the latest recommendation for
        #[arg(value_name = "REPO")]
        repo: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // default to the TUI
    let Some(command) = cli.command else {
        // The TUI owns the terminal, so logs go to a file; the guard flushes
        // the writer on exit.
        let _log_guard = sage_core::logging::init().context("init logging")?;
        return sage_tui::run_app(config, cli.redirect_url).await;
    };

    match command {
        Commands::Login {
            redirect_url,
            no_browser,
        } => commands::auth::login(&config, redirect_url, no_browser).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Status => commands::auth::status(),

        Commands::Key { generate } => commands::key::run(&config, generate).await,
        Commands::Repos { repo } => commands::repos::run(&config, repo.as_deref()).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
