//! Full-screen TUI implementation for Sage.

pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
pub use runtime::TuiRuntime;
use sage_core::config::Config;
use url::Url;

/// Runs the interactive TUI.
///
/// `redirect` carries a login redirect URL passed on the command line; it is
/// resolved during startup before any view is decided.
pub async fn run_app(config: Config, redirect: Option<Url>) -> Result<()> {
    // The TUI needs a terminal to render into
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Sage requires a terminal.\n\
             Use `sage status`, `sage key`, or `sage repos` for non-interactive use."
        );
    }

    // Print pre-TUI info to stderr (will be replaced by alternate screen)
    let mut err = stderr();
    writeln!(err, "Sage")?;
    if let Some(base_url) = config.identity.effective_base_url() {
        writeln!(err, "Identity service: {base_url}")?;
    }
    err.flush()?;

    let mut runtime = TuiRuntime::new(config, redirect)?;
    runtime.run()?;

    // Print goodbye after TUI exits (terminal restored)
    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
