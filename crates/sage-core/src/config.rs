//! Configuration management for Sage.
//!
//! Loads configuration from ${SAGE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    // Parse the template as the base
    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    // Parse user's existing config
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    // Overlay user values onto template
    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                // Scalar value: override in target
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                // Nested table: recursively merge
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    // Target doesn't have this table, copy it
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                // Array of tables: replace entirely with user's version
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for Sage configuration and data directories.
    //!
    //! SAGE_HOME resolution order:
    //! 1. SAGE_HOME environment variable (if set)
    //! 2. ~/.config/sage (default)

    use std::path::PathBuf;

    /// Returns the Sage home directory.
    ///
    /// Checks SAGE_HOME env var first, falls back to ~/.config/sage
    pub fn sage_home() -> PathBuf {
        if let Ok(home) = std::env::var("SAGE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("sage"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        sage_home().join("config.toml")
    }

    /// Returns the path to the cached session credentials file.
    pub fn credentials_path() -> PathBuf {
        sage_home().join("credentials.json")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        sage_home().join("logs")
    }
}

/// Default value for serde when redirect_port is missing.
fn default_redirect_port() -> u16 {
    OauthConfig::DEFAULT_REDIRECT_PORT
}

/// Default value for serde when provider is missing.
fn default_provider() -> String {
    OauthConfig::DEFAULT_PROVIDER.to_string()
}

/// Default value for serde when scopes is missing.
fn default_scopes() -> String {
    OauthConfig::DEFAULT_SCOPES.to_string()
}

/// Identity service (Supabase auth) configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the identity service.
    pub base_url: Option<String>,
    /// Publishable anon key sent with every identity request.
    pub anon_key: Option<String>,
}

impl IdentityConfig {
    /// Returns the effective base URL if set and non-empty.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns the effective anon key if set and non-empty.
    pub fn effective_anon_key(&self) -> Option<&str> {
        self.anon_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Build Sage backend API.
    pub base_url: Option<String>,
}

impl ApiConfig {
    /// Returns the effective base URL if set and non-empty.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Browser login (OAuth redirect) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OauthConfig {
    /// Loopback port the browser login redirect lands on.
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
    /// OAuth provider requested at login.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Scopes requested at login.
    #[serde(default = "default_scopes")]
    pub scopes: String,
}

impl OauthConfig {
    const DEFAULT_REDIRECT_PORT: u16 = 8400;
    const DEFAULT_PROVIDER: &str = "github";
    const DEFAULT_SCOPES: &str = "read:user";

    /// Returns the loopback redirect URI the identity service sends the
    /// browser back to after login.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.redirect_port)
    }
}

impl Default for OauthConfig {
    fn default() -> Self {
        Self {
            redirect_port: Self::DEFAULT_REDIRECT_PORT,
            provider: Self::DEFAULT_PROVIDER.to_string(),
            scopes: Self::DEFAULT_SCOPES.to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity service configuration.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Backend API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Browser login configuration.
    #[serde(default)]
    pub oauth: OauthConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the identity fields to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_identity(base_url: &str, anon_key: &str) -> Result<()> {
        Self::save_identity_to(&paths::config_path(), base_url, anon_key)
    }

    /// Saves only the identity fields to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_identity_to(path: &Path, base_url: &str, anon_key: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        // Start from template, merge user values if file exists
        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        // Parse as editable document
        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        // Update identity fields
        doc["identity"]["base_url"] = value(base_url);
        doc["identity"]["anon_key"] = value(anon_key);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
