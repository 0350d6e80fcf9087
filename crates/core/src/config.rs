//! Client configuration: defaults, an optional TOML file and `BUYMEAPIE_*`
//! environment variables, in increasing order of precedence.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use tracing::info;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://app.buymeapie.com";
/// Origin header sent by the web client.
pub const DEFAULT_ORIGIN: &str = "https://app.buymeapie.com";
/// User agent sent by the web client.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_6) \
AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.3 Safari/605.1.15";
/// Prefix of environment overrides, e.g. `BUYMEAPIE_PASSWORD`.
pub const ENV_PREFIX: &str = "BUYMEAPIE";
/// Location of the config file below the platform config directory.
pub const CONFIG_FILE: &str = "buymeapie/config.toml";

const TEMPLATE: &str = r#"# Buy Me a Pie client configuration.
# Every key can also be set through a BUYMEAPIE_<KEY> environment variable.

# base_url = "https://app.buymeapie.com"
# username = "me@example.com"
# password = "secret"
# autologin = true
"#;

/// Runtime settings for an account session.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Account login (e-mail).
    pub username: String,
    /// Account password.
    pub password: String,
    /// Authenticate as soon as the session is created.
    pub autologin: bool,
    /// Value of the `Origin` header.
    pub origin: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: String::new(),
            password: String::new(),
            autologin: true,
            origin: DEFAULT_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("autologin", &self.autologin)
            .field("origin", &self.origin)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl AppConfig {
    /// Load from the default config file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from `path` (when it exists) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        file_layer(path)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize())
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    /// Load from `path` only, ignoring the environment.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        file_layer(path)
            .build()
            .and_then(|config| config.try_deserialize())
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    /// Whether credentials have been provided.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

fn file_layer(path: &Path) -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from(path).required(false))
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Write a commented template to the default location if nothing is there yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path();
    ensure_config_at(&path)?;
    Ok(path)
}

/// Write a commented template to `path` if nothing is there yet.
pub fn ensure_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, TEMPLATE).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote configuration template to {}", path.display());
    Ok(())
}
