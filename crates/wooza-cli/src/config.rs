//! Configuration file management for wooza.
//!
//! Provides a TOML config file at `~/.config/wooza/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wooza_core::Choices;
use wooza_core::choices::{DEFAULT_DDDS, DEFAULT_PLAN_TYPES};
use wooza_db::config::{DATABASE_URL_ENV, DbConfig};

pub const BIND_ENV: &str = "WOOZA_BIND";
pub const PORT_ENV: &str = "WOOZA_PORT";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<ChoicesSection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_owned()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Replacement enumerations. A missing key keeps the built-in list.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChoicesSection {
    pub plan_types: Option<Vec<String>>,
    pub ddds: Option<Vec<i32>>,
}

impl ChoicesSection {
    pub fn to_choices(&self) -> Choices {
        let plan_types: Vec<String> = match &self.plan_types {
            Some(types) => types.clone(),
            None => DEFAULT_PLAN_TYPES.iter().map(|t| (*t).to_owned()).collect(),
        };
        let ddds = self.ddds.clone().unwrap_or_else(|| DEFAULT_DDDS.to_vec());
        Choices::new(plan_types, ddds)
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the wooza config directory: `$XDG_CONFIG_HOME/wooza` or
/// `~/.config/wooza`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("wooza");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wooza")
}

/// Return the path to the wooza config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. `Ok(None)` when it does not exist.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// The file may embed database credentials, so it is made owner-only on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, each overriding everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides<'a> {
    pub database_url: Option<&'a str>,
    pub bind: Option<&'a str>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct WoozaConfig {
    pub db_config: DbConfig,
    pub bind: String,
    pub port: u16,
    pub choices: Choices,
}

impl WoozaConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    pub fn resolve(cli: CliOverrides<'_>) -> Result<Self> {
        let file_config = load_config()?;
        Self::resolve_with(cli, file_config.as_ref())
    }

    /// Resolution against an already-loaded config file.
    ///
    /// - DB URL: CLI > `WOOZA_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Bind: CLI > `WOOZA_BIND` > `server.bind` > `127.0.0.1`
    /// - Port: CLI > `WOOZA_PORT` > `server.port` > `8000`
    /// - Choices: `[choices]` section > built-in lists
    pub fn resolve_with(cli: CliOverrides<'_>, file_config: Option<&ConfigFile>) -> Result<Self> {
        let db_url = if let Some(url) = cli.database_url {
            url.to_owned()
        } else if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            url
        } else if let Some(cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_owned()
        };

        let bind = if let Some(bind) = cli.bind {
            bind.to_owned()
        } else if let Ok(bind) = std::env::var(BIND_ENV) {
            bind
        } else if let Some(cfg) = file_config {
            cfg.server.bind.clone()
        } else {
            DEFAULT_BIND.to_owned()
        };

        let port = if let Some(port) = cli.port {
            port
        } else if let Ok(raw) = std::env::var(PORT_ENV) {
            raw.parse::<u16>()
                .with_context(|| format!("{PORT_ENV} is not a valid port: {raw:?}"))?
        } else if let Some(cfg) = file_config {
            cfg.server.port
        } else {
            DEFAULT_PORT
        };

        let choices = file_config
            .and_then(|cfg| cfg.choices.as_ref())
            .map(ChoicesSection::to_choices)
            .unwrap_or_default();

        Ok(Self {
            db_config: DbConfig::new(db_url),
            bind,
            port,
            choices,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
