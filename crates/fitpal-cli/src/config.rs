//! Configuration file management for fitpal.
//!
//! Provides a TOML-based config file at `~/.config/fitpal/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use fitpal_core::calendar::DEFAULT_CALENDAR_NAME;
use fitpal_db::config::DbConfig;

pub const GEMINI_API_KEY_ENV: &str = "FITPAL_GEMINI_API_KEY";
pub const USER_ENV: &str = "FITPAL_USER";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub calendar: CalendarSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

/// Which backend writes new plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorProvider {
    #[default]
    Gemini,
    /// Built-in template, no network access.
    Template,
}

impl GeneratorProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Template => "template",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeneratorSection {
    #[serde(default)]
    pub provider: GeneratorProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CalendarSection {
    /// Name of the calendar events are written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fitpal config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fitpal` or `~/.config/fitpal`,
/// on macOS too.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fitpal");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitpal")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    read_config(&config_path())
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix; the file may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    write_config(&config_path(), config)
}

fn write_config(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorConfig {
    Gemini { api_key: String, model: Option<String> },
    Template,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FitpalConfig {
    pub db_config: DbConfig,
    pub generator: GeneratorConfig,
    pub calendar_name: String,
    /// Acting user, as a username or UUID.
    pub user: Option<String>,
}

impl FitpalConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `FITPAL_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Gemini key: `FITPAL_GEMINI_API_KEY` > `generator.api_key`; only needed
    ///   when `generator.provider` is `gemini` (the default), and only checked
    ///   by [`FitpalConfig::require_generator`]
    /// - User: `cli_user` > `FITPAL_USER`
    pub fn resolve(cli_db_url: Option<&str>, cli_user: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let section = file_config.as_ref().map(|c| &c.generator);
        let generator = match section.map(|g| g.provider).unwrap_or_default() {
            GeneratorProvider::Template => GeneratorConfig::Template,
            GeneratorProvider::Gemini => {
                let api_key = std::env::var(GEMINI_API_KEY_ENV)
                    .ok()
                    .or_else(|| section.and_then(|g| g.api_key.clone()))
                    .unwrap_or_default();
                GeneratorConfig::Gemini {
                    api_key,
                    model: section.and_then(|g| g.model.clone()),
                }
            }
        };

        let calendar_name = file_config
            .as_ref()
            .and_then(|c| c.calendar.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CALENDAR_NAME.to_string());

        let user = cli_user
            .map(str::to_string)
            .or_else(|| std::env::var(USER_ENV).ok())
            .filter(|u| !u.trim().is_empty());

        Ok(Self {
            db_config: DbConfig::new(db_url),
            generator,
            calendar_name,
            user,
        })
    }

    /// The generator settings, or an error if Gemini is selected without a key.
    pub fn require_generator(&self) -> Result<&GeneratorConfig> {
        if let GeneratorConfig::Gemini { api_key, .. } = &self.generator {
            if api_key.is_empty() {
                bail!(
                    "Gemini API key not found; set {GEMINI_API_KEY_ENV}, add [generator] api_key to {}, \
                     or set [generator] provider = \"template\"",
                    config_path().display()
                );
            }
        }
        Ok(&self.generator)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
