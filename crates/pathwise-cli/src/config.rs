//! Configuration file management for pathwise.
//!
//! Provides a TOML-based config file at `~/.config/pathwise/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use pathwise_core::StaticIdentity;
use pathwise_core::generation::GenerationConfig;
use pathwise_core::generation::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use pathwise_db::config::DbConfig;

pub const API_KEY_ENV: &str = "PATHWISE_API_KEY";
pub const MODEL_ENV: &str = "PATHWISE_MODEL";
pub const BASE_URL_ENV: &str = "PATHWISE_API_BASE_URL";
pub const USER_ID_ENV: &str = "PATHWISE_USER_ID";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub identity: IdentitySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DbConfig::DEFAULT_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IdentitySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the pathwise config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/pathwise` or `~/.config/pathwise`,
/// including on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("pathwise");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pathwise")
}

/// Return the path to the pathwise config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// The file holds the API key, so it is owner-only (0600) on Unix.
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

/// Show the first and last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. `None` falls through to env and file.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides<'a> {
    pub database_url: Option<&'a str>,
    pub user_id: Option<&'a str>,
    pub model: Option<&'a str>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct PathwiseConfig {
    pub db_config: DbConfig,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub user_id: Option<String>,
}

impl PathwiseConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `--database-url` > `PATHWISE_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - API key: `PATHWISE_API_KEY` > `generation.api_key` > unset
    /// - Model: `--model` > `PATHWISE_MODEL` > `generation.model` > `gemini-1.5-flash`
    /// - User id: `--user` > `PATHWISE_USER_ID` > `identity.user_id` > unset
    pub fn resolve(overrides: CliOverrides<'_>) -> Result<Self> {
        Ok(Self::resolve_with_file(overrides, load_config().ok()))
    }

    fn resolve_with_file(overrides: CliOverrides<'_>, file: Option<ConfigFile>) -> Self {
        let file = file.unwrap_or_default();

        let db_url = pick(
            overrides.database_url,
            DbConfig::ENV_VAR,
            Some(file.database.url),
        )
        .unwrap_or_else(|| DbConfig::DEFAULT_URL.to_string());

        let api_key = pick(None, API_KEY_ENV, file.generation.api_key);
        let model = pick(overrides.model, MODEL_ENV, file.generation.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = pick(None, BASE_URL_ENV, file.generation.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let user_id = pick(overrides.user_id, USER_ID_ENV, file.identity.user_id);

        Self {
            db_config: DbConfig::new(db_url),
            api_key,
            model,
            base_url,
            user_id,
        }
    }

    /// Client settings. Fails when no API key was configured anywhere.
    pub fn generation_config(&self) -> Result<GenerationConfig> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!(
                "API key not found; set {API_KEY_ENV} or run `pathwise init --api-key <KEY>`"
            );
        };
        Ok(GenerationConfig::new(api_key)
            .with_model(&self.model)
            .with_base_url(&self.base_url))
    }

    pub fn identity(&self) -> StaticIdentity {
        StaticIdentity::new(self.user_id.clone())
    }
}

/// First non-blank value of: CLI flag, env var, file.
fn pick(cli: Option<&str>, env_var: &str, file: Option<String>) -> Option<String> {
    let present = |v: &String| !v.trim().is_empty();
    cli.map(str::to_string)
        .filter(present)
        .or_else(|| std::env::var(env_var).ok().filter(present))
        .or_else(|| file.filter(present))
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
