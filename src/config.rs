//! Client configuration.
//!
//! `config.json` lives in the state directory next to the local storage file.
//! Environment variables override individual values so CI and demos can point
//! at a different backend without editing the file.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STATE_DIR_ENV: &str = "CONFREG_HOME";
pub const BACKEND_URL_ENV: &str = "CONFREG_SUPABASE_URL";
pub const ANON_KEY_ENV: &str = "CONFREG_SUPABASE_ANON_KEY";
pub const REDIRECT_URL_ENV: &str = "CONFREG_REDIRECT_URL";
pub const REQUIRE_VERIFICATION_ENV: &str = "CONFREG_REQUIRE_VERIFICATION";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_TABLE: &str = "registrations";
const DEFAULT_REDIRECT_URL: &str = "http://localhost:5173/registration";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub schema_version: u32,
    pub backend: BackendConfig,
    pub registrations_table: String,
    /// Page the magic link sends the user back to.
    pub redirect_url: String,
    /// Block leaving the personal step and submitting until the email is verified.
    #[serde(default = "default_require_verification")]
    pub require_email_verification: bool,
}

fn default_require_verification() -> bool {
    true
}

pub fn default_config() -> AppConfig {
    AppConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        backend: BackendConfig {
            url: DEFAULT_BACKEND_URL.to_string(),
            anon_key: String::new(),
        },
        registrations_table: DEFAULT_TABLE.to_string(),
        redirect_url: DEFAULT_REDIRECT_URL.to_string(),
        require_email_verification: default_require_verification(),
    }
}

pub fn config_path(state_dir: &Path) -> PathBuf {
    state_dir.join(CONFIG_FILE_NAME)
}

/// Load `config.json` (or defaults when absent), apply env overrides, validate.
pub fn load_config(state_dir: &Path) -> Result<AppConfig> {
    let path = config_path(state_dir);
    let mut config = match fs::read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .with_context(|| format!("parse config {}", path.display()))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            default_config()
        }
        Err(err) => return Err(err).with_context(|| format!("read config {}", path.display())),
    };
    apply_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Write `config` as pretty JSON; `confreg init` writes the defaults.
pub fn write_config(state_dir: &Path, config: &AppConfig) -> Result<()> {
    fs::create_dir_all(state_dir)
        .with_context(|| format!("create state dir {}", state_dir.display()))?;
    let path = config_path(state_dir);
    let text = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Apply environment overrides; `lookup` returns the variable's value if set.
pub fn apply_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(url) = lookup(BACKEND_URL_ENV) {
        config.backend.url = url;
    }
    if let Some(key) = lookup(ANON_KEY_ENV) {
        config.backend.anon_key = key;
    }
    if let Some(url) = lookup(REDIRECT_URL_ENV) {
        config.redirect_url = url;
    }
    if let Some(raw) = lookup(REQUIRE_VERIFICATION_ENV) {
        config.require_email_verification = match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                return Err(anyhow!(
                    "{REQUIRE_VERIFICATION_ENV} must be true or false (got {other:?})"
                ))
            }
        };
    }
    Ok(())
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    validate_http_url(&config.backend.url, "backend.url")?;
    validate_http_url(&config.redirect_url, "redirect_url")?;
    let table = config.registrations_table.trim();
    if table.is_empty()
        || !table
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return Err(anyhow!(
            "registrations_table must be a plain table name (got {:?})",
            config.registrations_table
        ));
    }
    Ok(())
}

fn validate_http_url(raw: &str, label: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("{label} is not a valid URL: {raw:?}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("{label} must use http or https (got {raw:?})"));
    }
    Ok(())
}

/// Resolve the state directory: explicit flag, then `CONFREG_HOME`, then the
/// platform data dir.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(home) = std::env::var_os(STATE_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let data_dir = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(data_dir.join("confreg"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
