//! Application configuration for Dossier.
//!
//! User config lives at `~/.dossier/dossier.toml`.
//! CLI flags override config file values, which override defaults. The
//! service key is never stored in the file, only the name of the
//! environment variable carrying it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DossierError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "dossier.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".dossier";

// ---------------------------------------------------------------------------
// Config structs (matching dossier.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record/blob store connection settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Artifact retrieval settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Survey report rendering settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the storage service (REST + object endpoints).
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Name of the env var holding the service key (never the key itself).
    #[serde(default = "default_service_key_env")]
    pub service_key_env: String,

    /// Bucket holding process documents.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Table holding process records.
    #[serde(default = "default_record_table")]
    pub record_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            service_key_env: default_service_key_env(),
            bucket: default_bucket(),
            record_table: default_record_table(),
        }
    }
}

fn default_store_url() -> String {
    "http://localhost:54321".into()
}
fn default_service_key_env() -> String {
    "DOSSIER_SERVICE_KEY".into()
}
fn default_bucket() -> String {
    "processes".into()
}
fn default_record_table() -> String {
    "processes".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-attempt network timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Document theme name: "standard" or "compact".
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Address line centered in every page footer.
    #[serde(default = "default_footer_address")]
    pub footer_address: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            footer_address: default_footer_address(),
        }
    }
}

fn default_theme() -> String {
    "standard".into()
}
fn default_footer_address() -> String {
    "285 Valadares St., Vila Liviero, Sao Paulo - SP, 04185-020".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.dossier/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DossierError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.dossier/dossier.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DossierError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DossierError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DossierError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DossierError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DossierError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the storage service key from the configured env var.
pub fn validate_service_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.store.service_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(DossierError::config(format!(
            "storage service key not found. Set the {var_name} environment variable."
        ))),
    }
}
