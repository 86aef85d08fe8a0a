use crate::plugins::gifs::tenor::{TenorConfig, DEFAULT_CLIENT_KEY, DEFAULT_TENOR_URL};
use crate::plugins::progress::types::PersistLayout;
use crate::shared::paths::{ensure_dir, get_storage_dir, get_store_dir};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

const ENV_TENOR_API_KEY: &str = "TENOR_API_KEY";
const ENV_LISTEN: &str = "PROGRESS_LISTEN";
const ENV_DATA_DIR: &str = "PROGRESS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub listen: String,
    /// Only ever read from the file or the environment, never written back.
    #[serde(skip_serializing)]
    pub tenor_api_key: Option<String>,
    pub tenor_base_url: String,
    pub client_key: String,
    pub persist_layout: PersistLayout,
    pub data_dir: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            tenor_api_key: None,
            tenor_base_url: DEFAULT_TENOR_URL.to_string(),
            client_key: DEFAULT_CLIENT_KEY.to_string(),
            persist_layout: PersistLayout::default(),
            data_dir: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid listen address '{0}'")]
    InvalidListen(String),
}

impl AppSettings {
    /// Applies overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(ENV_TENOR_API_KEY) {
            self.tenor_api_key = Some(key);
        }
        if let Some(listen) = get(ENV_LISTEN) {
            self.listen = listen;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.listen
            .parse()
            .map_err(|_| SettingsError::InvalidListen(self.listen.clone()))
    }

    pub fn tenor_config(&self) -> TenorConfig {
        TenorConfig {
            base_url: self.tenor_base_url.clone(),
            api_key: self.tenor_api_key.clone(),
            client_key: self.client_key.clone(),
        }
    }

    /// Base data directory: `dataDir` when set, otherwise the platform storage dir.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_storage_dir)
    }

    /// Directory holding the persisted store keys.
    pub fn store_dir(&self) -> PathBuf {
        get_store_dir(&self.data_dir())
    }
}

fn get_settings_path() -> PathBuf {
    get_storage_dir().join("settings.json")
}

/// Loads `settings.json` and applies environment overrides. A missing or broken file
/// yields the defaults.
pub fn load_settings() -> AppSettings {
    let path = get_settings_path();

    let mut settings = if path.exists() {
        load_settings_from_file(&path).unwrap_or_else(|e| {
            tracing::warn!(
                target: "system",
                path = %path.display(),
                error = %e,
                "Ignoring unreadable settings file"
            );
            AppSettings::default()
        })
    } else {
        AppSettings::default()
    };

    settings.apply_overrides(|name| std::env::var(name).ok());
    settings
}

pub fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(settings: &AppSettings) -> Result<(), SettingsError> {
    save_settings_to_file(settings, &get_settings_path())
}

pub fn save_settings_to_file(settings: &AppSettings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, contents)?;
    Ok(())
}
