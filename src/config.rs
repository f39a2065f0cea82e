use std::ffi::OsString;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use crate::resolver::{DEFAULT_DOWNLOAD_URL, DEFAULT_RELEASE_LIST_URL};

/// Environment variable overriding the root directory.
pub const ROOT_ENV: &str = "GMAN_ROOT";

/// Settings read from `config.toml` in the user's config directory.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where SDKs are installed. Defaults to `~/.gman`.
    pub root_dir: Option<PathBuf>,
    /// JSON release catalog.
    pub release_list_url: String,
    /// Base URL that release files are downloaded from.
    pub download_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: None,
            release_list_url: DEFAULT_RELEASE_LIST_URL.to_string(),
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads a config file.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or deserialized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Loads a config file, falling back to defaults if it does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
        if path.as_ref().exists() {
            Config::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Loads `config.toml` from the global config directory.
    pub fn load_global() -> Result<Config> {
        Config::load_or_default(get_global_config_file()?)
    }

    /// Saves the config in pretty TOML format, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolves the root directory: explicit override, then `GMAN_ROOT`, then
    /// the config file, then `~/.gman`.
    pub fn root_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        self.root_dir_with_env(explicit, std::env::var_os(ROOT_ENV))
    }

    fn root_dir_with_env(&self, explicit: Option<PathBuf>, env: Option<OsString>) -> Result<PathBuf> {
        if let Some(root) = explicit {
            return Ok(root);
        }
        if let Some(root) = env.filter(|value| !value.is_empty()) {
            return Ok(PathBuf::from(root));
        }
        if let Some(root) = &self.root_dir {
            return Ok(root.clone());
        }
        default_root_dir()
    }
}

/// `~/.gman`
pub fn default_root_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().ok_or_else(|| anyhow!("Could not determine the home directory"))?;
    Ok(base.home_dir().join(".gman"))
}

pub fn get_global_config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "gman", "gman")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

pub fn get_global_config_file() -> Result<PathBuf> {
    Ok(get_global_config_dir()?.join("config.toml"))
}
