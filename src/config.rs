use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::auth::DEFAULT_ADMIN_PASSWORD;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".camille-archive";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "archive.sqlite";
/// Log file name; stdout belongs to the terminal UI.
const LOG_FILE_NAME: &str = "archive.log";

const DATA_DIR_ENV: &str = "CAMILLE_DATA_DIR";
const ADMIN_PASSWORD_ENV: &str = "CAMILLE_ADMIN_PASSWORD";

/// Settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub admin_password: String,
}

impl AppConfig {
    /// Resolve from the environment, defaulting the data directory to
    /// `~/.camille-archive`.
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        let admin_password = env::var(ADMIN_PASSWORD_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

        Ok(Self {
            data_dir,
            admin_password,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
