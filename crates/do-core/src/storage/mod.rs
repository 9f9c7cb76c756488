mod config;
pub mod task_db;

pub use config::{Config, FocusConfig, MomentumConfig};
pub use task_db::TaskDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `DO_DATA_DIR` wins when set. Otherwise `~/.config/do[-dev]/`, with the
/// `-dev` suffix selected by `DO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DO_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("do-dev")
            } else {
                base_dir.join("do")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
