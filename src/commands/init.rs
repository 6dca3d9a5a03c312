//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default configuration file and return its path
pub fn cmd_init(config_path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let mut config = Config::default();

    match config_path {
        Some(path) => {
            config.paths.base_dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            config.paths.config_file = path;
        }
        None => config.init_paths(None),
    }

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config.paths.config_file.display()
        )));
    }

    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    Ok(config.paths.config_file)
}
