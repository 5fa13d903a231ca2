mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./imagehost.toml",
        "~/.config/imagehost/config.toml",
        "/etc/imagehost/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let media_url = &config.storage.media_url;
    if media_url.len() < 3 || !media_url.starts_with('/') || !media_url.ends_with('/') {
        anyhow::bail!(
            "storage.media_url must start and end with '/' and name a path, got {:?}",
            media_url
        );
    }

    if config.storage.max_upload_bytes == 0 {
        anyhow::bail!("storage.max_upload_bytes cannot be 0");
    }

    if !config.storage.media_root.exists() {
        tracing::warn!(
            "Media root does not exist yet and will be created: {:?}",
            config.storage.media_root
        );
    }

    Ok(())
}
