mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the data directory.
pub const ENV_DATA_DIR: &str = "DATA_DIR";
/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the listen host.
pub const ENV_HOST: &str = "LIJI_HOST";
/// Environment variable selecting the storage backend.
pub const ENV_BACKEND: &str = "LIJI_BACKEND";
/// Environment variable overriding the static asset directory.
pub const ENV_STATIC_DIR: &str = "LIJI_STATIC_DIR";

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
        "./liji.toml",
        "~/.config/liji/config.toml",
        "/etc/liji/config.toml",
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

/// Apply environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary variable source. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(dir) = var(ENV_DATA_DIR) {
        config.storage.data_dir = expand_path(&dir);
    }
    if let Some(port) = var(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} value: {:?}", ENV_PORT, port))?;
    }
    if let Some(host) = var(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(backend) = var(ENV_BACKEND) {
        config.storage.backend = backend.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(dir) = var(ENV_STATIC_DIR) {
        config.server.static_dir = Some(expand_path(&dir));
    }

    validate_config(config)
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.storage.data_dir.as_os_str().is_empty() {
        anyhow::bail!("Storage data_dir cannot be empty");
    }

    if config.server.max_body_bytes == 0 {
        anyhow::bail!("Server max_body_bytes cannot be 0");
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}
