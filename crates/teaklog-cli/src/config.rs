use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use teaklog_engine::EngineConfig;

pub const CONFIG_ENV: &str = "TEAKLOG_CONFIG";

/// Resolve the engine config file based on priority:
/// 1. Explicit `--config` path
/// 2. TEAKLOG_CONFIG environment variable
/// 3. `<config dir>/teaklog/config.toml`
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|dir| dir.join("teaklog").join("config.toml"))
}

/// Load engine rules. An explicitly named file must exist; implicit
/// locations fall back to defaults when absent.
pub fn load_engine_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit
        && !path.exists()
    {
        anyhow::bail!("Config file not found: {}", path.display());
    }

    match resolve_config_path(explicit) {
        Some(path) => EngineConfig::load_from(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
