use crate::infrastructure::config::{AppConfig, ensure_default_configs, load_app_config};
use crate::infrastructure::error::InfraError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct BootstrapResult {
    pub workspace_root: PathBuf,
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub config: AppConfig,
}

/// Lays out `config/` and `logs/` under `workspace_root`, writes default
/// config on first run and loads it with environment overrides applied.
pub fn bootstrap_workspace(workspace_root: &Path) -> Result<BootstrapResult, InfraError> {
    bootstrap_workspace_with(workspace_root, |key| std::env::var(key).ok())
}

pub fn bootstrap_workspace_with<F>(
    workspace_root: &Path,
    lookup: F,
) -> Result<BootstrapResult, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let config_dir = workspace_root.join("config");
    let logs_dir = workspace_root.join("logs");

    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&logs_dir)?;

    ensure_default_configs(&config_dir)?;
    let config = load_app_config(&config_dir)?.with_overrides(lookup)?;

    Ok(BootstrapResult {
        workspace_root: workspace_root.to_path_buf(),
        config_dir,
        logs_dir,
        config,
    })
}
