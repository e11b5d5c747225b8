use crate::infrastructure::credential_store::{DEFAULT_CREDENTIAL_ACCOUNT, DEFAULT_CREDENTIAL_SERVICE};
use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const APP_JSON: &str = "app.json";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_API_URL: &[&str] = &["MISSION_CONTROL_API_URL"];
const ENV_TIMEOUT: &[&str] = &["MISSION_CONTROL_TIMEOUT_SECONDS"];
const ENV_LOG_LEVEL: &[&str] = &["MISSION_CONTROL_LOG_LEVEL"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub schema: u8,
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub log_level: String,
    pub credential_service: String,
    pub credential_account: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema: 1,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            credential_service: DEFAULT_CREDENTIAL_SERVICE.to_string(),
            credential_account: DEFAULT_CREDENTIAL_ACCOUNT.to_string(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn validate(&self) -> Result<(), InfraError> {
        if self.schema != 1 {
            return Err(InfraError::InvalidConfig(format!(
                "unsupported schema {}",
                self.schema
            )));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(InfraError::InvalidConfig(
                "apiBaseUrl must not be empty".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(InfraError::InvalidConfig(
                "requestTimeoutSeconds must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies environment overrides through `lookup` so tests can inject values.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, InfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup_value(&lookup, ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup_value(&lookup, ENV_TIMEOUT) {
            self.request_timeout_seconds = raw.parse::<u64>().map_err(|error| {
                InfraError::InvalidConfig(format!(
                    "{} must be a whole number of seconds: {error}",
                    ENV_TIMEOUT.join(", ")
                ))
            })?;
        }
        if let Some(level) = lookup_value(&lookup, ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        self.validate()?;
        Ok(self)
    }
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&AppConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    let path = config_dir.join(APP_JSON);
    let raw = read_config(&path)?;
    let config: AppConfig = serde_json::from_value(raw).map_err(|error| {
        InfraError::InvalidConfig(format!("invalid {}: {error}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

fn lookup_value<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(value) = lookup(key) {
            let normalized = value.trim();
            if !normalized.is_empty() {
                return Some(normalized.to_string());
            }
        }
    }
    None
}
