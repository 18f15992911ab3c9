//! Configuration loading.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables (after a
//!    best-effort `.env` load)
//! 2. If incomplete, falls back to loading from file
//! 3. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `MOMENTUM_API_BASE_URL`: Backend base URL (required)
//! - `MOMENTUM_API_TIMEOUT_SECONDS`: Per-request timeout in seconds
//! - `MOMENTUM_API_MAX_ATTEMPTS`: Attempts per request (try + retries)
//! - `MOMENTUM_STREAM_PATH`: Path of the realtime stream endpoint
//! - `MOMENTUM_MAX_CONNECT_ATTEMPTS`: Stream connection attempts per cycle
//! - `MOMENTUM_RECONCILE_DELAY_MS`: Delay before the authoritative refetch
//! - `MOMENTUM_PUSH_ENABLED`: Whether push handling is enabled (true/false)

use std::path::{Path, PathBuf};
use std::time::Duration;

use momentum_core::realtime::backoff::ReconnectPolicy;
use momentum_core::RouterConfig;
use momentum_domain::{MomentumError, Result};
use serde::Deserialize;

use crate::api::MomentsApiConfig;
use crate::realtime::StreamConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MomentumConfig {
    pub api: ApiSection,
    #[serde(default)]
    pub realtime: RealtimeSection,
    #[serde(default)]
    pub push: PushSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeSection {
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    #[serde(default = "default_connect_attempts")]
    pub max_connect_attempts: u32,
    #[serde(default = "default_reconcile_delay_ms")]
    pub reconcile_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_timeout_seconds() -> u64 {
    30
}
fn default_max_attempts() -> usize {
    3
}
fn default_stream_path() -> String {
    "/users/moment-requests/stream".to_string()
}
fn default_connect_attempts() -> u32 {
    5
}
fn default_reconcile_delay_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for RealtimeSection {
    fn default() -> Self {
        Self {
            stream_path: default_stream_path(),
            max_connect_attempts: default_connect_attempts(),
            reconcile_delay_ms: default_reconcile_delay_ms(),
        }
    }
}

impl Default for PushSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MomentumConfig {
    /// API adapter configuration derived from this config.
    pub fn moments_api(&self) -> MomentsApiConfig {
        MomentsApiConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_seconds),
            max_attempts: self.api.max_attempts,
        }
    }

    /// Streaming transport configuration derived from this config.
    pub fn stream(&self) -> StreamConfig {
        StreamConfig {
            base_url: self.api.base_url.clone(),
            stream_path: self.realtime.stream_path.clone(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Router tunables derived from this config.
    pub fn router(&self) -> RouterConfig {
        RouterConfig {
            max_connect_attempts: self.realtime.max_connect_attempts,
            reconnect: ReconnectPolicy::default(),
            reconcile_delay: Duration::from_millis(self.realtime.reconcile_delay_ms),
        }
    }
}

/// Load configuration with automatic fallback strategy.
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `MomentumError::Config` if configuration cannot be loaded
/// from either source.
pub fn load() -> Result<MomentumConfig> {
    // Best effort; a missing .env file is normal.
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables.
///
/// `MOMENTUM_API_BASE_URL` must be present; everything else defaults.
pub fn load_from_env() -> Result<MomentumConfig> {
    let base_url = env_var("MOMENTUM_API_BASE_URL")?;
    let timeout_seconds =
        env_parse("MOMENTUM_API_TIMEOUT_SECONDS", default_timeout_seconds())?;
    let max_attempts = env_parse("MOMENTUM_API_MAX_ATTEMPTS", default_max_attempts())?;

    let stream_path =
        std::env::var("MOMENTUM_STREAM_PATH").unwrap_or_else(|_| default_stream_path());
    let max_connect_attempts =
        env_parse("MOMENTUM_MAX_CONNECT_ATTEMPTS", default_connect_attempts())?;
    let reconcile_delay_ms =
        env_parse("MOMENTUM_RECONCILE_DELAY_MS", default_reconcile_delay_ms())?;

    let push_enabled = env_bool("MOMENTUM_PUSH_ENABLED", true);

    Ok(MomentumConfig {
        api: ApiSection { base_url, timeout_seconds, max_attempts },
        realtime: RealtimeSection { stream_path, max_connect_attempts, reconcile_delay_ms },
        push: PushSection { enabled: push_enabled },
    })
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes standard locations. Supports both JSON
/// and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<MomentumConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MomentumError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MomentumError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MomentumError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<MomentumConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MomentumError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MomentumError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(MomentumError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe standard locations for a config file, nearest first.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("momentum.json"),
            cwd.join("momentum.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("momentum.json"),
                exe_dir.join("momentum.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        MomentumError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| MomentumError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
/// (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MOMENTUM_TEST_BOOL", "yes");
        assert!(env_bool("MOMENTUM_TEST_BOOL", false));

        std::env::set_var("MOMENTUM_TEST_BOOL", "off");
        assert!(!env_bool("MOMENTUM_TEST_BOOL", true));

        std::env::remove_var("MOMENTUM_TEST_BOOL");
        assert!(env_bool("MOMENTUM_TEST_BOOL", true));
        assert!(!env_bool("MOMENTUM_TEST_BOOL", false));
    }

    #[test]
    fn load_from_env_with_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MOMENTUM_API_BASE_URL", "https://api.example.com");
        std::env::set_var("MOMENTUM_API_TIMEOUT_SECONDS", "15");
        std::env::set_var("MOMENTUM_MAX_CONNECT_ATTEMPTS", "7");
        std::env::set_var("MOMENTUM_RECONCILE_DELAY_MS", "250");
        std::env::set_var("MOMENTUM_PUSH_ENABLED", "false");

        let config = load_from_env().expect("config from env");
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_seconds, 15);
        assert_eq!(config.realtime.max_connect_attempts, 7);
        assert_eq!(config.router().reconcile_delay, Duration::from_millis(250));
        assert!(!config.push.enabled);

        std::env::remove_var("MOMENTUM_API_BASE_URL");
        std::env::remove_var("MOMENTUM_API_TIMEOUT_SECONDS");
        std::env::remove_var("MOMENTUM_MAX_CONNECT_ATTEMPTS");
        std::env::remove_var("MOMENTUM_RECONCILE_DELAY_MS");
        std::env::remove_var("MOMENTUM_PUSH_ENABLED");
    }

    #[test]
    fn load_from_env_requires_the_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        let saved = std::env::var("MOMENTUM_API_BASE_URL").ok();
        std::env::remove_var("MOMENTUM_API_BASE_URL");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, MomentumError::Config(_)));

        if let Some(val) = saved {
            std::env::set_var("MOMENTUM_API_BASE_URL", val);
        }
    }

    #[test]
    fn load_from_env_rejects_invalid_numbers() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("MOMENTUM_API_BASE_URL", "https://api.example.com");
        std::env::set_var("MOMENTUM_API_TIMEOUT_SECONDS", "not-a-number");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, MomentumError::Config(_)));

        std::env::remove_var("MOMENTUM_API_BASE_URL");
        std::env::remove_var("MOMENTUM_API_TIMEOUT_SECONDS");
    }

    #[test]
    fn load_from_toml_file_with_defaults() {
        let toml_content = r#"
[api]
base_url = "https://api.example.com"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config from toml");
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.realtime.max_connect_attempts, 5);
        assert_eq!(config.realtime.stream_path, "/users/moment-requests/stream");
        assert!(config.push.enabled);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_json_file() {
        let json_content = r#"{
            "api": { "base_url": "https://api.example.com", "timeout_seconds": 10 },
            "realtime": { "reconcile_delay_ms": 500 },
            "push": { "enabled": false }
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).expect("config from json");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.realtime.reconcile_delay_ms, 500);
        assert!(!config.push.enabled);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result.unwrap_err(), MomentumError::Config(_)));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let result = parse_config("whatever", &PathBuf::from("config.yaml"));
        assert!(matches!(result.unwrap_err(), MomentumError::Config(_)));
    }
}
