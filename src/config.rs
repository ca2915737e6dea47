//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chain::ChainTarget;

pub const ENV_BACKEND_URL_PREFIX: &str = "CHAINSTREAMER_BACKEND_URL_PREFIX";
pub const ENV_RTMP_URL_PREFIX: &str = "CHAINSTREAMER_RTMP_URL_PREFIX";
pub const ENV_RPC_URL: &str = "CHAINSTREAMER_RPC_URL";

pub const DEFAULT_PACKAGE_ID: &str = "0x631274a289104633260905535e8a26903fd44026fe313ea1c96e55ff83cef5fc";
pub const DEFAULT_STREAMER_OBJECT_ID: &str = "0xfac88744d3c6b359d21fad3aa20f0aa81cca9fdaee25b10d2ffac62a989f8785";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_backend_url_prefix")]
    pub backend_url_prefix: String,
    #[serde(default = "default_rtmp_url_prefix")]
    pub rtmp_url_prefix: String,
    #[serde(default = "default_player_page_url")]
    pub player_page_url: String,
    // Chain
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_package_id")]
    pub package_id: String,
    #[serde(default = "default_streamer_object_id")]
    pub streamer_object_id: String,
    #[serde(default)]
    pub streamer_initial_shared_version: Option<u64>,
    // Refresh
    #[serde(default = "default_fetch_throttle_ms")]
    pub fetch_throttle_ms: u64,
    #[serde(default)]
    pub auto_refresh_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    // UI
    #[serde(default)]
    pub external_player: String,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default)]
    pub last_account: String,
}

fn default_backend_url_prefix() -> String { "http://127.0.0.1:8000".to_string() }
fn default_rtmp_url_prefix() -> String { "rtmp://127.0.0.1:1935/".to_string() }
fn default_player_page_url() -> String { "http://127.0.0.1:5173/hls/index.html".to_string() }
fn default_rpc_url() -> String { "https://fullnode.testnet.sui.io:443".to_string() }
fn default_package_id() -> String { DEFAULT_PACKAGE_ID.to_string() }
fn default_streamer_object_id() -> String { DEFAULT_STREAMER_OBJECT_ID.to_string() }
fn default_fetch_throttle_ms() -> u64 { 3000 }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_prefix: default_backend_url_prefix(),
            rtmp_url_prefix: default_rtmp_url_prefix(),
            player_page_url: default_player_page_url(),
            rpc_url: default_rpc_url(),
            package_id: default_package_id(),
            streamer_object_id: default_streamer_object_id(),
            streamer_initial_shared_version: None,
            fetch_throttle_ms: default_fetch_throttle_ms(),
            auto_refresh_secs: 0,
            request_timeout_secs: default_request_timeout_secs(),
            external_player: String::new(),
            dark_mode: true,
            last_account: String::new(),
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("chainstreamer_hub");
        fs::create_dir_all(&path).ok();
        path.push("config.json");
        path
    }

    /// Saved config (or defaults) with environment overrides applied
    pub fn load() -> Self {
        Self::load_from(&Self::config_path(), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self = fs::read_to_string(path)
            .ok()
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();

        config.apply_overrides(lookup);
        config
    }

    pub fn save(&self) {
        let path = Self::config_path();
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    log::warn!("Failed to save config to {}: {}", path.display(), e);
                }
            }
            Err(e) => log::warn!("Failed to serialize config: {}", e),
        }
    }

    /// Apply non-empty values from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_BACKEND_URL_PREFIX) {
            self.backend_url_prefix = v;
        }
        if let Some(v) = non_empty(ENV_RTMP_URL_PREFIX) {
            self.rtmp_url_prefix = v;
        }
        if let Some(v) = non_empty(ENV_RPC_URL) {
            self.rpc_url = v;
        }
    }

    pub fn chain_target(&self) -> ChainTarget {
        ChainTarget {
            package_id: self.package_id.clone(),
            streamer_object_id: self.streamer_object_id.clone(),
            initial_shared_version: self.streamer_initial_shared_version,
        }
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.fetch_throttle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"dark_mode": false}"#).unwrap();
        assert!(!config.dark_mode);
        assert_eq!(config.backend_url_prefix, "http://127.0.0.1:8000");
        assert_eq!(config.fetch_throttle_ms, 3000);
        assert_eq!(config.package_id, DEFAULT_PACKAGE_ID);
        assert_eq!(config.streamer_initial_shared_version, None);
        assert_eq!(config.auto_refresh_interval(), None);
    }

    fn temp_config(name: &str, content: Option<&str>) -> PathBuf {
        let path = std::env::temp_dir().join(format!("chainstreamer_hub_{}_{}.json", name, std::process::id()));
        match content {
            Some(content) => fs::write(&path, content).unwrap(),
            None => {
                let _ = fs::remove_file(&path);
            }
        }
        path
    }

    #[test]
    fn test_load_from_saved_file_applies_overrides() {
        let path = temp_config("saved", Some(r#"{"fetch_throttle_ms": 1500, "last_account": "0x1"}"#));
        let config = AppConfig::load_from(&path, |key| {
            (key == ENV_RPC_URL).then(|| "https://rpc.example".to_string())
        });
        let _ = fs::remove_file(&path);

        assert_eq!(config.fetch_throttle_ms, 1500);
        assert_eq!(config.last_account, "0x1");
        assert_eq!(config.rpc_url, "https://rpc.example");
        assert_eq!(config.backend_url_prefix, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_load_from_missing_or_corrupt_file_uses_defaults() {
        let missing = temp_config("missing", None);
        assert_eq!(AppConfig::load_from(&missing, |_| None), AppConfig::default());

        let corrupt = temp_config("corrupt", Some("{ not json"));
        let config = AppConfig::load_from(&corrupt, |_| None);
        let _ = fs::remove_file(&corrupt);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_round_trip_keeps_settings() {
        let mut config = AppConfig::default();
        config.streamer_initial_shared_version = Some(206208636);
        config.last_account = "0xabc".to_string();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND_URL_PREFIX, "https://api.example.com"),
            (ENV_RTMP_URL_PREFIX, ""),
            (ENV_RPC_URL, "https://fullnode.mainnet.sui.io:443"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend_url_prefix, "https://api.example.com");
        assert_eq!(config.rtmp_url_prefix, "rtmp://127.0.0.1:1935/");
        assert_eq!(config.rpc_url, "https://fullnode.mainnet.sui.io:443");
    }

    #[test]
    fn test_durations() {
        let mut config = AppConfig::default();
        assert_eq!(config.throttle_window(), Duration::from_millis(3000));
        config.request_timeout_secs = 0;
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        config.auto_refresh_secs = 15;
        assert_eq!(config.auto_refresh_interval(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_chain_target_from_config() {
        let mut config = AppConfig::default();
        config.streamer_initial_shared_version = Some(7);
        let target = config.chain_target();
        assert_eq!(target.streamer_object_id, DEFAULT_STREAMER_OBJECT_ID);
        assert_eq!(target.initial_shared_version, Some(7));
    }
}
