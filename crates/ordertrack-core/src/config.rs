use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::FALLBACK_RESULT_TYPE;

/// Root configuration, loaded from `~/.config/ordertrack/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub lookup: LookupConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Origin of the tracker server, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    /// Category shown for results without a `type`.
    pub fallback_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file standing in for the browser's local storage.
    pub path: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 5_000,
            user_agent: format!("ordertrack/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            fallback_type: FALLBACK_RESULT_TYPE.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("ordertrack")
            .join("storage.json");
        Self {
            path: path.to_string_lossy().to_string(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// `$ORDERTRACK_CONFIG`, else `~/.config/ordertrack/config.toml`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("ORDERTRACK_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("ordertrack")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    // ─── Derived values ────────────────────────────────────

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.lookup.timeout_ms)
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.debounce(), Duration::from_millis(200));
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        assert!(cfg.lookup.user_agent.starts_with("ordertrack/"));
        assert!(cfg.storage_path().ends_with("storage.json"));
        assert_eq!(cfg.search.fallback_type, "personal");
    }

    #[test]
    fn test_fallback_type_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nfallback_type = \"company\"\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.search.fallback_type, "company");
        assert_eq!(cfg.search.debounce_ms, 200);
        assert!(cfg.to_toml().unwrap().contains("fallback_type = \"company\""));
    }

    #[test]
    fn test_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.search.debounce_ms = 350;
        cfg.lookup.base_url = "https://tracker.example".to_string();
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.search.debounce_ms, 350);
        assert_eq!(loaded.lookup.base_url, "https://tracker.example");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\ndebounce_ms = 50\n").unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.search.debounce_ms, 50);
        assert_eq!(cfg.search.fallback_type, "personal");
        assert_eq!(cfg.lookup.timeout_ms, 5_000);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let path = Path::new("/tmp/nonexistent_ordertrack_config.toml");
        let cfg = AppConfig::load_from(path).unwrap();
        assert_eq!(cfg.search.debounce_ms, 200);
    }
}
