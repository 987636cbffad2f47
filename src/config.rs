use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub api_base_url: Option<String>,
}

impl Config {
    /// Load from the user config directory, falling back to defaults when
    /// no file exists. The environment key wins over the file.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_from(&config_path)?;
        Ok(config.with_env_key(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    fn with_env_key(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.gemini_api_key = Some(key);
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("codinguni").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            gemini_api_key: Some("abc".to_string()),
            model: Some("gemini-1.5-pro".to_string()),
            api_base_url: None,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"model":"gemini-2.0-flash-lite"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model.as_deref(), Some("gemini-2.0-flash-lite"));
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("parsing"));
    }

    #[test]
    fn test_env_key_overrides_file() {
        let config = Config {
            gemini_api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let config = config.with_env_key(Some("from-env".to_string()));
        assert_eq!(config.gemini_api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_blank_env_key_ignored() {
        let config = Config {
            gemini_api_key: Some("from-file".to_string()),
            ..Config::default()
        };
        let config = config.with_env_key(Some("  ".to_string()));
        assert_eq!(config.gemini_api_key.as_deref(), Some("from-file"));
        assert!(config.has_api_key());
    }
}
