use serde::{Deserialize, Serialize};
use ts_rs::TS;
use tokio::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use tracing::{debug, warn};

use super::error::{AppError, AppResult};
use super::types::AUTO_DETECT;

pub const ENV_PROVIDER_URL: &str = "TRADUZA_PROVIDER_URL";
pub const ENV_TIMEOUT_SECS: &str = "TRADUZA_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppSettings {
    pub provider: ProviderSettings,
    pub preferences: UserPreferences,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserPreferences {
    pub default_source_lang: String,
    pub default_target_lang: String,
    pub speech_rate: f32,
    pub copied_indicator_ms: u64,
    #[serde(default)]
    pub extra_languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StorageSettings {
    /// Overrides the history database location
    #[ts(type = "string | null")]
    pub history_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            provider: ProviderSettings {
                base_url: "https://lingva.ml".to_string(),
                timeout_secs: 15,
                user_agent: "traduza/translator".to_string(),
            },
            preferences: UserPreferences {
                default_source_lang: AUTO_DETECT.to_string(),
                default_target_lang: "pt".to_string(),
                speech_rate: 0.9,
                copied_indicator_ms: 2000,
                extra_languages: Vec::new(),
            },
            storage: StorageSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "antigravity", "traduza")
            .ok_or_else(|| AppError::Io("Failed to determine project directories".to_string()))
    }

    pub fn get_settings_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("settings.json"))
    }

    /// Where the history database lives unless overridden
    pub fn history_db_path(&self) -> AppResult<PathBuf> {
        match &self.storage.history_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("history.redb")),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    /// Load settings from `path`, writing defaults there if the file is absent
    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !fs::try_exists(path).await? {
            debug!(path = %path.display(), "settings file absent, writing defaults");
            let settings = Self::default();
            settings.save_to(path).await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Parse(format!("Failed to parse settings: {}", e)))
    }

    pub async fn save(&self) -> AppResult<()> {
        let path = Self::get_settings_path()?;
        self.save_to(&path).await
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// Apply `TRADUZA_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_PROVIDER_URL) {
            if !url.trim().is_empty() {
                self.provider.base_url = url.trim().to_string();
            }
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.provider.timeout_secs = secs,
                _ => warn!(value = %raw, "ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_load_writes_defaults_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = AppSettings::load_from(&path).await.unwrap();

        assert_eq!(settings, AppSettings::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = AppSettings::default();
        settings.preferences.default_target_lang = "es".to_string();
        settings.preferences.extra_languages = vec!["sv".to_string()];
        settings.save_to(&path).await.unwrap();

        let loaded = AppSettings::load_from(&path).await.unwrap();
        assert_eq!(loaded.preferences.default_target_lang, "es");
        assert_eq!(loaded.preferences.extra_languages, vec!["sv".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = AppSettings::load_from(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_PROVIDER_URL, "http://localhost:3000"),
            (ENV_TIMEOUT_SECS, "30"),
        ]);
        let settings = AppSettings::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.provider.base_url, "http://localhost:3000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_timeout_override_is_ignored() {
        let settings = AppSettings::default()
            .with_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()));
        assert_eq!(settings.provider.timeout_secs, 15);
    }

    #[test]
    fn test_history_path_override() {
        let mut settings = AppSettings::default();
        settings.storage.history_path = Some(PathBuf::from("/tmp/h.redb"));
        assert_eq!(settings.history_db_path().unwrap(), PathBuf::from("/tmp/h.redb"));
    }
}
