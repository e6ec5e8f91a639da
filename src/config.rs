use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::agent::payload::Metadata;

/// 設定檔相對於工作區根目錄的位置。
pub const CONFIG_PATH: &str = "config/bureau.toml";

/// 應用程式的頂層設定，從 `config/bureau.toml` 載入；每個欄位都有預設值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub webhook: WebhookSettings,
    pub store: StoreSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

/// 附加在每個封包 `metadata` 中的來源資訊。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    pub source: String,
    pub version: String,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        let metadata = Metadata::default();
        Self {
            source: metadata.source,
            version: metadata.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/office.toml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("logs/bureau.log"),
            level: String::from("info"),
        }
    }
}

impl Settings {
    /// 從工作區讀取設定；檔案不存在時使用預設值。
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let config_path = workspace_root.join(CONFIG_PATH);
        let settings = if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .with_context(|| format!("讀取設定失敗: {}", config_path.display()))?;
            toml::from_str::<Settings>(&raw)
                .with_context(|| format!("解析設定失敗: {}", config_path.display()))?
        } else {
            Settings::default()
        };
        Ok(settings.normalize(workspace_root))
    }

    /// 將相對路徑轉換為相對於工作區根目錄的絕對路徑。
    fn normalize(mut self, workspace_root: &Path) -> Self {
        if self.store.path.is_relative() {
            self.store.path = workspace_root.join(&self.store.path);
        }
        if self.logging.file.is_relative() {
            self.logging.file = workspace_root.join(&self.logging.file);
        }
        self
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            source: self.webhook.source.clone(),
            version: self.webhook.version.clone(),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.metadata(), Metadata::default());
        assert_eq!(settings.store.path, dir.path().join("data/office.toml"));
        assert_eq!(settings.logging.file, dir.path().join("logs/bureau.log"));
        assert_eq!(settings.tick_rate(), Duration::from_millis(250));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join(CONFIG_PATH),
            "[webhook]\nsource = \"front-desk\"\n\n[store]\npath = \"/srv/office.toml\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.webhook.source, "front-desk");
        assert_eq!(settings.webhook.version, "1.0.0");
        assert_eq!(settings.store.path, PathBuf::from("/srv/office.toml"));
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join(CONFIG_PATH), "[ui]\ntick_rate_ms = \"fast\"\n").unwrap();

        let err = Settings::load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("bureau.toml"));
    }
}
