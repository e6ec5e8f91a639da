use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::LoggingSettings;

/// 工作區內可覆寫日誌設定的 log4rs YAML 檔案。
pub const LOG4RS_CONFIG_PATH: &str = "config/log4rs.yaml";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

/// 初始化 log4rs。日誌只寫入檔案，終端畫面由 TUI 使用。
pub fn init(workspace_root: &Path, settings: &LoggingSettings) -> Result<()> {
    let yaml = workspace_root.join(LOG4RS_CONFIG_PATH);
    if yaml.exists() {
        log4rs::init_file(&yaml, Default::default())
            .with_context(|| format!("載入日誌設定失敗: {}", yaml.display()))?;
        return Ok(());
    }

    let config = file_config(settings)?;
    log4rs::init_config(config).context("初始化日誌失敗")?;
    Ok(())
}

fn file_config(settings: &LoggingSettings) -> Result<Config> {
    let level = LevelFilter::from_str(&settings.level)
        .with_context(|| format!("無效的日誌等級: {}", settings.level))?;
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(&settings.file)
        .with_context(|| format!("建立日誌檔案失敗: {}", settings.file.display()))?;
    Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(level))
        .context("建立日誌設定失敗")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LoggingSettings {
            file: dir.path().join("bureau.log"),
            level: String::from("chatty"),
        };
        assert!(file_config(&settings).is_err());
    }

    #[test]
    fn file_appender_creates_the_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LoggingSettings {
            file: dir.path().join("logs/bureau.log"),
            level: String::from("debug"),
        };
        file_config(&settings).unwrap();
        assert!(dir.path().join("logs/bureau.log").exists());
    }
}
