use thiserror::Error;
use std::path::{Path, PathBuf};

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum LangError {
    #[error("Invalid project folder: {0}")]
    InvalidProject(String),

    #[error("Invalid properties format: {0}")]
    InvalidPropertiesFormat(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Unknown part: {0}")]
    UnknownPart(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 创建文件备份
///
/// 备份文件与原文件同目录，扩展名追加时间戳，例如 `Foo.java.2024-01-01-12-00-00.bak`
pub fn create_backup(file_path: &Path) -> Result<PathBuf, LangError> {
    if !file_path.exists() {
        return Err(LangError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "原文件不存在"
        )));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let file_name = file_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LangError::InvalidProject(format!("无效的文件名: {:?}", file_path)))?;
    let backup_path = file_path.with_file_name(format!("{}.{}.bak", file_name, timestamp));

    std::fs::copy(file_path, &backup_path)?;

    Ok(backup_path)
}

/// 截断过长文本，用于命令行摘要输出
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_backup_copies_content() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("Main.java");
        std::fs::write(&source, "class Main {}").unwrap();

        let backup = create_backup(&source).unwrap();

        assert!(backup.exists());
        assert_ne!(backup, source);
        assert!(backup.to_string_lossy().ends_with(".bak"));
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "class Main {}");
    }

    #[test]
    fn test_create_backup_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = create_backup(&temp_dir.path().join("missing.java"));

        assert!(matches!(result, Err(LangError::IoError(_))));
    }

    #[test]
    fn test_truncate_for_display() {
        assert_eq!(truncate_for_display("short", 10), "short");
        assert_eq!(truncate_for_display("abcdef", 3), "abc...");
        assert_eq!(truncate_for_display("中文字符串", 2), "中文...");
    }
}
