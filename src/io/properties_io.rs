/// 属性文件 IO 实现
///
/// 提供基于文件系统的默认属性文件读写实现

use std::path::Path;

use super::traits::{PropertiesReader, PropertiesWriter};
use crate::properties::PropertiesFile;
use crate::utils::LangError;

/// 默认的属性文件读取器
#[derive(Debug, Clone, Default)]
pub struct DefaultPropertiesReader;

impl PropertiesReader for DefaultPropertiesReader {
    fn read(&self, path: &Path) -> Result<PropertiesFile, LangError> {
        PropertiesFile::new(path.to_path_buf())
    }
}

/// 默认的属性文件写入器
#[derive(Debug, Clone, Default)]
pub struct DefaultPropertiesWriter;

impl PropertiesWriter for DefaultPropertiesWriter {
    fn write(&self, file: &PropertiesFile, path: &Path) -> Result<(), LangError> {
        // 确保父目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        file.write_to_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_properties_reader_nonexistent() {
        let reader = DefaultPropertiesReader;
        let result = reader.read(Path::new("nonexistent/es_ES.xml"));

        assert!(result.is_err());
    }

    #[test]
    fn test_writer_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("i18n").join("engine").join("en_EN.xml");

        let mut file = PropertiesFile::empty("en_EN", Some("comment".to_string()));
        file.set("Menu.Exit", "Exit");

        DefaultPropertiesWriter.write(&file, &path).unwrap();

        let loaded = DefaultPropertiesReader.read(&path).unwrap();
        assert_eq!(loaded.identifier, "en_EN");
        assert_eq!(loaded.get("Menu.Exit"), Some("Exit"));
    }
}
