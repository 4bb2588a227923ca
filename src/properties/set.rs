use std::path::{Path, PathBuf};

use crate::io::{DefaultPropertiesReader, PropertiesReader};
use crate::utils::LangError;

use super::file::PropertiesFile;
use super::PROPERTIES_EXTENSION;

/// 加载失败的属性文件
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// 一个目录下的全部语言属性文件
#[derive(Debug, Clone)]
pub struct PropertiesSet {
    /// 属性文件所在目录
    pub directory: PathBuf,
    /// 成功加载的文件，按语言标识排序
    pub files: Vec<PropertiesFile>,
    /// 加载失败的文件（已记录日志，不中断加载）
    pub failures: Vec<LoadFailure>,
}

impl PropertiesSet {
    /// 加载指定目录下的所有 `*.xml` 属性文件
    pub fn load_from_directory(directory: &Path) -> Result<Self, LangError> {
        Self::load_from_directory_with_reader(directory, &DefaultPropertiesReader)
    }

    /// 使用自定义 Reader 加载指定目录下的所有属性文件
    ///
    /// 目录本身不可读时返回错误；单个文件读取或解析失败只记录日志并跳过，
    /// 因此部分加载后内存状态可能与磁盘不一致。
    pub fn load_from_directory_with_reader(
        directory: &Path,
        reader: &dyn PropertiesReader,
    ) -> Result<Self, LangError> {
        if !directory.is_dir() {
            return Err(LangError::InvalidProject(format!(
                "属性文件目录不存在: {:?}",
                directory
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == PROPERTIES_EXTENSION)
            })
            .collect();
        paths.sort();

        let mut files = Vec::new();
        let mut failures = Vec::new();

        for path in paths {
            match reader.read(&path) {
                Ok(file) => {
                    tracing::debug!(path = %path.display(), entries = file.count(), "Loaded properties file");
                    files.push(file);
                }
                Err(e) => {
                    tracing::warn!("Failed to load properties file {:?}: {}", path, e);
                    failures.push(LoadFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(PropertiesSet {
            directory: directory.to_path_buf(),
            files,
            failures,
        })
    }

    /// 按语言标识查找文件
    pub fn get_file(&self, identifier: &str) -> Option<&PropertiesFile> {
        self.files.iter().find(|file| file.identifier == identifier)
    }

    /// 所有语言标识
    pub fn identifiers(&self) -> Vec<&str> {
        self.files.iter().map(|file| file.identifier.as_str()).collect()
    }

    /// 条目总数（各语言之和）
    pub fn total_count(&self) -> usize {
        self.files.iter().map(PropertiesFile::count).sum()
    }
}
