/// 未使用键检测模块
///
/// 对每个键先做数字后缀约简，再在全部源文件中按子串搜索约简后的形式。
/// 只以子串包含为判断依据：约简后的键与无关文本相同时会产生误判。
///
/// - **reduce**: 键约简规则
/// - **removal**: 删除确认表
pub mod reduce;
pub mod removal;

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use rayon::prelude::*;
use serde::Serialize;

use crate::io::{DefaultSourceFileReader, SourceFileReader};
use crate::manager::LangManager;
use crate::sources::{find_source_files, SourceFilter};
use crate::utils::LangError;

pub use reduce::reduce_key;
pub use removal::RemovalSelection;

/// 已加载到内存的源文件
#[derive(Debug, Clone)]
struct IndexedSource {
    path: PathBuf,
    content: String,
}

/// 源文件内容索引，供键用法搜索
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    files: Vec<IndexedSource>,
}

impl UsageIndex {
    /// 读取根目录下所有源文件
    pub fn build(root: &Path, filter: &SourceFilter, encoding: &'static Encoding) -> Result<Self, LangError> {
        Self::build_with_reader(root, filter, encoding, &DefaultSourceFileReader)
    }

    /// 使用自定义 Reader 读取源文件
    ///
    /// 读取失败的文件记录日志后跳过，其中的用法视为不存在。
    pub fn build_with_reader(
        root: &Path,
        filter: &SourceFilter,
        encoding: &'static Encoding,
        reader: &dyn SourceFileReader,
    ) -> Result<Self, LangError> {
        let paths = find_source_files(root, filter)?;

        let files: Vec<IndexedSource> = paths
            .par_iter()
            .filter_map(|path| match reader.read(path) {
                Ok(data) => {
                    // 只做子串搜索，解码错误按替换字符处理
                    let (content, _) = encoding.decode_without_bom_handling(&data);
                    Some(IndexedSource {
                        path: path.clone(),
                        content: content.into_owned(),
                    })
                }
                Err(e) => {
                    tracing::warn!("Failed to read source file {:?}: {}", path, e);
                    None
                }
            })
            .collect();

        tracing::debug!(root = %root.display(), files = files.len(), "Built usage index");

        Ok(UsageIndex { files })
    }

    /// 从内存内容构建索引
    pub fn from_sources<I, P, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        UsageIndex {
            files: sources
                .into_iter()
                .map(|(path, content)| IndexedSource {
                    path: path.into(),
                    content: content.into(),
                })
                .collect(),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// 是否有任一文件的某一行包含该片段
    pub fn is_used(&self, fragment: &str) -> bool {
        self.files
            .iter()
            .any(|file| file.content.lines().any(|line| line.contains(fragment)))
    }

    /// 包含该片段的文件
    pub fn files_using(&self, fragment: &str) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|file| file.content.lines().any(|line| line.contains(fragment)))
            .map(|file| file.path.as_path())
            .collect()
    }
}

/// 单个键的检测结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyUsage {
    pub key: String,
    /// 实际搜索的约简形式
    pub reduced: String,
    pub used: bool,
}

/// 未使用键检测报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnusedKeyReport {
    /// 所有被检查的键（按键排序）
    pub checked: Vec<KeyUsage>,
}

impl UnusedKeyReport {
    pub fn unused(&self) -> impl Iterator<Item = &KeyUsage> {
        self.checked.iter().filter(|usage| !usage.used)
    }

    pub fn unused_keys(&self) -> Vec<String> {
        self.unused().map(|usage| usage.key.clone()).collect()
    }

    pub fn unused_count(&self) -> usize {
        self.unused().count()
    }
}

/// 检查语言管理器中的全部键是否在源码中被使用
///
/// 检查所有键，不受搜索视图影响。
pub fn find_unused_keys(manager: &LangManager, index: &UsageIndex) -> UnusedKeyReport {
    let keys: Vec<&str> = manager.all_keys().collect();

    let checked = keys
        .par_iter()
        .map(|key| {
            let reduced = reduce_key(key);
            let used = index.is_used(reduced);
            if used {
                tracing::debug!("key {}({}) used", key, reduced);
            } else {
                tracing::debug!("key {}({}) NOT used", key, reduced);
            }
            KeyUsage {
                key: key.to_string(),
                reduced: reduced.to_string(),
                used,
            }
        })
        .collect();

    UnusedKeyReport { checked }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_manager(keys: &[&str]) -> LangManager {
        let mut manager = LangManager::new();
        manager.add_language("en_EN", "comment");
        for key in keys {
            manager.set_key_value(key, "en_EN", "value").unwrap();
        }
        manager
    }

    #[test]
    fn test_find_unused_keys() {
        let index = UsageIndex::from_sources([
            ("Main.java", "setTitle(TC.get(\"Window.Title\"));\n"),
            ("Steps.java", "for (int i = 0; i < 3; i++)\n  TC.get(\"Operation.Step\" + i);\n"),
        ]);
        let manager = create_manager(&["Window.Title", "Operation.Step1", "Operation.Step12", "Old.Label", "Old.Label2"]);

        let report = find_unused_keys(&manager, &index);

        assert_eq!(report.checked.len(), 5);
        assert_eq!(report.unused_keys(), vec!["Old.Label", "Old.Label2"]);
        let step = report.checked.iter().find(|u| u.key == "Operation.Step12").unwrap();
        assert_eq!(step.reduced, "Operation.Step");
        assert!(step.used);
    }

    #[test]
    fn test_search_view_does_not_limit_detection() {
        let index = UsageIndex::from_sources([("A.java", "TC.get(\"Used\")")]);
        let mut manager = create_manager(&["Used", "Unused"]);
        manager.search("no-such-text");
        assert_eq!(manager.key_count(), 0);

        let report = find_unused_keys(&manager, &index);
        assert_eq!(report.checked.len(), 2);
        assert_eq!(report.unused_keys(), vec!["Unused"]);
    }

    #[test]
    fn test_build_index_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("editor")).unwrap();
        std::fs::write(root.join("editor/A.java"), "TC.get(\"Alpha\");").unwrap();
        std::fs::write(root.join("B.java"), b"// \xFF\nTC.get(\"Beta\");").unwrap();
        std::fs::write(root.join("C.txt"), "TC.get(\"Gamma\");").unwrap();

        let filter = SourceFilter::with_extensions(&["java"]);
        let index = UsageIndex::build(root, &filter, encoding_rs::UTF_8).unwrap();

        assert_eq!(index.file_count(), 2);
        assert!(index.is_used("Alpha"));
        assert!(index.is_used("Beta"));
        assert!(!index.is_used("Gamma"));
        assert_eq!(index.files_using("Alpha").len(), 1);
    }

    #[test]
    fn test_removal_selection() {
        let index = UsageIndex::from_sources([("A.java", "TC.get(\"Keep\")")]);
        let mut manager = create_manager(&["Keep", "DropA", "DropB"]);
        let report = find_unused_keys(&manager, &index);

        let mut selection = RemovalSelection::new(&report);
        assert_eq!(selection.keys(), &["DropA".to_string(), "DropB".to_string()]);
        assert!(selection.deselect("DropB"));
        assert!(!selection.deselect("Keep"));
        assert!(!selection.select("Missing"));

        let table = selection.to_string();
        assert!(table.contains("DropA  [x]"));
        assert!(table.contains("DropB  [ ]"));

        assert_eq!(selection.apply(&mut manager), 1);
        assert!(!manager.contains_key("DropA"));
        assert!(manager.contains_key("DropB"));
        assert_eq!(manager.value("DropA", "en_EN"), None);
    }
}
