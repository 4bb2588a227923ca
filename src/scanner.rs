/// 源码扫描模块
///
/// 在源文件中查找 `"@@KEY$$ES$$EN$$"` 字面量，把键和两种语言的值登记到
/// 语言管理器，并把字面量改写为查找调用（默认 `TC.get("KEY")`）。
///
/// # 架构设计
///
/// - **pattern**: 字面量识别，返回所有匹配的字节范围
/// - **rewrite**: 先收集全部匹配范围，再拼接未改动的片段与替换文本
///
/// 文件读取和改写在 rayon 线程池中并行进行，登记到语言管理器在调用线程中按路径顺序进行。
pub mod pattern;
pub mod rewrite;

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use rayon::prelude::*;

use crate::datatypes::SourceText;
use crate::io::{DefaultSourceFileReader, DefaultSourceFileWriter, SourceFileReader, SourceFileWriter};
use crate::manager::LangManager;
use crate::sources::{find_source_files, SourceFilter};
use crate::utils::{create_backup, LangError};

pub use pattern::{find_literals, LiteralMatch};
pub use rewrite::{rewrite, ReplacementTemplate};

/// 扫描选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// 只报告，不写回文件
    pub dry_run: bool,
    /// 改写前创建带时间戳的备份
    pub backup: bool,
}

/// 扫描配置
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub filter: SourceFilter,
    pub template: ReplacementTemplate,
    pub encoding: &'static Encoding,
    /// 字面量两个值对应的语言
    pub marker_languages: [String; 2],
    /// 新建标记语言时注释的前缀
    pub default_comment: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            filter: SourceFilter::with_extensions(&["java"]),
            template: ReplacementTemplate::default(),
            encoding: encoding_rs::UTF_8,
            marker_languages: ["es_ES".to_string(), "en_EN".to_string()],
            default_comment: crate::manager::DEFAULT_COMMENT.to_string(),
        }
    }
}

/// 单个文件的扫描结果
#[derive(Debug, Clone)]
pub struct FileScan {
    pub path: PathBuf,
    pub matches: Vec<LiteralMatch>,
    /// 是否已写回文件
    pub rewritten: bool,
    /// 备份文件路径
    pub backup: Option<PathBuf>,
    /// 改写前后的长度（字节）
    pub original_len: usize,
    pub rewritten_len: usize,
}

/// 扫描失败的文件
#[derive(Debug, Clone)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// 扫描报告
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// 扫描的文件总数
    pub files_scanned: usize,
    /// 包含字面量的文件
    pub files: Vec<FileScan>,
    /// 读取/解码/写入失败的文件
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// 字面量总数
    pub fn literal_count(&self) -> usize {
        self.files.iter().map(|file| file.matches.len()).sum()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ScanReport) {
        self.files_scanned += other.files_scanned;
        self.files.extend(other.files);
        self.failures.extend(other.failures);
    }
}

impl std::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "扫描文件: {}", self.files_scanned)?;
        writeln!(f, "包含字面量的文件: {}", self.files.len())?;
        writeln!(f, "提取字面量: {}", self.literal_count())?;
        if !self.failures.is_empty() {
            writeln!(f, "失败: {}", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  {:?}: {}", failure.path, failure.reason)?;
            }
        }
        Ok(())
    }
}

/// 源码扫描器
pub struct SourceScanner<'a> {
    settings: &'a ScanSettings,
    reader: &'a dyn SourceFileReader,
    writer: &'a dyn SourceFileWriter,
}

impl<'a> SourceScanner<'a> {
    /// 使用文件系统 IO 创建扫描器
    pub fn new(settings: &'a ScanSettings) -> Self {
        Self::with_io(settings, &DefaultSourceFileReader, &DefaultSourceFileWriter)
    }

    /// 使用自定义 IO 创建扫描器
    pub fn with_io(
        settings: &'a ScanSettings,
        reader: &'a dyn SourceFileReader,
        writer: &'a dyn SourceFileWriter,
    ) -> Self {
        SourceScanner {
            settings,
            reader,
            writer,
        }
    }

    /// 扫描源码目录并登记所有字面量
    ///
    /// `source_root` 为 None 时不做任何事。单个文件失败只记录日志并写入报告。
    pub fn parse_code(
        &self,
        source_root: Option<&Path>,
        manager: &mut LangManager,
        options: &ScanOptions,
    ) -> Result<ScanReport, LangError> {
        let Some(root) = source_root else {
            return Ok(ScanReport::default());
        };

        let files = find_source_files(root, &self.settings.filter)?;
        tracing::debug!(root = %root.display(), files = files.len(), "Scanning source files");

        let results: Vec<Result<Option<FileScan>, ScanFailure>> = files
            .par_iter()
            .map(|path| self.scan_file(path, options))
            .collect();

        let mut report = ScanReport {
            files_scanned: files.len(),
            ..ScanReport::default()
        };

        for result in results {
            match result {
                Ok(Some(file_scan)) => {
                    self.register(manager, &file_scan)?;
                    report.files.push(file_scan);
                }
                Ok(None) => {}
                Err(failure) => report.failures.push(failure),
            }
        }

        Ok(report)
    }

    /// 扫描并改写单个文件
    ///
    /// 没有字面量的文件不会被写入。
    pub fn scan_file(&self, path: &Path, options: &ScanOptions) -> Result<Option<FileScan>, ScanFailure> {
        self.try_scan_file(path, options).map_err(|e| {
            tracing::warn!("Failed to scan source file {:?}: {}", path, e);
            ScanFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    fn try_scan_file(&self, path: &Path, options: &ScanOptions) -> Result<Option<FileScan>, LangError> {
        let data = self.reader.read(path)?;
        let source = SourceText::decode(&data, self.settings.encoding)?;

        let matches = find_literals(&source.content);
        if matches.is_empty() {
            return Ok(None);
        }

        let output = rewrite(&source.content, &matches, &self.settings.template);
        let encoded = SourceText::encode_str(&output, source.encoding)?;

        let mut file_scan = FileScan {
            path: path.to_path_buf(),
            rewritten: false,
            backup: None,
            original_len: source.content.len(),
            rewritten_len: output.len(),
            matches,
        };

        if options.dry_run {
            return Ok(Some(file_scan));
        }

        if options.backup {
            file_scan.backup = Some(create_backup(path)?);
        }

        self.writer.write(path, &encoded)?;
        file_scan.rewritten = true;

        tracing::info!(path = %path.display(), literals = file_scan.matches.len(), "Rewrote source file");

        Ok(Some(file_scan))
    }

    /// 将一个文件的字面量登记到语言管理器
    ///
    /// 缺少的标记语言会先被创建。解析出的键同时带有 PARSED 和 MODIFIED 标志。
    pub fn register(&self, manager: &mut LangManager, file_scan: &FileScan) -> Result<(), LangError> {
        for identifier in &self.settings.marker_languages {
            if manager.add_language(identifier, format!("{}{}", self.settings.default_comment, identifier)) {
                tracing::debug!(language = %identifier, "Created marker language");
            }
        }

        for literal in &file_scan.matches {
            manager.add_parsed_key(&literal.key);
            for (identifier, value) in self.settings.marker_languages.iter().zip(&literal.translations) {
                manager.set_key_value(&literal.key, identifier, value)?;
            }
            tracing::debug!(key = %literal.key, path = %file_scan.path.display(), "Registered parsed key");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_source(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_code_rewrites_and_registers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let main = write_source(
            root,
            "gui/Main.java",
            "setTitle(\"@@Window.Title$$Ventana$$Window$$\");\nok(\"@@Button.Ok$$Aceptar$$Accept$$\");\n",
        );
        let plain = write_source(root, "Plain.java", "class Plain {}\n");
        write_source(root, "notes.txt", "\"@@Ignored$$a$$b$$\"");

        let settings = ScanSettings::default();
        let mut manager = LangManager::new();
        let report = SourceScanner::new(&settings)
            .parse_code(Some(root), &mut manager, &ScanOptions::default())
            .unwrap();

        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.literal_count(), 2);
        assert!(report.failures.is_empty());

        assert_eq!(
            std::fs::read_to_string(&main).unwrap(),
            "setTitle(TC.get(\"Window.Title\"));\nok(TC.get(\"Button.Ok\"));\n"
        );
        assert_eq!(std::fs::read_to_string(&plain).unwrap(), "class Plain {}\n");

        assert_eq!(manager.lang_ids(), vec!["es_ES", "en_EN"]);
        assert_eq!(manager.value("Window.Title", "es_ES"), Some("Ventana"));
        assert_eq!(manager.value("Button.Ok", "en_EN"), Some("Accept"));
        assert!(manager.is_parsed_key("Button.Ok"));
        assert!(manager.is_modified_key("Button.Ok"));
        assert!(!manager.contains_key("Ignored"));
    }

    #[test]
    fn test_dry_run_leaves_files_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let content = "f(\"@@K$$es$$en$$\");\n";
        let path = write_source(temp_dir.path(), "A.java", content);

        let settings = ScanSettings::default();
        let mut manager = LangManager::new();
        let options = ScanOptions { dry_run: true, backup: false };
        let report = SourceScanner::new(&settings)
            .parse_code(Some(temp_dir.path()), &mut manager, &options)
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        assert!(!report.files[0].rewritten);
        assert_eq!(report.files[0].rewritten_len, "f(TC.get(\"K\"));\n".len());
        assert!(manager.contains_key("K"));
    }

    #[test]
    fn test_backup_created_before_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let content = "f(\"@@K$$es$$en$$\");\n";
        let path = write_source(temp_dir.path(), "A.java", content);

        let settings = ScanSettings::default();
        let mut manager = LangManager::new();
        let options = ScanOptions { dry_run: false, backup: true };
        let report = SourceScanner::new(&settings)
            .parse_code(Some(temp_dir.path()), &mut manager, &options)
            .unwrap();

        let backup = report.files[0].backup.clone().unwrap();
        assert_eq!(std::fs::read_to_string(backup).unwrap(), content);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "f(TC.get(\"K\"));\n");
    }

    #[test]
    fn test_undecodable_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Latin.java");
        std::fs::write(&path, b"f(\"@@K$$a\xF1o$$year$$\");\n").unwrap();

        let settings = ScanSettings::default();
        let mut manager = LangManager::new();
        let report = SourceScanner::new(&settings)
            .parse_code(Some(temp_dir.path()), &mut manager, &ScanOptions::default())
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(!manager.contains_key("K"));

        let latin = ScanSettings {
            encoding: encoding_rs::WINDOWS_1252,
            ..ScanSettings::default()
        };
        let report = SourceScanner::new(&latin)
            .parse_code(Some(temp_dir.path()), &mut manager, &ScanOptions::default())
            .unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(manager.value("K", "es_ES"), Some("año"));
        assert_eq!(std::fs::read(&path).unwrap(), b"f(TC.get(\"K\"));\n".to_vec());
    }

    #[test]
    fn test_no_root_is_noop() {
        let settings = ScanSettings::default();
        let mut manager = LangManager::new();
        let report = SourceScanner::new(&settings)
            .parse_code(None, &mut manager, &ScanOptions::default())
            .unwrap();

        assert_eq!(report.files_scanned, 0);
        assert_eq!(manager.key_count(), 0);
    }
}
