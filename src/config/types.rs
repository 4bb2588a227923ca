use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::datatypes::encoding_for_label;
use crate::scanner::{ReplacementTemplate, ScanSettings};
use crate::sources::SourceFilter;
use crate::utils::LangError;

/// 项目的一个部分（如 editor、engine），各自拥有独立的语言管理器
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartConfig {
    pub name: String,
    /// 属性文件目录（相对项目根目录）
    pub i18n_dir: PathBuf,
    /// 需要扫描字面量的源码目录（相对项目根目录）
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
}

impl PartConfig {
    pub fn new(name: &str, i18n_dir: &str, source_dir: Option<&str>) -> Self {
        PartConfig {
            name: name.to_string(),
            i18n_dir: PathBuf::from(i18n_dir),
            source_dir: source_dir.map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssistantSettings {
    pub parts: Vec<PartConfig>,

    /// 检测未使用键时搜索的源码根目录（相对项目根目录）
    pub usage_root: PathBuf,

    pub source_extensions: Vec<String>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub respect_gitignore: bool,

    /// 字面量两个值对应的语言
    pub marker_languages: [String; 2],
    /// 表格默认显示的两列语言
    pub display_languages: [String; 2],

    /// 字面量替换模板，必须包含 `{key}`
    pub replacement_template: String,
    /// 源文件编码标签
    pub source_encoding: String,
    /// 新建语言注释的前缀
    pub default_comment: String,

    /// 帮助文档目录（相对项目根目录）
    pub help_dir: PathBuf,
    /// 帮助目录中不属于语言的条目
    pub help_ignore: Vec<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        AssistantSettings {
            parts: vec![
                PartConfig::new("editor", "i18n/editor", Some("src/es/eucm/eadventure/editor")),
                PartConfig::new("engine", "i18n/engine", Some("src/es/eucm/eadventure/engine")),
            ],
            usage_root: PathBuf::from("src/es/eucm/eadventure"),
            source_extensions: vec!["java".to_string()],
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            respect_gitignore: false,
            marker_languages: ["es_ES".to_string(), "en_EN".to_string()],
            display_languages: ["es_ES".to_string(), "en_EN".to_string()],
            replacement_template: crate::scanner::rewrite::DEFAULT_REPLACEMENT.to_string(),
            source_encoding: "utf-8".to_string(),
            default_comment: crate::manager::DEFAULT_COMMENT.to_string(),
            help_dir: PathBuf::from("help"),
            help_ignore: vec![".svn".to_string(), "common_img".to_string(), "help.css".to_string()],
        }
    }
}

impl AssistantSettings {
    /// 校验配置，收集所有问题后一并返回
    pub fn validate(&self) -> Result<(), LangError> {
        let mut problems = Vec::new();

        if self.parts.is_empty() {
            problems.push("parts: 至少需要一个部分".to_string());
        }

        let mut names = HashSet::new();
        for (i, part) in self.parts.iter().enumerate() {
            if part.name.trim().is_empty() {
                problems.push(format!("parts[{}].name: 名称不能为空", i));
            } else if !names.insert(part.name.as_str()) {
                problems.push(format!("parts[{}].name: 重复的名称 {}", i, part.name));
            }
        }

        if self.source_extensions.is_empty() {
            problems.push("sourceExtensions: 至少需要一个扩展名".to_string());
        }

        if self.marker_languages[0] == self.marker_languages[1] {
            problems.push("markerLanguages: 两个语言不能相同".to_string());
        }

        if let Err(e) = ReplacementTemplate::new(self.replacement_template.clone()) {
            problems.push(format!("replacementTemplate: {}", e));
        }

        if let Err(e) = encoding_for_label(&self.source_encoding) {
            problems.push(format!("sourceEncoding: {}", e));
        }

        if let Err(e) = self.source_filter() {
            problems.push(format!("includePatterns/excludePatterns: {}", e));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LangError::ConfigError(format_problems(&problems)))
        }
    }

    /// 构建源文件过滤条件
    pub fn source_filter(&self) -> Result<SourceFilter, LangError> {
        SourceFilter::new(
            &self.source_extensions,
            &self.include_patterns,
            &self.exclude_patterns,
            self.respect_gitignore,
        )
    }

    /// 构建扫描配置
    pub fn scan_settings(&self) -> Result<ScanSettings, LangError> {
        Ok(ScanSettings {
            filter: self.source_filter()?,
            template: ReplacementTemplate::new(self.replacement_template.clone())?,
            encoding: encoding_for_label(&self.source_encoding)?,
            marker_languages: self.marker_languages.clone(),
            default_comment: self.default_comment.clone(),
        })
    }

    pub fn part(&self, name: &str) -> Option<&PartConfig> {
        self.parts.iter().find(|part| part.name == name)
    }
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .enumerate()
        .map(|(i, problem)| format!("\n  {}. {}", i + 1, problem))
        .collect()
}
