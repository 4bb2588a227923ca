//! 项目上下文
//!
//! 项目根目录、配置和每个部分的语言管理器都由 [`Project`] 显式持有。

use std::path::{Path, PathBuf};

use crate::config::{load_from_project, AssistantSettings, PartConfig};
use crate::help::HelpCatalog;
use crate::manager::{LangManager, SaveSummary};
use crate::scanner::{ScanOptions, ScanReport, SourceScanner};
use crate::table::LangTable;
use crate::usage::{find_unused_keys, UnusedKeyReport, UsageIndex};
use crate::utils::LangError;

/// 项目的一个部分及其语言管理器
#[derive(Debug, Clone)]
pub struct ProjectPart {
    config: PartConfig,
    i18n_dir: PathBuf,
    source_dir: Option<PathBuf>,
    pub manager: LangManager,
}

impl ProjectPart {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// 属性文件目录（绝对路径）
    pub fn i18n_dir(&self) -> &Path {
        &self.i18n_dir
    }

    /// 源码目录（绝对路径）
    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    settings: AssistantSettings,
    parts: Vec<ProjectPart>,
}

impl Project {
    /// 打开项目：读取配置（不存在时使用默认配置）并加载每个部分
    pub fn open(root: &Path) -> Result<Self, LangError> {
        let settings = load_from_project(root)?.unwrap_or_default();
        Self::with_settings(root, settings)
    }

    /// 使用给定配置打开项目
    pub fn with_settings(root: &Path, settings: AssistantSettings) -> Result<Self, LangError> {
        settings.validate()?;

        if !root.is_dir() {
            return Err(LangError::InvalidProject(format!("项目目录不存在: {:?}", root)));
        }

        let mut parts = Vec::with_capacity(settings.parts.len());
        for config in &settings.parts {
            let i18n_dir = root.join(&config.i18n_dir);
            if !i18n_dir.is_dir() {
                return Err(LangError::InvalidProject(format!(
                    "{} 的语言目录不存在: {:?}",
                    config.name, i18n_dir
                )));
            }

            let source_dir = config.source_dir.as_ref().map(|dir| root.join(dir));
            if let Some(dir) = &source_dir {
                if !dir.is_dir() {
                    return Err(LangError::InvalidProject(format!(
                        "{} 的源码目录不存在: {:?}",
                        config.name, dir
                    )));
                }
            }

            let manager = LangManager::load(&i18n_dir)?;
            tracing::info!(part = %config.name, keys = manager.key_count(), "Loaded project part");

            parts.push(ProjectPart {
                source_dir,
                config: config.clone(),
                i18n_dir,
                manager,
            });
        }

        Ok(Project {
            root: root.to_path_buf(),
            settings,
            parts,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn parts(&self) -> &[ProjectPart] {
        &self.parts
    }

    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(ProjectPart::name).collect()
    }

    pub fn part(&self, name: &str) -> Result<&ProjectPart, LangError> {
        self.parts
            .iter()
            .find(|part| part.name() == name)
            .ok_or_else(|| LangError::UnknownPart(name.to_string()))
    }

    pub fn part_mut(&mut self, name: &str) -> Result<&mut ProjectPart, LangError> {
        self.parts
            .iter_mut()
            .find(|part| part.name() == name)
            .ok_or_else(|| LangError::UnknownPart(name.to_string()))
    }

    /// 为所有部分新增语言，返回实际新增的部分数
    pub fn add_language(&mut self, identifier: &str) -> usize {
        let comment = format!("{}{}", self.settings.default_comment, identifier);
        let mut added = 0;
        for part in &mut self.parts {
            if part.manager.add_language(identifier, comment.clone()) {
                added += 1;
            } else {
                tracing::debug!(part = %part.config.name, language = %identifier, "Language already exists");
            }
        }
        added
    }

    /// 扫描所有配置了源码目录的部分
    ///
    /// 改写任何文件之前先确认所有源码目录都存在。
    pub fn parse_code(&mut self, options: &ScanOptions) -> Result<ScanReport, LangError> {
        let scan_settings = self.settings.scan_settings()?;

        for part in &self.parts {
            if let Some(dir) = part.source_dir() {
                if !dir.is_dir() {
                    return Err(LangError::InvalidProject(format!(
                        "{} 的源码目录不存在: {:?}",
                        part.name(),
                        dir
                    )));
                }
            }
        }
        let scanner = SourceScanner::new(&scan_settings);

        let mut report = ScanReport::default();
        for part in &mut self.parts {
            let part_report = scanner.parse_code(part.source_dir.as_deref(), &mut part.manager, options)?;
            tracing::info!(
                part = %part.config.name,
                literals = part_report.literal_count(),
                "Parsed source code"
            );
            report.merge(part_report);
        }

        Ok(report)
    }

    /// 构建用法搜索索引（搜索根目录为 usageRoot）
    pub fn usage_index(&self) -> Result<UsageIndex, LangError> {
        let scan_settings = self.settings.scan_settings()?;
        UsageIndex::build(
            &self.root.join(&self.settings.usage_root),
            &scan_settings.filter,
            scan_settings.encoding,
        )
    }

    /// 检测某部分中未使用的键
    pub fn find_unused(&self, name: &str) -> Result<UnusedKeyReport, LangError> {
        let part = self.part(name)?;
        let index = self.usage_index()?;
        Ok(find_unused_keys(&part.manager, &index))
    }

    /// 从磁盘重新加载并合并所有部分
    pub fn reload(&mut self) -> Result<(), LangError> {
        for part in &mut self.parts {
            part.manager.update(&part.i18n_dir)?;
        }
        Ok(())
    }

    /// 保存所有部分
    pub fn save_all(&self) -> Result<Vec<(String, SaveSummary)>, LangError> {
        let mut summaries = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            summaries.push((part.name().to_string(), part.manager.save_changes()?));
        }
        Ok(summaries)
    }

    /// 按配置的显示语言创建对照表
    pub fn table(&self) -> LangTable {
        LangTable::new(self.settings.display_languages.clone())
    }

    pub fn help_catalog(&self) -> HelpCatalog {
        HelpCatalog::new(
            self.root.join(&self.settings.help_dir),
            self.settings.help_ignore.clone(),
        )
    }
}
