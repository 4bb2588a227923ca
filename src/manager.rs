use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::datatypes::KeyFlags;
use crate::io::{DefaultPropertiesReader, DefaultPropertiesWriter, PropertiesReader, PropertiesWriter};
use crate::language::Language;
use crate::properties::{properties_path, PropertiesFile, PropertiesSet};
use crate::utils::LangError;

/// 加载属性文件时语言的默认注释
pub const DEFAULT_COMMENT: &str = "comment";

/// 语言管理器：一个项目部分的全部键与各语言翻译
///
/// # 不变量
/// - 任何语言中有值的键都在全局键集合中
/// - 键集合始终按字母顺序排序、去重
/// - 搜索视图是键集合的有序子集
#[derive(Debug, Clone, Default)]
pub struct LangManager {
    /// 全部键及其标志位
    keys: BTreeMap<String, KeyFlags>,
    /// 搜索过滤后的键视图（None 表示显示全部键）
    view: Option<Vec<String>>,
    /// 语言列表（按加入顺序）
    languages: Vec<Language>,
    /// 属性文件目录
    directory: Option<PathBuf>,
}

/// 保存结果
#[derive(Debug, Clone, Default)]
pub struct SaveSummary {
    /// 成功写入的文件
    pub written: Vec<PathBuf>,
    /// 写入失败的语言及原因
    pub failed: Vec<(String, String)>,
}

impl SaveSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 语言管理器统计信息
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub key_count: usize,
    pub visible_count: usize,
    pub modified_count: usize,
    pub parsed_count: usize,
    /// (语言标识, 已翻译数量)
    pub languages: Vec<(String, usize)>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== 语言管理器统计 ===")?;
        writeln!(f, "键数量: {}", self.key_count)?;
        writeln!(f, "当前视图: {}", self.visible_count)?;
        writeln!(f, "已修改: {}", self.modified_count)?;
        writeln!(f, "从源码解析: {}", self.parsed_count)?;
        writeln!(f, "语言数量: {}", self.languages.len())?;
        for (identifier, count) in &self.languages {
            let missing = self.key_count.saturating_sub(*count);
            writeln!(f, "  {}: {} 个翻译, 缺失 {}", identifier, count, missing)?;
        }
        Ok(())
    }
}

/// 导出用的键快照
#[derive(Debug, Clone, Serialize)]
pub struct ExportedKey {
    pub key: String,
    pub flags: Vec<&'static str>,
    /// 语言标识 -> 翻译
    pub values: BTreeMap<String, String>,
}

impl LangManager {
    /// 创建空的语言管理器
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载指定目录下的所有语言属性文件
    pub fn load(directory: &Path) -> Result<Self, LangError> {
        Self::load_with_reader(directory, &DefaultPropertiesReader)
    }

    /// 使用自定义 Reader 加载语言属性文件
    ///
    /// 加载完成后清除所有修改/解析标志。
    pub fn load_with_reader(
        directory: &Path,
        reader: &dyn PropertiesReader,
    ) -> Result<Self, LangError> {
        let set = PropertiesSet::load_from_directory_with_reader(directory, reader)?;

        let mut manager = LangManager {
            directory: Some(directory.to_path_buf()),
            ..Self::default()
        };

        for file in set.files {
            manager.merge_file(file, &HashSet::new());
        }

        for flags in manager.keys.values_mut() {
            *flags = KeyFlags::empty();
        }

        tracing::debug!(
            directory = %directory.display(),
            keys = manager.keys.len(),
            languages = manager.languages.len(),
            "Loaded language manager"
        );

        Ok(manager)
    }

    /// 从磁盘重新加载并合并
    ///
    /// - 磁盘上的键：未被本地修改时采用磁盘值
    /// - 既不在磁盘上、也未修改、也非源码解析的键会被移除
    /// - 磁盘上新出现的语言会被加入
    pub fn update(&mut self, directory: &Path) -> Result<(), LangError> {
        self.update_with_reader(directory, &DefaultPropertiesReader)
    }

    /// 使用自定义 Reader 重新加载并合并
    pub fn update_with_reader(
        &mut self,
        directory: &Path,
        reader: &dyn PropertiesReader,
    ) -> Result<(), LangError> {
        let set = PropertiesSet::load_from_directory_with_reader(directory, reader)?;
        self.directory = Some(directory.to_path_buf());

        let protected: HashSet<String> = self
            .keys
            .iter()
            .filter(|(_, flags)| flags.contains(KeyFlags::MODIFIED))
            .map(|(key, _)| key.clone())
            .collect();

        let mut on_disk = HashSet::new();
        for file in set.files {
            on_disk.extend(file.entries.keys().cloned());
            self.merge_file(file, &protected);
        }

        let stale: Vec<String> = self
            .keys
            .iter()
            .filter(|(key, flags)| {
                !on_disk.contains(*key)
                    && !flags.intersects(KeyFlags::MODIFIED | KeyFlags::PARSED)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            self.remove_key(key);
        }

        tracing::debug!(
            directory = %directory.display(),
            removed = stale.len(),
            keys = self.keys.len(),
            "Updated language manager from disk"
        );

        self.view = None;
        Ok(())
    }

    /// 将一个属性文件合并到内存（跳过受保护的键），不改变标志位
    ///
    /// 该语言中未受保护、且文件中已不存在的值会被移除。
    fn merge_file(&mut self, file: PropertiesFile, protected: &HashSet<String>) {
        let comment = file.comment.unwrap_or_else(|| DEFAULT_COMMENT.to_string());
        if !self.add_language(&file.identifier, comment.clone()) {
            if let Some(language) = self.language_mut(&file.identifier) {
                language.set_comment(comment);
            }
        }

        let Some(language) = self.language_mut(&file.identifier) else {
            return;
        };

        language.retain_values(|key| protected.contains(key) || file.entries.contains_key(key));

        let mut new_keys = Vec::new();
        for (key, value) in file.entries {
            if protected.contains(&key) {
                continue;
            }
            language.put_value(key.clone(), value);
            new_keys.push(key);
        }

        for key in new_keys {
            self.keys.entry(key).or_default();
        }
    }

    /// 新增键，返回其在完整键列表中的行号
    ///
    /// 会重置搜索视图，使返回的行号与当前视图一致。
    pub fn add_key(&mut self, key: &str) -> usize {
        self.keys
            .entry(key.to_string())
            .or_default()
            .insert(KeyFlags::MODIFIED);
        self.view = None;
        self.keys
            .range::<str, _>((Bound::Unbounded, Bound::Excluded(key)))
            .count()
    }

    /// 新增语言，已存在时返回 false
    pub fn add_language(&mut self, identifier: &str, comment: impl Into<String>) -> bool {
        if self.has_language(identifier) {
            return false;
        }
        self.languages.push(Language::new(identifier, comment));
        true
    }

    pub fn has_language(&self, identifier: &str) -> bool {
        self.language(identifier).is_some()
    }

    pub fn language(&self, identifier: &str) -> Option<&Language> {
        self.languages.iter().find(|lang| lang.identifier() == identifier)
    }

    fn language_mut(&mut self, identifier: &str) -> Option<&mut Language> {
        self.languages.iter_mut().find(|lang| lang.identifier() == identifier)
    }

    /// 设置键在某语言下的值，并标记为已修改
    pub fn set_key_value(&mut self, key: &str, identifier: &str, value: &str) -> Result<(), LangError> {
        let language = self
            .language_mut(identifier)
            .ok_or_else(|| LangError::UnknownLanguage(identifier.to_string()))?;
        language.put_value(key, value);

        self.keys
            .entry(key.to_string())
            .or_default()
            .insert(KeyFlags::MODIFIED);

        Ok(())
    }

    /// 当前视图中的键数量
    pub fn key_count(&self) -> usize {
        match &self.view {
            Some(view) => view.len(),
            None => self.keys.len(),
        }
    }

    /// 当前视图中第 index 个键
    pub fn key(&self, index: usize) -> Option<&str> {
        match &self.view {
            Some(view) => view.get(index).map(String::as_str),
            None => self.keys.keys().nth(index).map(String::as_str),
        }
    }

    /// 当前视图中的全部键
    pub fn visible_keys(&self) -> Vec<&str> {
        match &self.view {
            Some(view) => view.iter().map(String::as_str).collect(),
            None => self.keys.keys().map(String::as_str).collect(),
        }
    }

    /// 全部键（忽略搜索视图）
    pub fn all_keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn key_flags(&self, key: &str) -> Option<KeyFlags> {
        self.keys.get(key).copied()
    }

    pub fn value(&self, key: &str, identifier: &str) -> Option<&str> {
        self.language(identifier)?.value(key)
    }

    /// 所有语言标识（按加入顺序）
    pub fn lang_ids(&self) -> Vec<&str> {
        self.languages.iter().map(Language::identifier).collect()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// 按子串过滤键视图（不区分大小写，匹配键名或任一语言的值）
    ///
    /// 空字符串恢复显示全部键。
    pub fn search(&mut self, text: &str) {
        if text.is_empty() {
            self.view = None;
            return;
        }

        let needle = text.to_lowercase();
        let view = self
            .keys
            .keys()
            .filter(|key| {
                key.to_lowercase().contains(&needle)
                    || self.languages.iter().any(|lang| {
                        lang.value(key)
                            .is_some_and(|value| value.to_lowercase().contains(&needle))
                    })
            })
            .cloned()
            .collect();

        self.view = Some(view);
    }

    /// 当前是否处于搜索过滤状态
    pub fn is_filtered(&self) -> bool {
        self.view.is_some()
    }

    pub fn is_modified_key(&self, key: &str) -> bool {
        self.keys
            .get(key)
            .is_some_and(|flags| flags.contains(KeyFlags::MODIFIED))
    }

    pub fn is_parsed_key(&self, key: &str) -> bool {
        self.keys
            .get(key)
            .is_some_and(|flags| flags.contains(KeyFlags::PARSED))
    }

    /// 加入从源码解析得到的键
    pub fn add_parsed_key(&mut self, key: &str) {
        self.keys
            .entry(key.to_string())
            .or_default()
            .insert(KeyFlags::PARSED);
        self.view = None;
    }

    /// 删除键（包括所有语言中的值）
    pub fn remove_key(&mut self, key: &str) -> bool {
        let removed = self.keys.remove(key).is_some();
        for language in &mut self.languages {
            language.remove_value(key);
        }
        if let Some(view) = &mut self.view {
            view.retain(|k| k != key);
        }
        removed
    }

    /// 将所有语言保存到加载目录
    pub fn save_changes(&self) -> Result<SaveSummary, LangError> {
        self.save_changes_with_writer(&DefaultPropertiesWriter)
    }

    /// 使用自定义 Writer 保存所有语言
    ///
    /// 单个语言写入失败只记录日志，其余语言继续写入。
    pub fn save_changes_with_writer(&self, writer: &dyn PropertiesWriter) -> Result<SaveSummary, LangError> {
        let directory = self
            .directory
            .as_deref()
            .ok_or_else(|| LangError::InvalidProject("语言管理器没有关联的目录".to_string()))?;

        let mut summary = SaveSummary::default();

        for language in &self.languages {
            let file = self.to_properties(language);
            let path = properties_path(directory, language.identifier());

            match writer.write(&file, &path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), entries = file.count(), "Saved properties file");
                    summary.written.push(path);
                }
                Err(e) => {
                    tracing::warn!("Failed to save properties file {:?}: {}", path, e);
                    summary
                        .failed
                        .push((language.identifier().to_string(), e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// 设置目录后保存
    pub fn save_to(&mut self, directory: &Path) -> Result<SaveSummary, LangError> {
        self.directory = Some(directory.to_path_buf());
        self.save_changes()
    }

    /// 构造某语言的属性文件（只包含键集合中且有值的键）
    fn to_properties(&self, language: &Language) -> PropertiesFile {
        let mut file = PropertiesFile::empty(
            language.identifier(),
            Some(language.comment().to_string()),
        );
        for key in self.keys.keys() {
            if let Some(value) = language.value(key) {
                file.set(key.clone(), value);
            }
        }
        file
    }

    /// 统计信息
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            key_count: self.keys.len(),
            visible_count: self.key_count(),
            modified_count: self
                .keys
                .values()
                .filter(|flags| flags.contains(KeyFlags::MODIFIED))
                .count(),
            parsed_count: self
                .keys
                .values()
                .filter(|flags| flags.contains(KeyFlags::PARSED))
                .count(),
            languages: self
                .languages
                .iter()
                .map(|lang| {
                    let count = self.keys.keys().filter(|key| lang.value(key).is_some()).count();
                    (lang.identifier().to_string(), count)
                })
                .collect(),
        }
    }

    /// 导出全部键的快照（忽略搜索视图）
    pub fn export(&self) -> Vec<ExportedKey> {
        self.keys
            .iter()
            .map(|(key, flags)| ExportedKey {
                key: key.clone(),
                flags: flags.names(),
                values: self
                    .languages
                    .iter()
                    .filter_map(|lang| {
                        lang.value(key)
                            .map(|value| (lang.identifier().to_string(), value.to_string()))
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_manager() -> LangManager {
        let mut manager = LangManager::new();
        manager.add_language("es_ES", "comment");
        manager.add_language("en_EN", "comment");
        manager.set_key_value("Menu.File", "es_ES", "Archivo").unwrap();
        manager.set_key_value("Menu.File", "en_EN", "File").unwrap();
        manager.set_key_value("Menu.Exit", "es_ES", "Salir").unwrap();
        manager.set_key_value("Menu.Exit", "en_EN", "Exit").unwrap();
        manager.set_key_value("Error.Load", "en_EN", "Could not load FILE").unwrap();
        manager
    }

    fn write_language(dir: &Path, identifier: &str, entries: &[(&str, &str)]) {
        let mut file = PropertiesFile::empty(identifier, Some(format!("comment{}", identifier)));
        for (key, value) in entries {
            file.set(*key, *value);
        }
        file.write_to_file(&properties_path(dir, identifier)).unwrap();
    }

    #[test]
    fn test_keys_sorted_and_deduplicated() {
        let mut manager = create_test_manager();
        manager.add_key("Menu.File");

        assert_eq!(manager.visible_keys(), vec!["Error.Load", "Menu.Exit", "Menu.File"]);
        assert_eq!(manager.key(1), Some("Menu.Exit"));
        assert_eq!(manager.key(10), None);
    }

    #[test]
    fn test_add_key_returns_sorted_index() {
        let mut manager = create_test_manager();

        assert_eq!(manager.add_key("Action.Copy"), 0);
        assert_eq!(manager.add_key("Menu.Edit"), 2);
        assert!(manager.is_modified_key("Menu.Edit"));
        assert_eq!(manager.key(2), Some("Menu.Edit"));
    }

    #[test]
    fn test_add_language_rejects_duplicate() {
        let mut manager = create_test_manager();

        assert!(!manager.add_language("es_ES", "other"));
        assert!(manager.add_language("fr_FR", "commentfr_FR"));
        assert_eq!(manager.lang_ids(), vec!["es_ES", "en_EN", "fr_FR"]);
    }

    #[test]
    fn test_set_value_unknown_language() {
        let mut manager = create_test_manager();
        let result = manager.set_key_value("Menu.File", "de_DE", "Datei");

        assert!(matches!(result, Err(LangError::UnknownLanguage(_))));
        assert_eq!(manager.value("Menu.File", "de_DE"), None);
    }

    #[test]
    fn test_set_value_registers_key() {
        let mut manager = create_test_manager();
        manager.set_key_value("New.Key", "es_ES", "Nuevo").unwrap();

        assert!(manager.contains_key("New.Key"));
        assert!(manager.is_modified_key("New.Key"));
        assert_eq!(manager.value("New.Key", "es_ES"), Some("Nuevo"));
    }

    #[test]
    fn test_search_keys_and_values_case_insensitive() {
        let mut manager = create_test_manager();

        manager.search("menu");
        assert_eq!(manager.visible_keys(), vec!["Menu.Exit", "Menu.File"]);

        manager.search("ARCHIVO");
        assert_eq!(manager.visible_keys(), vec!["Menu.File"]);

        // 键名与值同时匹配时不重复
        manager.search("file");
        assert_eq!(manager.visible_keys(), vec!["Error.Load", "Menu.File"]);
        assert_eq!(manager.key_count(), 2);

        manager.search("");
        assert_eq!(manager.key_count(), 3);
        assert!(!manager.is_filtered());
    }

    #[test]
    fn test_remove_key_clears_values_and_view() {
        let mut manager = create_test_manager();
        manager.search("menu");

        assert!(manager.remove_key("Menu.File"));
        assert!(!manager.remove_key("Menu.File"));

        assert_eq!(manager.visible_keys(), vec!["Menu.Exit"]);
        assert_eq!(manager.value("Menu.File", "es_ES"), None);
        assert!(manager.export().iter().all(|k| k.key != "Menu.File"));
    }

    #[test]
    fn test_add_parsed_key_resets_view() {
        let mut manager = create_test_manager();
        manager.search("exit");
        manager.add_parsed_key("Parsed.Key");

        assert!(!manager.is_filtered());
        assert!(manager.is_parsed_key("Parsed.Key"));
        assert!(!manager.is_modified_key("Parsed.Key"));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = create_test_manager();

        let summary = manager.save_to(temp_dir.path()).unwrap();
        assert!(summary.is_complete());
        assert_eq!(summary.written.len(), 2);

        let loaded = LangManager::load(temp_dir.path()).unwrap();

        assert_eq!(loaded.export().len(), manager.export().len());
        for key in manager.all_keys() {
            for lang in manager.lang_ids() {
                assert_eq!(loaded.value(key, lang), manager.value(key, lang));
            }
            // 加载后标志位清空
            assert!(!loaded.is_modified_key(key));
        }
        assert_eq!(loaded.language("es_ES").unwrap().comment(), "comment");
    }

    #[test]
    fn test_save_without_directory_fails() {
        let manager = create_test_manager();
        assert!(manager.save_changes().is_err());
    }

    #[test]
    fn test_update_preserves_modified_and_parsed_keys() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_language(dir, "es_ES", &[("A", "a"), ("B", "b"), ("C", "c")]);

        let mut manager = LangManager::load(dir).unwrap();
        manager.set_key_value("A", "es_ES", "local").unwrap();
        manager.add_parsed_key("P");
        manager.set_key_value("P", "es_ES", "parsed").unwrap();

        // 另一个编辑者修改了磁盘文件：A 改变、B 删除、D 新增、新增语言
        write_language(dir, "es_ES", &[("A", "disk"), ("C", "c2"), ("D", "d")]);
        write_language(dir, "en_EN", &[("D", "dee")]);

        manager.update(dir).unwrap();

        assert_eq!(manager.value("A", "es_ES"), Some("local"));
        assert!(!manager.contains_key("B"));
        assert_eq!(manager.value("C", "es_ES"), Some("c2"));
        assert_eq!(manager.value("D", "en_EN"), Some("dee"));
        assert!(manager.contains_key("P"));
        assert!(manager.has_language("en_EN"));
        assert!(!manager.is_modified_key("C"));
    }

    #[test]
    fn test_update_drops_value_removed_from_one_language() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_language(dir, "es_ES", &[("A", "a"), ("B", "b")]);
        write_language(dir, "en_EN", &[("A", "ay"), ("B", "bee")]);

        let mut manager = LangManager::load(dir).unwrap();
        manager.set_key_value("B", "en_EN", "local").unwrap();

        // B 只从 es_ES 中删除，仍存在于 en_EN
        write_language(dir, "es_ES", &[("A", "a")]);
        write_language(dir, "en_EN", &[("A", "ay")]);
        manager.update(dir).unwrap();

        assert!(manager.contains_key("B"));
        assert_eq!(manager.value("B", "en_EN"), Some("local"));

        write_language(dir, "es_ES", &[("A", "a"), ("C", "c")]);
        write_language(dir, "en_EN", &[("A", "ay"), ("C", "see")]);
        let mut manager = LangManager::load(dir).unwrap();
        write_language(dir, "es_ES", &[("A", "a")]);
        manager.update(dir).unwrap();

        assert_eq!(manager.value("C", "es_ES"), None);
        assert_eq!(manager.value("C", "en_EN"), Some("see"));

        manager.save_changes().unwrap();
        let reloaded = LangManager::load(dir).unwrap();
        assert_eq!(reloaded.value("C", "es_ES"), None);
    }

    #[test]
    fn test_update_refreshes_comment() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        write_language(dir, "es_ES", &[("A", "a")]);
        let mut manager = LangManager::load(dir).unwrap();

        let mut file = PropertiesFile::empty("es_ES", Some("Spanish".to_string()));
        file.set("A", "a");
        file.write_to_file(&properties_path(dir, "es_ES")).unwrap();
        manager.update(dir).unwrap();

        assert_eq!(manager.language("es_ES").unwrap().comment(), "Spanish");
    }

    #[test]
    fn test_stats_and_export() {
        let manager = create_test_manager();
        let stats = manager.stats();

        assert_eq!(stats.key_count, 3);
        assert_eq!(stats.modified_count, 3);
        assert_eq!(stats.parsed_count, 0);
        assert_eq!(stats.languages, vec![("es_ES".to_string(), 2), ("en_EN".to_string(), 3)]);
        assert!(stats.to_string().contains("es_ES: 2 个翻译, 缺失 1"));

        let exported = manager.export();
        assert_eq!(exported[0].key, "Error.Load");
        assert_eq!(exported[0].flags, vec!["MODIFIED"]);
        assert_eq!(exported[0].values.get("en_EN").map(String::as_str), Some("Could not load FILE"));
    }
}
