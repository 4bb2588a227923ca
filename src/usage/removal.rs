use std::collections::BTreeSet;

use crate::manager::LangManager;

use super::UnusedKeyReport;

/// 未使用键的删除确认表
///
/// 所有未使用键初始为选中状态，可逐个取消。`apply` 删除仍被选中的键。
#[derive(Debug, Clone)]
pub struct RemovalSelection {
    keys: Vec<String>,
    selected: BTreeSet<String>,
}

impl RemovalSelection {
    pub fn new(report: &UnusedKeyReport) -> Self {
        let keys = report.unused_keys();
        let selected = keys.iter().cloned().collect();
        RemovalSelection { keys, selected }
    }

    /// 表中全部键（按约简前的键排序）
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    /// 选中键，键不在表中时返回 false
    pub fn select(&mut self, key: &str) -> bool {
        if !self.keys.iter().any(|k| k == key) {
            return false;
        }
        self.selected.insert(key.to_string());
        true
    }

    /// 取消选中，键不在表中时返回 false
    pub fn deselect(&mut self, key: &str) -> bool {
        if !self.keys.iter().any(|k| k == key) {
            return false;
        }
        self.selected.remove(key);
        true
    }

    pub fn selected_keys(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// 从语言管理器中删除选中的键，返回删除数量
    pub fn apply(&self, manager: &mut LangManager) -> usize {
        let mut removed = 0;
        for key in &self.selected {
            if manager.remove_key(key) {
                tracing::debug!(key = %key, "Removed unused key");
                removed += 1;
            }
        }
        removed
    }
}

impl std::fmt::Display for RemovalSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.keys.iter().map(|k| k.chars().count()).max().unwrap_or(3).max(3);
        writeln!(f, "{:<width$}  remove?", "Key", width = width)?;
        for key in &self.keys {
            let mark = if self.is_selected(key) { "[x]" } else { "[ ]" };
            writeln!(f, "{:<width$}  {}", key, mark, width = width)?;
        }
        Ok(())
    }
}
