use std::collections::HashMap;

/// 单个语言的翻译表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// 语言标识（如 "es_ES"）
    identifier: String,
    /// 写入属性文件时使用的注释
    comment: String,
    /// 键 -> 翻译文本
    values: HashMap<String, String>,
}

impl Language {
    pub fn new(identifier: impl Into<String>, comment: impl Into<String>) -> Self {
        Language {
            identifier: identifier.into(),
            comment: comment.into(),
            values: HashMap::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn put_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove_value(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// 已翻译的键数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 只保留满足条件的键的值
    pub fn retain_values(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.values.retain(|key, _| keep(key));
    }
}
