use crate::utils::LangError;

use super::pattern::LiteralMatch;

/// 模板中的键占位符
pub const KEY_PLACEHOLDER: &str = "{key}";

/// 默认替换模板
pub const DEFAULT_REPLACEMENT: &str = "TC.get(\"{key}\")";

/// 字面量替换模板，如 `TC.get("{key}")`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementTemplate {
    template: String,
}

impl ReplacementTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, LangError> {
        let template = template.into();
        if !template.contains(KEY_PLACEHOLDER) {
            return Err(LangError::ConfigError(format!(
                "替换模板缺少 {} 占位符: {}",
                KEY_PLACEHOLDER, template
            )));
        }
        Ok(ReplacementTemplate { template })
    }

    /// 生成某个键的替换文本
    pub fn render(&self, key: &str) -> String {
        self.template.replace(KEY_PLACEHOLDER, key)
    }
}

impl Default for ReplacementTemplate {
    fn default() -> Self {
        ReplacementTemplate {
            template: DEFAULT_REPLACEMENT.to_string(),
        }
    }
}

/// 用替换文本重建文件内容
///
/// `matches` 必须按位置排序且互不重叠（`find_literals` 的输出满足该条件）。
/// 匹配范围之外的字节原样保留。
pub fn rewrite(text: &str, matches: &[LiteralMatch], template: &ReplacementTemplate) -> String {
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;

    for literal in matches {
        output.push_str(&text[cursor..literal.span.start]);
        output.push_str(&template.render(&literal.key));
        cursor = literal.span.end;
    }

    output.push_str(&text[cursor..]);
    output
}
