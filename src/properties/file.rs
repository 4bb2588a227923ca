use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::utils::LangError;

use super::io::parse_filename;
use super::{PROPERTIES_DOCTYPE, XML_DECLARATION};

/// XML 属性文件（Java `Properties.storeToXML` 格式）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesFile {
    /// 文件路径
    pub path: PathBuf,
    /// 语言标识符（文件名去掉 `.xml`）
    pub identifier: String,
    /// `<comment>` 元素内容
    pub comment: Option<String>,
    /// 条目映射（键 -> 值），按键排序
    pub entries: BTreeMap<String, String>,
}

/// 解析过程中当前所在的元素
enum OpenElement {
    None,
    Comment,
    Entry(String),
}

impl PropertiesFile {
    /// 从文件路径读取属性文件
    pub fn new(path: PathBuf) -> Result<Self, LangError> {
        let identifier = parse_filename(&path)?;

        if !path.exists() {
            return Err(LangError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("属性文件不存在: {:?}", path),
            )));
        }

        let data = fs::read(&path)?;
        let (content, _, had_errors) = encoding_rs::UTF_8.decode(&data);
        if had_errors {
            return Err(LangError::InvalidPropertiesFormat(format!(
                "{:?} 不是有效的 UTF-8 文件",
                path
            )));
        }

        let (comment, entries) = Self::parse_str(&content)?;

        Ok(PropertiesFile {
            path,
            identifier,
            comment,
            entries,
        })
    }

    /// 从内存文本创建属性文件实例
    pub fn from_xml_str(content: &str, identifier: impl Into<String>) -> Result<Self, LangError> {
        let identifier = identifier.into();
        let (comment, entries) = Self::parse_str(content)?;

        Ok(PropertiesFile {
            path: PathBuf::from(format!("<memory>:{}.xml", identifier)),
            identifier,
            comment,
            entries,
        })
    }

    /// 创建空的属性文件
    pub fn empty(identifier: impl Into<String>, comment: Option<String>) -> Self {
        let identifier = identifier.into();
        PropertiesFile {
            path: PathBuf::from(format!("<memory>:{}.xml", identifier)),
            identifier,
            comment,
            entries: BTreeMap::new(),
        }
    }

    /// 解析 XML 文本，返回注释与条目
    fn parse_str(content: &str) -> Result<(Option<String>, BTreeMap<String, String>), LangError> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(false);

        let mut comment = None;
        let mut entries = BTreeMap::new();
        let mut has_root = false;
        let mut open = OpenElement::None;
        let mut text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) => match element.name().as_ref() {
                    b"properties" if !has_root => has_root = true,
                    b"comment" if has_root => {
                        open = OpenElement::Comment;
                        text.clear();
                    }
                    b"entry" if has_root => {
                        open = OpenElement::Entry(entry_key(&element)?);
                        text.clear();
                    }
                    other => return Err(unexpected_element(other)),
                },
                Ok(Event::Empty(element)) => match element.name().as_ref() {
                    b"properties" if !has_root => has_root = true,
                    b"comment" if has_root => comment = Some(String::new()),
                    b"entry" if has_root => {
                        entries.insert(entry_key(&element)?, String::new());
                    }
                    other => return Err(unexpected_element(other)),
                },
                Ok(Event::Text(data)) => {
                    if !matches!(open, OpenElement::None) {
                        let unescaped = data
                            .unescape()
                            .map_err(|e| LangError::InvalidPropertiesFormat(e.to_string()))?;
                        text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(data)) => {
                    if !matches!(open, OpenElement::None) {
                        let raw = data.into_inner();
                        let decoded = std::str::from_utf8(&raw)
                            .map_err(|e| LangError::InvalidPropertiesFormat(e.to_string()))?;
                        text.push_str(decoded);
                    }
                }
                Ok(Event::End(_)) => match std::mem::replace(&mut open, OpenElement::None) {
                    OpenElement::Entry(key) => {
                        entries.insert(key, std::mem::take(&mut text));
                    }
                    OpenElement::Comment => comment = Some(std::mem::take(&mut text)),
                    OpenElement::None => {}
                },
                Ok(Event::Eof) => break,
                // 声明、DOCTYPE、XML 注释与处理指令
                Ok(_) => {}
                Err(e) => {
                    return Err(LangError::InvalidPropertiesFormat(format!(
                        "位置 {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
            }
        }

        if !has_root {
            return Err(LangError::InvalidPropertiesFormat(
                "缺少 <properties> 根元素".to_string(),
            ));
        }

        Ok((comment, entries))
    }

    /// 获取条目值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// 设置条目值
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// 删除条目
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// 条目数量
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// 序列化为 XML 文本
    pub fn to_xml_string(&self) -> String {
        let mut output = String::new();
        output.push_str(XML_DECLARATION);
        output.push('\n');
        output.push_str(PROPERTIES_DOCTYPE);
        output.push('\n');
        output.push_str("<properties>\n");

        if let Some(comment) = &self.comment {
            output.push_str(&format!("<comment>{}</comment>\n", escape_text(comment)));
        }

        for (key, value) in &self.entries {
            output.push_str(&format!(
                "<entry key=\"{}\">{}</entry>\n",
                escape_attribute(key),
                escape_text(value)
            ));
        }

        output.push_str("</properties>\n");
        output
    }

    /// 写入到指定路径
    pub fn write_to_file(&self, path: &Path) -> Result<(), LangError> {
        fs::write(path, self.to_xml_string())?;
        Ok(())
    }
}

/// 转义元素文本，`\r` 写为字符引用，避免读取时被换行规范化
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#13;")
}

/// 转义属性值，空白字符写为字符引用，避免属性值规范化
fn escape_attribute(text: &str) -> String {
    escape(text)
        .replace('\r', "&#13;")
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

/// 读取 `<entry>` 的 key 属性
fn entry_key(element: &BytesStart<'_>) -> Result<String, LangError> {
    let attribute = element
        .try_get_attribute("key")
        .map_err(|e| LangError::InvalidPropertiesFormat(e.to_string()))?
        .ok_or_else(|| LangError::InvalidPropertiesFormat("<entry> 缺少 key 属性".to_string()))?;

    let value = attribute
        .unescape_value()
        .map_err(|e| LangError::InvalidPropertiesFormat(e.to_string()))?;

    Ok(value.into_owned())
}

fn unexpected_element(name: &[u8]) -> LangError {
    LangError::InvalidPropertiesFormat(format!(
        "意外的元素 <{}>",
        String::from_utf8_lossy(name)
    ))
}
