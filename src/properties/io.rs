use std::path::{Path, PathBuf};

use crate::utils::LangError;

use super::PROPERTIES_EXTENSION;

/// 解析文件名获取语言标识
///
/// 文件名格式：`<identifier>.xml`，如 `es_ES.xml`
pub fn parse_filename(path: &Path) -> Result<String, LangError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LangError::InvalidPropertiesFormat(format!("无效的文件扩展名: {:?}", path)))?;

    if extension != PROPERTIES_EXTENSION {
        return Err(LangError::InvalidPropertiesFormat(format!(
            "不支持的属性文件类型: {:?}",
            path
        )));
    }

    let identifier = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LangError::InvalidPropertiesFormat(format!("无效的文件名: {:?}", path)))?;

    Ok(identifier.to_string())
}

/// 构造语言对应的属性文件路径
pub fn properties_path(directory: &Path, identifier: &str) -> PathBuf {
    directory.join(format!("{}.{}", identifier, PROPERTIES_EXTENSION))
}
