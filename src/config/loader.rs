//! 配置文件的读取函数

use std::path::Path;

use crate::utils::LangError;

use super::AssistantSettings;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = ".lang-assistant.json";

/// 从项目根目录读取配置
///
/// # Returns
/// - `Ok(Some(settings))`: 找到配置文件且解析、校验成功
/// - `Ok(None)`: 没有配置文件
/// - `Err(LangError)`: 读取、解析或校验失败
pub fn load_from_project(project_root: &Path) -> Result<Option<AssistantSettings>, LangError> {
    let config_path = project_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    let settings: AssistantSettings = serde_json::from_str(&content)?;
    settings.validate()?;

    Ok(Some(settings))
}
