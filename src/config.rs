//! 项目配置
//!
//! 配置文件为项目根目录下的 `.lang-assistant.json`，缺失时使用默认配置
//! （与 e-Adventure 项目的目录布局一致）。

mod loader;
mod types;

pub use loader::{load_from_project, CONFIG_FILE_NAME};
pub use types::{AssistantSettings, PartConfig};
