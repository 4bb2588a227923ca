pub mod datatypes;
pub mod language;
pub mod properties;
pub mod io;
pub mod manager;
pub mod table;
pub mod sources;
pub mod scanner;
pub mod usage;
pub mod config;
pub mod project;
pub mod help;
pub mod utils;

// 重新导出主要结构
pub use config::{AssistantSettings, PartConfig};
pub use datatypes::KeyFlags;
pub use help::HelpCatalog;
pub use language::Language;
pub use manager::{LangManager, SaveSummary, StoreStats};
pub use project::{Project, ProjectPart};
pub use scanner::{ScanOptions, ScanReport, SourceScanner};
pub use table::{LangTable, TableRow};
pub use usage::{find_unused_keys, RemovalSelection, UnusedKeyReport, UsageIndex};
pub use utils::LangError;

// 常量定义
pub use properties::PROPERTIES_EXTENSION;
