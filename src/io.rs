/// IO 抽象层模块
///
/// 该模块提供了文件读写的抽象接口，
/// 支持依赖注入、测试 mock 和替换 IO 实现（如内存 IO）。
///
/// # 架构设计
///
/// - **traits**: 定义 Reader/Writer trait 接口
/// - **properties_io**: XML 属性文件的默认实现
/// - **source_io**: 源代码文件的默认实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use lang_assistant::io::{DefaultPropertiesReader, PropertiesReader};
///
/// let reader = DefaultPropertiesReader;
/// let file = reader.read(Path::new("i18n/editor/es_ES.xml"))?;
/// ```
pub mod traits;
pub mod properties_io;
pub mod source_io;

// === 导出 trait 定义 ===
pub use traits::{PropertiesReader, PropertiesWriter, SourceFileReader, SourceFileWriter};

// === 导出默认实现 ===
pub use properties_io::{DefaultPropertiesReader, DefaultPropertiesWriter};
pub use source_io::{DefaultSourceFileReader, DefaultSourceFileWriter};
