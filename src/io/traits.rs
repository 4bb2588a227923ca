/// IO 抽象层 - trait 定义
///
/// 该模块定义了文件读写的抽象接口，支持依赖注入和测试 mock。

use std::path::Path;

use crate::properties::PropertiesFile;
use crate::utils::LangError;

/// 属性文件读取 trait
///
/// # 职责
/// - 读取并解析单个 `<identifier>.xml` 属性文件
pub trait PropertiesReader {
    /// 读取属性文件
    ///
    /// # 参数
    /// * `path` - 属性文件路径
    fn read(&self, path: &Path) -> Result<PropertiesFile, LangError>;
}

/// 属性文件写入 trait
///
/// # 职责
/// - 将 PropertiesFile 序列化并写入文件系统
pub trait PropertiesWriter {
    /// 写入属性文件
    ///
    /// # 参数
    /// * `file` - 要写入的属性文件
    /// * `path` - 目标文件路径
    fn write(&self, file: &PropertiesFile, path: &Path) -> Result<(), LangError>;
}

/// 源代码文件读取 trait
///
/// 扫描在 rayon 线程池中并行执行，实现必须是 `Sync`
pub trait SourceFileReader: Sync {
    /// 读取源文件的原始字节
    fn read(&self, path: &Path) -> Result<Vec<u8>, LangError>;
}

/// 源代码文件写入 trait
pub trait SourceFileWriter: Sync {
    /// 覆盖写入源文件（非原子写入）
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), LangError>;
}
