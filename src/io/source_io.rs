/// 源代码文件 IO 实现

use std::path::Path;

use super::traits::{SourceFileReader, SourceFileWriter};
use crate::utils::LangError;

/// 默认的源文件读取器
#[derive(Debug, Clone, Default)]
pub struct DefaultSourceFileReader;

impl SourceFileReader for DefaultSourceFileReader {
    fn read(&self, path: &Path) -> Result<Vec<u8>, LangError> {
        Ok(std::fs::read(path)?)
    }
}

/// 默认的源文件写入器
#[derive(Debug, Clone, Default)]
pub struct DefaultSourceFileWriter;

impl SourceFileWriter for DefaultSourceFileWriter {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), LangError> {
        std::fs::write(path, data)?;
        Ok(())
    }
}
