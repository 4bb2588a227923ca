use encoding_rs::Encoding;

use crate::utils::LangError;

// 键标志位定义
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyFlags: u8 {
        const MODIFIED = 0b0000_0001;  // 本地修改（新增、编辑）
        const PARSED = 0b0000_0010;    // 从源码中解析得到
    }
}

impl KeyFlags {
    /// 标志位名称列表，用于导出和显示
    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

/// 根据标签查找编码
///
/// 只接受可以原样写回的编码（UTF-16 等编码在 encoding_rs 中写回时会变成 UTF-8）
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, LangError> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| LangError::EncodingError(format!("未知的编码: {}", label)))?;

    if encoding.output_encoding() != encoding {
        return Err(LangError::EncodingError(format!(
            "编码 {} 无法原样写回",
            encoding.name()
        )));
    }

    Ok(encoding)
}

/// 带编码信息的源文件文本
#[derive(Debug, Clone)]
pub struct SourceText {
    pub content: String,
    pub encoding: &'static Encoding,
}

impl SourceText {
    /// 使用指定编码解码源文件字节
    ///
    /// 不处理 BOM：BOM 作为普通字符保留在文本中，写回时原样输出。
    /// 解码出错时返回错误，避免写回时破坏文件内容。
    pub fn decode(data: &[u8], encoding: &'static Encoding) -> Result<Self, LangError> {
        let (decoded, had_errors) = encoding.decode_without_bom_handling(data);
        if had_errors {
            return Err(LangError::EncodingError(format!(
                "内容不是有效的 {} 文本",
                encoding.name()
            )));
        }

        Ok(SourceText {
            content: decoded.into_owned(),
            encoding,
        })
    }

    /// 将文本按原编码重新编码
    pub fn encode(&self) -> Result<Vec<u8>, LangError> {
        Self::encode_str(&self.content, self.encoding)
    }

    /// 将任意文本按指定编码编码
    pub fn encode_str(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>, LangError> {
        let (encoded, _, had_unmappable) = encoding.encode(text);
        if had_unmappable {
            return Err(LangError::EncodingError(format!(
                "文本包含 {} 无法表示的字符",
                encoding.name()
            )));
        }
        Ok(encoded.into_owned())
    }
}
