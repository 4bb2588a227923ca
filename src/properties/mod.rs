mod file;
mod io;
mod set;


pub use file::PropertiesFile;
pub use io::{parse_filename, properties_path};
pub use set::{LoadFailure, PropertiesSet};

/// 属性文件扩展名
pub const PROPERTIES_EXTENSION: &str = "xml";

/// XML 声明（与 Java `Properties.storeToXML` 输出一致）
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;

/// 属性文件 DOCTYPE
pub const PROPERTIES_DOCTYPE: &str =
    r#"<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">"#;
