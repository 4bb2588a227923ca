use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::utils::LangError;

/// 帮助文档目录
///
/// 目录下每个子目录对应一种语言，文档按纯文本读写。
#[derive(Debug, Clone)]
pub struct HelpCatalog {
    directory: PathBuf,
    /// 不属于语言的条目名（如 `.svn`、`common_img`）
    ignore: Vec<String>,
}

impl HelpCatalog {
    pub fn new(directory: impl Into<PathBuf>, ignore: Vec<String>) -> Self {
        HelpCatalog {
            directory: directory.into(),
            ignore,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == name)
    }

    /// 所有语言（子目录名，排序）
    ///
    /// 帮助目录不存在时返回空列表。
    pub fn languages(&self) -> Result<Vec<String>, LangError> {
        if !self.directory.is_dir() {
            tracing::debug!("Help directory not found: {:?}", self.directory);
            return Ok(Vec::new());
        }

        let mut languages = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.is_ignored(&name) {
                languages.push(name);
            }
        }

        languages.sort();
        Ok(languages)
    }

    fn language_dir(&self, language: &str) -> Result<PathBuf, LangError> {
        let dir = self.directory.join(language);
        if self.is_ignored(language) || !dir.is_dir() {
            return Err(LangError::UnknownLanguage(language.to_string()));
        }
        Ok(dir)
    }

    /// 某语言下的全部文档（相对语言目录的路径，递归、排序）
    pub fn documents(&self, language: &str) -> Result<Vec<PathBuf>, LangError> {
        let dir = self.language_dir(language)?;
        let ignore = self.ignore.clone();

        let mut documents = Vec::new();
        let walker = WalkBuilder::new(&dir)
            .standard_filters(false)
            .filter_entry(move |entry| {
                let name = entry.file_name().to_string_lossy();
                !ignore.iter().any(|ignored| ignored.as_str() == name.as_ref())
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read help entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&dir) {
                documents.push(relative.to_path_buf());
            }
        }

        documents.sort();
        Ok(documents)
    }

    /// 读取文档内容
    pub fn read_document(&self, language: &str, relative: &Path) -> Result<String, LangError> {
        let path = self.document_path(language, relative)?;
        Ok(std::fs::read_to_string(path)?)
    }

    /// 写入文档内容（覆盖原文件）
    pub fn write_document(&self, language: &str, relative: &Path, content: &str) -> Result<(), LangError> {
        let path = self.document_path(language, relative)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "Saved help document");
        Ok(())
    }

    fn document_path(&self, language: &str, relative: &Path) -> Result<PathBuf, LangError> {
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(LangError::InvalidProject(format!(
                "文档路径必须位于语言目录内: {:?}",
                relative
            )));
        }
        Ok(self.language_dir(language)?.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_catalog() -> (TempDir, HelpCatalog) {
        let temp_dir = TempDir::new().unwrap();
        let help = temp_dir.path().join("help");
        for dir in ["es_ES/chapters", "en_EN", "common_img", ".svn", "es_ES/.svn"] {
            std::fs::create_dir_all(help.join(dir)).unwrap();
        }
        std::fs::write(help.join("help.css"), "body {}").unwrap();
        std::fs::write(help.join("es_ES/index.html"), "<html>Hola</html>").unwrap();
        std::fs::write(help.join("es_ES/chapters/intro.html"), "<p>Intro</p>").unwrap();
        std::fs::write(help.join("es_ES/.svn/entries"), "").unwrap();

        let ignore = vec![".svn".to_string(), "common_img".to_string(), "help.css".to_string()];
        let catalog = HelpCatalog::new(help, ignore);
        (temp_dir, catalog)
    }

    #[test]
    fn test_languages_skip_ignored() {
        let (_temp_dir, catalog) = create_catalog();

        assert_eq!(catalog.languages().unwrap(), vec!["en_EN", "es_ES"]);
    }

    #[test]
    fn test_documents_recursive_and_sorted() {
        let (_temp_dir, catalog) = create_catalog();

        assert_eq!(
            catalog.documents("es_ES").unwrap(),
            vec![PathBuf::from("chapters/intro.html"), PathBuf::from("index.html")]
        );
        assert!(catalog.documents("en_EN").unwrap().is_empty());
        assert!(matches!(catalog.documents("common_img"), Err(LangError::UnknownLanguage(_))));
    }

    #[test]
    fn test_read_and_write_document() {
        let (_temp_dir, catalog) = create_catalog();
        let index = Path::new("index.html");

        assert_eq!(catalog.read_document("es_ES", index).unwrap(), "<html>Hola</html>");

        catalog.write_document("en_EN", index, "<html>Hello</html>").unwrap();
        assert_eq!(catalog.read_document("en_EN", index).unwrap(), "<html>Hello</html>");

        assert!(catalog.read_document("es_ES", Path::new("../help.css")).is_err());
    }

    #[test]
    fn test_missing_help_directory() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = HelpCatalog::new(temp_dir.path().join("help"), Vec::new());

        assert!(catalog.languages().unwrap().is_empty());
    }
}
