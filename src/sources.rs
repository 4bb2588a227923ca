use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::utils::LangError;

/// 源文件过滤条件
#[derive(Debug, Clone)]
pub struct SourceFilter {
    /// 源文件扩展名（不含点，如 "java"）
    extensions: Vec<String>,
    include_set: Option<GlobSet>,
    exclude_set: GlobSet,
    respect_gitignore: bool,
}

impl SourceFilter {
    /// 构建过滤条件
    ///
    /// `include_patterns` 为空时包含所有匹配扩展名的文件。
    /// 模式相对于遍历根目录匹配。
    pub fn new(
        extensions: &[String],
        include_patterns: &[String],
        exclude_patterns: &[String],
        respect_gitignore: bool,
    ) -> Result<Self, LangError> {
        let include_set = if include_patterns.is_empty() {
            None
        } else {
            Some(build_glob_set(include_patterns)?)
        };

        Ok(SourceFilter {
            extensions: extensions.to_vec(),
            include_set,
            exclude_set: build_glob_set(exclude_patterns)?,
            respect_gitignore,
        })
    }

    /// 只按扩展名过滤
    pub fn with_extensions(extensions: &[&str]) -> Self {
        SourceFilter {
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
            include_set: None,
            exclude_set: GlobSet::empty(),
            respect_gitignore: false,
        }
    }

    /// 判断相对路径是否为需要处理的源文件
    pub fn is_match(&self, relative_path: &Path) -> bool {
        let extension_ok = relative_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext));

        if !extension_ok {
            return false;
        }

        if let Some(include_set) = &self.include_set {
            if !include_set.is_match(relative_path) {
                return false;
            }
        }

        !self.exclude_set.is_match(relative_path)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, LangError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// 递归查找根目录下的源文件，结果按路径排序
pub fn find_source_files(root: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>, LangError> {
    if !root.is_dir() {
        return Err(LangError::InvalidProject(format!("源码目录不存在: {:?}", root)));
    }

    let mut found_files = Vec::new();

    for result in WalkBuilder::new(root)
        .standard_filters(filter.respect_gitignore)
        .hidden(false)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        // 只处理文件
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };

        if filter.is_match(relative_path) {
            found_files.push(path.to_path_buf());
        }
    }

    found_files.sort();
    tracing::debug!(root = %root.display(), count = found_files.len(), "Found source files");

    Ok(found_files)
}
