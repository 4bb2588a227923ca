use serde::Serialize;

use crate::manager::LangManager;
use crate::utils::{truncate_for_display, LangError};

/// 表格显示时单元格的最大字符数
const CELL_DISPLAY_CHARS: usize = 40;

/// 表格中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub key: String,
    /// 两列语言下的值（缺失时为 None）
    pub values: [Option<String>; 2],
    pub modified: bool,
}

/// 两列语言对照表
///
/// 行跟随语言管理器的当前视图，因此会受搜索过滤影响。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangTable {
    columns: [String; 2],
}

impl LangTable {
    pub fn new(columns: [String; 2]) -> Self {
        LangTable { columns }
    }

    pub fn columns(&self) -> &[String; 2] {
        &self.columns
    }

    /// 修改某一列显示的语言
    pub fn set_column(&mut self, column: usize, identifier: &str) -> Result<(), LangError> {
        let slot = self
            .columns
            .get_mut(column)
            .ok_or_else(|| LangError::ConfigError(format!("列号超出范围: {}", column)))?;
        *slot = identifier.to_string();
        Ok(())
    }

    /// 当前视图中的全部行
    pub fn rows(&self, manager: &LangManager) -> Vec<TableRow> {
        manager
            .visible_keys()
            .into_iter()
            .map(|key| self.build_row(manager, key))
            .collect()
    }

    pub fn row(&self, manager: &LangManager, index: usize) -> Option<TableRow> {
        manager.key(index).map(|key| self.build_row(manager, key))
    }

    fn build_row(&self, manager: &LangManager, key: &str) -> TableRow {
        TableRow {
            key: key.to_string(),
            values: [
                manager.value(key, &self.columns[0]).map(str::to_string),
                manager.value(key, &self.columns[1]).map(str::to_string),
            ],
            modified: manager.is_modified_key(key),
        }
    }

    /// 编辑单元格：写入第 row 行、第 column 列语言的值
    pub fn set_value(
        &self,
        manager: &mut LangManager,
        row: usize,
        column: usize,
        value: &str,
    ) -> Result<(), LangError> {
        let identifier = self
            .columns
            .get(column)
            .ok_or_else(|| LangError::ConfigError(format!("列号超出范围: {}", column)))?;
        let key = manager
            .key(row)
            .ok_or_else(|| LangError::ConfigError(format!("行号超出范围: {}", row)))?
            .to_string();

        manager.set_key_value(&key, identifier, value)
    }

    /// 渲染为纯文本表格，修改过的行以 `*` 标记
    pub fn render(&self, manager: &LangManager) -> String {
        TableView {
            table: self,
            rows: self.rows(manager),
        }
        .to_string()
    }
}

/// 用于显示的表格快照
struct TableView<'a> {
    table: &'a LangTable,
    rows: Vec<TableRow>,
}

impl std::fmt::Display for TableView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells: Vec<[String; 3]> = self
            .rows
            .iter()
            .map(|row| {
                let marker = if row.modified { "*" } else { " " };
                [
                    format!("{}{}", marker, row.key),
                    cell_text(&row.values[0]),
                    cell_text(&row.values[1]),
                ]
            })
            .collect();

        let header = [
            " Key".to_string(),
            self.table.columns[0].clone(),
            self.table.columns[1].clone(),
        ];

        let mut widths = [0usize; 3];
        for line in std::iter::once(&header).chain(cells.iter()) {
            for (width, cell) in widths.iter_mut().zip(line.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &header, &widths)?;
        let total = widths.iter().sum::<usize>() + 6;
        writeln!(f, "{}", "-".repeat(total))?;
        for line in &cells {
            write_line(f, line, &widths)?;
        }
        Ok(())
    }
}

fn cell_text(value: &Option<String>) -> String {
    match value {
        // 多行值只显示为一行
        Some(value) => truncate_for_display(&value.replace('\n', " "), CELL_DISPLAY_CHARS),
        None => "-".to_string(),
    }
}

fn write_line(f: &mut std::fmt::Formatter<'_>, cells: &[String; 3], widths: &[usize; 3]) -> std::fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let padding = width - cell.chars().count();
            format!("{}{}", cell, " ".repeat(padding))
        })
        .collect();
    writeln!(f, "{}", padded.join(" | ").trim_end())
}
