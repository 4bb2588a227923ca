use std::ops::Range;

use serde::Serialize;

/// 字面量起始标记（含开引号）
pub const LITERAL_OPEN: &str = "\"@@";

/// 字段分隔符
pub const FIELD_SEPARATOR: &str = "$$";

/// 源码中的一个 `"@@KEY$$ES$$EN$$"` 字面量
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralMatch {
    /// 字面量在整个文件文本中的字节范围（含两端引号）
    pub span: Range<usize>,
    /// 键
    pub key: String,
    /// 两个标记语言的值（默认 es_ES、en_EN）
    pub translations: [String; 2],
}

impl LiteralMatch {
    /// 字面量原文长度（字节）
    pub fn literal_len(&self) -> usize {
        self.span.end - self.span.start
    }
}

/// 查找文本中所有字面量，按出现顺序返回
///
/// 字面量不跨行。格式错误的候选（缺少闭引号、缺少 `$$`、键为空）被静默跳过，
/// 搜索从 `"@@` 之后继续。
pub fn find_literals(text: &str) -> Vec<LiteralMatch> {
    let mut matches = Vec::new();
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        find_in_line(line, line_start, &mut matches);
        line_start += line.len();
    }

    matches
}

fn find_in_line(line: &str, line_offset: usize, matches: &mut Vec<LiteralMatch>) {
    let mut search_from = 0;

    while let Some(relative) = line[search_from..].find(LITERAL_OPEN) {
        let start = search_from + relative;
        let body_start = start + LITERAL_OPEN.len();

        // 闭引号之后本行不可能再有完整字面量
        let Some(close) = line[body_start..].find('"').map(|i| body_start + i) else {
            break;
        };

        match parse_body(&line[body_start..close]) {
            Some((key, translations)) => {
                matches.push(LiteralMatch {
                    span: line_offset + start..line_offset + close + 1,
                    key,
                    translations,
                });
                search_from = close + 1;
            }
            None => {
                search_from = body_start;
            }
        }
    }
}

/// 解析引号内部的 `KEY$$ES$$EN$$`
fn parse_body(body: &str) -> Option<(String, [String; 2])> {
    let (key, rest) = body.split_once(FIELD_SEPARATOR)?;
    let (first, second) = rest.split_once(FIELD_SEPARATOR)?;

    if key.is_empty() {
        return None;
    }

    let second = second.strip_suffix(FIELD_SEPARATOR).unwrap_or(second);

    Some((key.to_string(), [first.to_string(), second.to_string()]))
}
