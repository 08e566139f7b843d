//! 参数解析服务 - 业务能力层
//!
//! 只负责"把一份文档解析成参数表"，不关心文档从哪里来。
//!
//! 行格式：`Section::Parameter::Value[::...::Page]`
//! - 空行和 `#` 开头的行忽略
//! - 少于 3 个字段的行忽略
//! - 4 个及以上字段时，最后一个字段为纯数字才记为页码
//! - 同名参数以最后一次出现为准

use std::collections::BTreeMap;

use crate::models::ParsedDocument;

const FIELD_DELIMITER: &str = "::";

/// 解析文档，返回参数值和页码
///
/// 对任意输入都不会失败，格式不对的行直接跳过。
pub fn parse(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::default();

    for raw_line in text.split(is_line_break) {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() < 3 {
            continue;
        }

        let name = fields[1].trim().to_string();
        let value = fields[2].trim().to_string();

        let page = if fields.len() >= 4 {
            let last = fields[fields.len() - 1].trim();
            if is_page_number(last) {
                last.to_string()
            } else {
                String::new()
            }
        } else {
            String::new()
        };

        doc.values.insert(name.clone(), value);
        doc.pages.insert(name, page);
    }

    doc
}

/// 只解析参数值（旧接口）
pub fn parse_values(text: &str) -> BTreeMap<String, String> {
    parse(text).values
}

/// 与常见文本编辑器一致的换行字符集合（包括单独的 `\r`）
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn is_page_number(field: &str) -> bool {
    !field.is_empty() && field.chars().all(|c| c.is_ascii_digit())
}
