use crate::error::{AppResult, ValidationError};
use crate::models::job::MappingRow;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

/// QA 列可接受的表头（小写、去空白后比较）
const QA_HEADERS: [&str; 4] = ["qa_name", "qa name", "qa", "qa guide"];
/// LLM 列可接受的表头
const LLM_HEADERS: [&str; 4] = ["llm_name", "llm name", "llm", "llm output"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 解码上传的映射表：去掉 BOM，非法字节替换为 U+FFFD
pub fn decode_mapping_bytes(data: &[u8]) -> String {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    String::from_utf8_lossy(data).into_owned()
}

/// 读取映射表中的所有有效行
///
/// 有可识别的表头时按列名取值，否则每一行（包括第一行）取前两列。
/// 两列都为空的行会被跳过。
pub fn read_mapping_rows(data: &[u8]) -> Result<Vec<MappingRow>, csv::Error> {
    let text = decode_mapping_bytes(data);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let records = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;

    let columns = records.first().and_then(header_columns);
    let (body, (qa_col, llm_col)) = match columns {
        Some(cols) => {
            debug!("映射表使用表头列: qa={}, llm={}", cols.0, cols.1);
            (&records[1..], cols)
        }
        None => {
            debug!("映射表未识别到表头，按前两列读取");
            (&records[..], (0, 1))
        }
    };

    let rows = body
        .iter()
        .map(|record| {
            let qa = record.get(qa_col).unwrap_or("").trim();
            let llm = record.get(llm_col).unwrap_or("").trim();
            MappingRow::new(qa, llm)
        })
        .filter(|row| !row.qa_name.is_empty() || !row.llm_name.is_empty())
        .collect();

    Ok(rows)
}

/// 读取并校验映射表
///
/// # 返回
/// 至少一行、且每行两个文件名都存在的映射表；否则返回校验错误，
/// 错误中的行号从 1 开始计数。
pub fn load_mapping(data: &[u8]) -> AppResult<Vec<MappingRow>> {
    let rows = read_mapping_rows(data)?;

    if rows.is_empty() {
        return Err(ValidationError::EmptyMapping.into());
    }

    if let Some(idx) = rows
        .iter()
        .position(|r| r.qa_name.is_empty() || r.llm_name.is_empty())
    {
        return Err(ValidationError::MissingName { row: idx + 1 }.into());
    }

    Ok(rows)
}

/// 在表头中查找 QA 列与 LLM 列，两者都找到才算有效表头
fn header_columns(header: &StringRecord) -> Option<(usize, usize)> {
    let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    let qa = names.iter().position(|n| QA_HEADERS.contains(&n.as_str()))?;
    let llm = names.iter().position(|n| LLM_HEADERS.contains(&n.as_str()))?;
    Some((qa, llm))
}
