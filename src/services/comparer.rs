//! 比对报告服务 - 业务能力层
//!
//! 只负责"把两份参数表合并成比对结果"，以及把结果写成 CSV。
//!
//! - QA Guide 的参数集合决定输出行，LLM 输出中多出来的参数不会出现
//! - 输出按参数名升序排列
//! - 值和页码都先去掉首尾空白再做字符串比较

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::models::{ComparisonRow, FileNames, ParsedDocument, HEADERS};

/// 单个文件对输出文件名的后缀
pub const OUTPUT_SUFFIX: &str = "__qa_vs_llm.csv";

/// 比对两份解析结果
///
/// # 参数
/// - `qa`: QA Guide 的解析结果（决定输出哪些参数）
/// - `llm`: LLM 输出的解析结果，缺失的参数按空字符串处理
/// - `names`: 写入每一行的两个文件名
///
/// # 返回
/// 按参数名升序排列的比对行，数量与 `qa.values` 相同
pub fn compare(qa: &ParsedDocument, llm: &ParsedDocument, names: &FileNames) -> Vec<ComparisonRow> {
    qa.values
        .iter()
        .map(|(name, qa_value)| {
            let qa_value = qa_value.trim();
            let llm_value = llm.value(name).unwrap_or("").trim();
            let qa_page = qa.page(name).unwrap_or("").trim();
            let llm_page = llm.page(name).unwrap_or("").trim();

            ComparisonRow {
                qa_file_name: names.qa.clone(),
                llm_file_name: names.llm.clone(),
                parameter: name.clone(),
                qa_value: qa_value.to_string(),
                llm_value: llm_value.to_string(),
                value_match: qa_value == llm_value,
                qa_page: qa_page.to_string(),
                llm_page: llm_page.to_string(),
                page_match: qa_page == llm_page,
            }
        })
        .collect()
}

/// 把比对行写成带表头的 CSV
pub fn write_rows(rows: &[ComparisonRow]) -> Result<Vec<u8>, csv::Error> {
    let mut report = CsvReport::new()?;
    report.extend(rows)?;
    report.finish()
}

/// 比对并直接生成 CSV 文件内容和文件名
///
/// 文件名为 `{output_basename}__qa_vs_llm.csv`。
pub fn compare_to_csv(
    qa: &ParsedDocument,
    llm: &ParsedDocument,
    names: &FileNames,
    output_basename: &str,
) -> Result<(Vec<u8>, String), csv::Error> {
    let rows = compare(qa, llm, names);
    let bytes = write_rows(&rows)?;
    Ok((bytes, artifact_name(output_basename)))
}

/// 单个文件对的输出文件名
pub fn artifact_name(output_basename: &str) -> String {
    format!("{}{}", output_basename, OUTPUT_SUFFIX)
}

/// 可累加的 CSV 报告
///
/// 创建时写入表头，之后按调用顺序追加多个文件对的比对行。
pub struct CsvReport {
    writer: Writer<Vec<u8>>,
    rows: usize,
}

impl CsvReport {
    /// 创建报告并写入固定表头
    ///
    /// 每条记录以 `\r\n` 结尾。
    pub fn new() -> Result<Self, csv::Error> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(HEADERS)?;
        Ok(Self { writer, rows: 0 })
    }

    /// 追加一行
    pub fn push(&mut self, row: &ComparisonRow) -> Result<(), csv::Error> {
        self.writer.write_record(row.to_record())?;
        self.rows += 1;
        Ok(())
    }

    /// 追加多行
    pub fn extend<'a>(&mut self, rows: impl IntoIterator<Item = &'a ComparisonRow>) -> Result<(), csv::Error> {
        for row in rows {
            self.push(row)?;
        }
        Ok(())
    }

    /// 已写入的数据行数（不含表头）
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// 结束写入，返回 UTF-8 字节
    pub fn finish(self) -> Result<Vec<u8>, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}
