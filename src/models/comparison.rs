/// 比对结果 CSV 的固定表头
///
/// 列顺序是对外格式约定，不能调整。
pub const HEADERS: [&str; 9] = [
    "QA File Name",
    "PTO File Name",
    "QA Parameter Name",
    "QA Parameter Value",
    "PTO Parameter Value",
    "Parameter Value Match",
    "QA Parameter Page Number",
    "PTO Parameter Page Number",
    "Parameter Page Number Match",
];

/// 参与比对的两个文件名
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNames {
    /// QA Guide 文件名
    pub qa: String,
    /// LLM / PTO 输出文件名
    pub llm: String,
}

impl FileNames {
    pub fn new(qa: impl Into<String>, llm: impl Into<String>) -> Self {
        Self {
            qa: qa.into(),
            llm: llm.into(),
        }
    }
}

/// 单个参数的比对结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub qa_file_name: String,
    pub llm_file_name: String,
    pub parameter: String,
    pub qa_value: String,
    pub llm_value: String,
    pub value_match: bool,
    pub qa_page: String,
    pub llm_page: String,
    pub page_match: bool,
}

impl ComparisonRow {
    /// 按表头顺序输出字段，布尔值渲染为 `True` / `False`
    pub fn to_record(&self) -> [&str; 9] {
        [
            &self.qa_file_name,
            &self.llm_file_name,
            &self.parameter,
            &self.qa_value,
            &self.llm_value,
            render_flag(self.value_match),
            &self.qa_page,
            &self.llm_page,
            render_flag(self.page_match),
        ]
    }
}

fn render_flag(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}
