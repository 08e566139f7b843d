use serde::{Deserialize, Serialize};

/// 映射表中的一行：哪个 QA Guide 对应哪个 LLM 输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    pub qa_name: String,
    pub llm_name: String,
}

impl MappingRow {
    pub fn new(qa_name: impl Into<String>, llm_name: impl Into<String>) -> Self {
        Self {
            qa_name: qa_name.into(),
            llm_name: llm_name.into(),
        }
    }
}

/// 一个已上传的结果文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    /// 映射表行号（从 1 开始）；合并模式下固定为 1
    pub row: usize,
    pub csv_file_id: String,
    pub csv_file_name: String,
}

/// `/run` 接口的响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJobResult {
    pub outputs: Vec<OutputRow>,
}

/// 远程存储中的文件元数据
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

/// 上传成功后返回的文件信息
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
}
