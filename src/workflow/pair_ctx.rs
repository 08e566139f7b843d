//! 文件对处理上下文
//!
//! 封装"我正在处理映射表第几行的哪两个文件"这一信息

use std::fmt::Display;
use std::path::Path;

use crate::models::{FileNames, MappingRow};

/// 文件对处理上下文
#[derive(Debug, Clone)]
pub struct PairCtx {
    /// 映射表行号（从1开始）
    pub row: usize,

    /// QA Guide 文件名（映射表原值）
    pub qa_name: String,

    /// LLM 输出文件名（映射表原值）
    pub llm_name: String,
}

impl PairCtx {
    /// 创建新的文件对上下文
    pub fn new(row: usize, mapping: &MappingRow) -> Self {
        Self {
            row,
            qa_name: mapping.qa_name.clone(),
            llm_name: mapping.llm_name.clone(),
        }
    }

    /// 写入比对结果的文件名（只保留最后一段路径）
    pub fn file_names(&self) -> FileNames {
        FileNames::new(base_name(&self.qa_name), base_name(&self.llm_name))
    }

    /// 单独输出时使用的文件名前缀：QA 文件名去掉扩展名
    pub fn output_basename(&self) -> String {
        let base = base_name(&self.qa_name);
        Path::new(base)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| base.to_string())
    }
}

impl Display for PairCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[第 {} 行 QA#{} LLM#{}]",
            self.row, self.qa_name, self.llm_name
        )
    }
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
