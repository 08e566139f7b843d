//! 文件对比对流程 - 流程层
//!
//! 核心职责：定义"一对文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 下载 QA Guide 与 LLM 输出
//! 2. 分别解析为参数表
//! 3. 比对生成结果行

use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::{fetch_text, FileStore};
use crate::error::AppResult;
use crate::models::ComparisonRow;
use crate::services::{compare, parse};
use crate::utils::logging::truncate_text;
use crate::workflow::pair_ctx::PairCtx;

/// 文件对比对流程
///
/// - 编排下载、解析、比对三个步骤
/// - 只依赖存储能力（FileStore）和业务能力（services）
/// - 不关心结果如何汇总和上传
pub struct ComparisonFlow<S> {
    store: Arc<S>,
    qa_folder_id: String,
    llm_folder_id: String,
    verbose_logging: bool,
}

impl<S> Clone for ComparisonFlow<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            qa_folder_id: self.qa_folder_id.clone(),
            llm_folder_id: self.llm_folder_id.clone(),
            verbose_logging: self.verbose_logging,
        }
    }
}

impl<S: FileStore> ComparisonFlow<S> {
    /// 创建新的比对流程
    pub fn new(
        store: Arc<S>,
        qa_folder_id: impl Into<String>,
        llm_folder_id: impl Into<String>,
        verbose_logging: bool,
    ) -> Self {
        Self {
            store,
            qa_folder_id: qa_folder_id.into(),
            llm_folder_id: llm_folder_id.into(),
            verbose_logging,
        }
    }

    pub async fn run(&self, ctx: &PairCtx) -> AppResult<Vec<ComparisonRow>> {
        info!("{} 🔍 下载文件...", ctx);

        let qa_text = fetch_text(self.store.as_ref(), &self.qa_folder_id, &ctx.qa_name).await?;
        let llm_text = fetch_text(self.store.as_ref(), &self.llm_folder_id, &ctx.llm_name).await?;

        if self.verbose_logging {
            debug!("{} QA 内容预览: {}", ctx, truncate_text(&qa_text, 120));
            debug!("{} LLM 内容预览: {}", ctx, truncate_text(&llm_text, 120));
        }

        let qa = parse(&qa_text);
        let llm = parse(&llm_text);
        debug!("{} 解析完成: QA {} 个参数, LLM {} 个参数", ctx, qa.len(), llm.len());

        let rows = compare(&qa, &llm, &ctx.file_names());

        let value_matches = rows.iter().filter(|r| r.value_match).count();
        info!(
            "{} ✓ 比对完成: {} 个参数, 值一致 {}/{}",
            ctx,
            rows.len(),
            value_matches,
            rows.len()
        );

        Ok(rows)
    }
}
