//! 比对任务处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **解析请求**：解析三个文件夹 ID，读取并校验映射表
//! 2. **并发控制**：使用 Semaphore 限制同时处理的文件对数量
//! 3. **保持顺序**：结果按映射表顺序汇总
//! 4. **生成结果**：合并为一个 CSV，或每个文件对单独一个 CSV
//! 5. **上传**：把结果文件上传到输出文件夹
//!
//! 任意一个文件对失败，整个任务失败，不会上传部分结果。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::clients::{resolve_folder_id, FileStore};
use crate::config::{Config, OutputMode};
use crate::error::AppResult;
use crate::models::{load_mapping, ComparisonRow, OutputRow, RunJobResult};
use crate::services::comparer::{artifact_name, write_rows, CsvReport};
use crate::utils::logging::{log_job_complete, log_job_start};
use crate::workflow::{ComparisonFlow, PairCtx};

const CSV_MIME: &str = "text/csv";

/// 一次比对任务的输入
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub qa_guides_folder: String,
    pub llm_outputs_folder: String,
    pub output_folder: String,
    /// 上传的映射表原始字节
    pub mapping_csv: Vec<u8>,
}

/// 比对任务处理器
pub struct JobProcessor<S> {
    store: Arc<S>,
    output_mode: OutputMode,
    max_concurrent_pairs: usize,
    verbose_logging: bool,
}

impl<S: FileStore> JobProcessor<S> {
    /// 创建新的任务处理器
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            output_mode: config.output_mode,
            max_concurrent_pairs: config.max_concurrent_pairs.max(1),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 运行一次比对任务
    ///
    /// # 返回
    /// 每个上传文件对应一个 `OutputRow`
    pub async fn run(&self, request: JobRequest) -> AppResult<RunJobResult> {
        let qa_folder_id = resolve_folder_id(&request.qa_guides_folder)?;
        let llm_folder_id = resolve_folder_id(&request.llm_outputs_folder)?;
        let output_folder_id = resolve_folder_id(&request.output_folder)?;

        let mapping = load_mapping(&request.mapping_csv)?;
        let pairs: Vec<PairCtx> = mapping
            .iter()
            .enumerate()
            .map(|(idx, row)| PairCtx::new(idx + 1, row))
            .collect();

        log_job_start(pairs.len(), self.mode_label());

        let flow = ComparisonFlow::new(
            Arc::clone(&self.store),
            qa_folder_id,
            llm_folder_id,
            self.verbose_logging,
        );
        let results = self.process_pairs(flow, pairs).await?;

        let outputs = match self.output_mode {
            OutputMode::Combined => {
                vec![self.upload_combined(&output_folder_id, &results).await?]
            }
            OutputMode::PerPair => self.upload_per_pair(&output_folder_id, &results).await?,
        };

        let total_rows = results.iter().map(|(_, rows)| rows.len()).sum();
        log_job_complete(total_rows, outputs.len());

        Ok(RunJobResult { outputs })
    }

    /// 并发处理所有文件对，结果按输入顺序返回
    ///
    /// 任务放在 `JoinSet` 中，提前返回错误时 `JoinSet` 被丢弃，剩余任务随之取消。
    async fn process_pairs(
        &self,
        flow: ComparisonFlow<S>,
        pairs: Vec<PairCtx>,
    ) -> AppResult<Vec<(PairCtx, Vec<ComparisonRow>)>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_pairs));
        let total = pairs.len();
        let mut tasks = JoinSet::new();

        for (idx, ctx) in pairs.into_iter().enumerate() {
            let flow = flow.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // Semaphore 不会被关闭，acquire 只会在关闭时失败
                let _permit = semaphore.acquire_owned().await.ok();
                match flow.run(&ctx).await {
                    Ok(rows) => Ok((idx, ctx, rows)),
                    Err(e) => {
                        error!("{} ❌ 处理失败: {}", ctx, e);
                        Err(e)
                    }
                }
            });
        }

        let mut slots: Vec<Option<(PairCtx, Vec<ComparisonRow>)>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            let (idx, ctx, rows) = joined??;
            slots[idx] = Some((ctx, rows));
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// 所有文件对合并为一个 CSV 上传
    async fn upload_combined(
        &self,
        output_folder_id: &str,
        results: &[(PairCtx, Vec<ComparisonRow>)],
    ) -> AppResult<OutputRow> {
        let mut report = CsvReport::new()?;
        for (_, rows) in results {
            report.extend(rows)?;
        }
        let bytes = report.finish()?;
        let file_name = combined_artifact_name(Utc::now());

        let uploaded = self
            .store
            .upload(output_folder_id, &file_name, CSV_MIME, bytes)
            .await?;
        info!("📤 已上传: {} (id={})", uploaded.name, uploaded.id);

        Ok(OutputRow {
            row: 1,
            csv_file_id: uploaded.id,
            csv_file_name: uploaded.name,
        })
    }

    /// 每个文件对单独上传一个 CSV
    async fn upload_per_pair(
        &self,
        output_folder_id: &str,
        results: &[(PairCtx, Vec<ComparisonRow>)],
    ) -> AppResult<Vec<OutputRow>> {
        let mut outputs = Vec::with_capacity(results.len());

        for (ctx, rows) in results {
            let bytes = write_rows(rows)?;
            let file_name = artifact_name(&ctx.output_basename());

            let uploaded = self
                .store
                .upload(output_folder_id, &file_name, CSV_MIME, bytes)
                .await?;
            info!("{} 📤 已上传: {} (id={})", ctx, uploaded.name, uploaded.id);

            outputs.push(OutputRow {
                row: ctx.row,
                csv_file_id: uploaded.id,
                csv_file_name: uploaded.name,
            });
        }

        Ok(outputs)
    }

    fn mode_label(&self) -> &'static str {
        match self.output_mode {
            OutputMode::Combined => "合并输出",
            OutputMode::PerPair => "逐对输出",
        }
    }
}

/// 合并模式的输出文件名，时间戳为 UTC
pub fn combined_artifact_name(now: DateTime<Utc>) -> String {
    format!("prompt_qa_tool_output_{}.csv", now.format("%Y%m%d_%H%M%S"))
}
