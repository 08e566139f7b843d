//! HTTP 服务 - 编排层入口
//!
//! - `POST /run`：multipart 表单（三个文件夹 + 映射表文件），运行一次比对任务
//! - `GET /health`：健康检查

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::clients::{DriveClient, FileStore};
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::RunJobResult;
use crate::orchestrator::job_processor::{JobProcessor, JobRequest};
use crate::utils::logging::log_startup;

/// 请求处理器共享的状态
pub struct AppState<S> {
    pub processor: Arc<JobProcessor<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// 构建路由
pub fn build_router<S: FileStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/run", post(run_job::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 健康检查
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 运行比对任务
async fn run_job<S: FileStore>(
    State(state): State<AppState<S>>,
    multipart: Multipart,
) -> AppResult<Json<RunJobResult>> {
    let request = read_job_request(multipart).await?;
    let result = state.processor.run(request).await?;
    Ok(Json(result))
}

/// 从 multipart 表单读取任务参数
async fn read_job_request(mut multipart: Multipart) -> AppResult<JobRequest> {
    let mut qa_guides_folder = None;
    let mut llm_outputs_folder = None;
    let mut output_folder = None;
    let mut mapping_csv = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "qa_guides_folder" => qa_guides_folder = Some(field.text().await.map_err(invalid_form)?),
            "llm_outputs_folder" => llm_outputs_folder = Some(field.text().await.map_err(invalid_form)?),
            "output_folder" => output_folder = Some(field.text().await.map_err(invalid_form)?),
            "mapping_csv_file" => mapping_csv = Some(field.bytes().await.map_err(invalid_form)?.to_vec()),
            _ => {}
        }
    }

    Ok(JobRequest {
        qa_guides_folder: required(qa_guides_folder, "qa_guides_folder")?,
        llm_outputs_folder: required(llm_outputs_folder, "llm_outputs_folder")?,
        output_folder: required(output_folder, "output_folder")?,
        mapping_csv: required(mapping_csv, "mapping_csv_file")?,
    })
}

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| {
        ValidationError::MissingField {
            field: field.to_string(),
        }
        .into()
    })
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> ValidationError {
    ValidationError::InvalidForm {
        message: err.body_text(),
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    state: AppState<DriveClient>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.server_addr, config.max_concurrent_pairs);

        let drive = DriveClient::new(&config).context("无法创建 Drive 客户端")?;
        let processor = JobProcessor::new(Arc::new(drive), &config);

        Ok(Self {
            config,
            state: AppState {
                processor: Arc::new(processor),
            },
        })
    }

    /// 启动 HTTP 服务
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.config.server_addr)
            .await
            .with_context(|| format!("无法监听地址: {}", self.config.server_addr))?;

        info!("🌐 服务已启动: http://{}", self.config.server_addr);
        axum::serve(listener, build_router(self.state))
            .await
            .context("HTTP 服务异常退出")?;

        Ok(())
    }
}
