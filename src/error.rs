use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求校验错误（映射表、表单字段）
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 远程文件存储错误
    #[error(transparent)]
    Store(#[from] StoreError),
    /// CSV 报告生成错误
    #[error("CSV 报告生成失败: {0}")]
    Report(#[from] csv::Error),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 后台任务异常退出
    #[error("任务执行失败: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 请求校验错误
///
/// 这些消息会原样返回给调用方，保持英文以兼容现有客户端。
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 映射表为空
    #[error("Mapping CSV is empty or has no usable rows")]
    EmptyMapping,
    /// 某一行缺少 QA 或 LLM 文件名
    #[error("Row {row} missing qa_name/llm_name")]
    MissingName { row: usize },
    /// 表单缺少字段
    #[error("Missing form field: {field}")]
    MissingField { field: String },
    /// 表单解析失败
    #[error("Invalid multipart form: {message}")]
    InvalidForm { message: String },
}

/// 远程文件存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 无法从链接中提取文件夹 ID
    #[error("Could not extract a Google Drive folder ID from: {reference:?}")]
    InvalidFolderReference { reference: String },
    /// 文件夹中找不到指定文件
    #[error("File '{name}' not found in folder {folder_id}.{}", format_suggestions(.suggestions))]
    FileNotFound {
        name: String,
        folder_id: String,
        suggestions: Vec<String>,
    },
    /// 网络请求失败
    #[error("Drive request failed ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回非成功状态码
    #[error("Drive returned {status} ({endpoint}): {body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 未配置访问令牌
    #[error("GOOGLE_ACCESS_TOKEN is required to talk to Google Drive")]
    MissingCredentials,
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        " No similar names in folder.".to_string()
    } else {
        format!(" Close matches: {:?}", suggestions)
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 Drive 请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Store(StoreError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Report(_) | AppError::Config(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ 请求处理失败: {}", self);
        } else {
            tracing::warn!("⚠️ 请求校验失败: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
