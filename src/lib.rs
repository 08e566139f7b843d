//! # Prompt QA Tool
//!
//! 比对 QA Guide 与 LLM/PTO 输出中的参数值和页码，生成 CSV 报告。
//!
//! ## 架构设计
//!
//! ### ① 外部协作层（Clients）
//! - `clients/` - 远程文件存储（`FileStore` 抽象 + Google Drive 实现）
//!
//! ### ② 业务能力层（Services）
//! - `services/parser` - 把一份文档解析为参数值与页码
//! - `services/comparer` - 合并两份参数表为比对行，写出 CSV
//!
//! ### ③ 流程层（Workflow）
//! - `PairCtx` - 上下文封装（映射表行号 + 两个文件名）
//! - `ComparisonFlow` - 流程编排（下载 → 解析 → 比对）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/job_processor` - 映射表校验、并发、汇总、上传
//! - `orchestrator/server` - HTTP 接口
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, OutputMode};
pub use error::{AppError, AppResult};
pub use models::{ComparisonRow, FileNames, ParsedDocument, HEADERS};
pub use orchestrator::{App, JobProcessor, JobRequest};
pub use services::{compare, compare_to_csv, parse};
pub use workflow::{ComparisonFlow, PairCtx};
