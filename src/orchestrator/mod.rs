//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `job_processor` - 比对任务处理器
//! - 解析文件夹引用、校验映射表
//! - 控制并发数量（Semaphore），按映射表顺序汇总结果
//! - 生成并上传结果 CSV
//!
//! ### `server` - HTTP 服务
//! - 管理应用生命周期（初始化、运行）
//! - 把 multipart 表单转换为任务请求
//!
//! ## 层次关系
//!
//! ```text
//! server (HTTP 请求)
//!     ↓
//! job_processor (处理 Vec<MappingRow>)
//!     ↓
//! workflow::ComparisonFlow (处理单个文件对)
//!     ↓
//! services (能力层：parse / compare)    clients (FileStore)
//! ```

pub mod job_processor;
pub mod server;

pub use job_processor::{JobProcessor, JobRequest};
pub use server::{build_router, App, AppState};
