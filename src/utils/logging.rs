/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 默认日志过滤规则
const DEFAULT_FILTER: &str = "prompt_qa_tool=info,tower_http=info";

/// 初始化全局日志
///
/// `RUST_LOG` 优先；未设置时 `verbose` 决定是否打开 debug 级别。
/// 重复调用是安全的（测试中会多次调用）。
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("prompt_qa_tool=debug,tower_http=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(addr: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 Prompt QA Tool 启动");
    info!("🌐 监听地址: {}", addr);
    info!("📊 最大并发文件对: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录任务开始信息
///
/// # 参数
/// - `total`: 文件对总数
/// - `mode`: 输出模式描述
pub fn log_job_start(total: usize, mode: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理比对任务: 共 {} 对文件", total);
    info!("📄 输出模式: {}", mode);
    info!("{}", "=".repeat(60));
}

/// 记录任务完成信息
///
/// # 参数
/// - `rows`: 生成的比对行数
/// - `files`: 上传的文件数量
pub fn log_job_complete(rows: usize, files: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✅ 任务完成: 共 {} 行比对结果，上传 {} 个文件", rows, files);
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
