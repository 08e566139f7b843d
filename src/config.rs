use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "prompt_qa_tool.toml";

/// 结果文件输出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// 所有文件对合并为一个 CSV
    Combined,
    /// 每个文件对单独生成一个 CSV
    PerPair,
}

impl std::str::FromStr for OutputMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(OutputMode::Combined),
            "per_pair" | "per-pair" => Ok(OutputMode::PerPair),
            _ => Err(()),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务监听地址
    pub server_addr: String,
    /// Drive 元数据 API 地址
    pub drive_api_base_url: String,
    /// Drive 上传 API 地址
    pub drive_upload_base_url: String,
    /// OAuth 访问令牌
    pub google_access_token: String,
    /// 输出模式
    pub output_mode: OutputMode,
    /// 同时处理的文件对数量
    pub max_concurrent_pairs: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8000".to_string(),
            drive_api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            drive_upload_base_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            google_access_token: String::new(),
            output_mode: OutputMode::Combined,
            max_concurrent_pairs: 4,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：配置文件（可选）+ 环境变量覆盖
    ///
    /// 配置文件路径取自 `PROMPT_QA_CONFIG`，默认为 [`DEFAULT_CONFIG_FILE`]。
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PROMPT_QA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = Self::from_file(Path::new(&path))?;
        base.with_env(|key| std::env::var(key).ok())
    }

    /// 从 TOML 文件读取配置，文件不存在时返回默认配置
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 使用环境变量覆盖配置项
    ///
    /// `lookup` 便于测试时注入变量而不修改进程环境。
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("SERVER_ADDR") {
            self.server_addr = v;
        }
        if let Some(v) = lookup("DRIVE_API_BASE_URL") {
            self.drive_api_base_url = v;
        }
        if let Some(v) = lookup("DRIVE_UPLOAD_BASE_URL") {
            self.drive_upload_base_url = v;
        }
        if let Some(v) = lookup("GOOGLE_ACCESS_TOKEN") {
            self.google_access_token = v.trim().to_string();
        }
        if let Some(v) = lookup("OUTPUT_MODE") {
            self.output_mode = v.parse().map_err(|_| parse_failed("OUTPUT_MODE", &v, "combined|per_pair"))?;
        }
        if let Some(v) = lookup("MAX_CONCURRENT_PAIRS") {
            let n: usize = v.trim().parse().map_err(|_| parse_failed("MAX_CONCURRENT_PAIRS", &v, "usize"))?;
            self.max_concurrent_pairs = n.max(1);
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = v.trim().parse().map_err(|_| parse_failed("VERBOSE_LOGGING", &v, "bool"))?;
        }
        Ok(self)
    }
}

fn parse_failed(var_name: &str, value: &str, expected_type: &str) -> ConfigError {
    ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    }
}
