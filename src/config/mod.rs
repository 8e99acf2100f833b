use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::git::sync::DEFAULT_REMOTE_URL;
use crate::infrastructure::error::SimError;
use crate::infrastructure::logging::LogFormat;

/// 模拟器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// 沙盒叙述日志保留的行数
    pub sandbox_log_capacity: usize,
    /// 推送/拉取模拟器叙述日志保留的行数
    pub sync_log_capacity: usize,
    /// PR 流程叙述日志保留的行数
    pub pr_log_capacity: usize,
    /// 模拟网络延迟（毫秒）
    pub transfer_delay_ms: u64,
    pub remote_url: String,
    /// 固定随机种子，便于复现哈希
    pub hash_seed: Option<u64>,
    pub log_level: String,
    pub log_format: LogFormat,
    /// `stderr`、`stdout` 或日志文件路径
    pub log_output: String,
    /// 完整的 EnvFilter 指令，设置后忽略 `log_level`
    pub log_filter: Option<String>,
    pub log_file_location: bool,
    pub log_span_events: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sandbox_log_capacity: 16,
            sync_log_capacity: 13,
            pr_log_capacity: 15,
            transfer_delay_ms: 1500,
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            hash_seed: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            log_output: "stderr".to_string(),
            log_filter: None,
            log_file_location: false,
            log_span_events: false,
        }
    }
}

impl SimConfig {
    /// 按 默认值 → 配置文件 → .env → 环境变量 的顺序加载
    ///
    /// 配置文件依次取 `path`、`GIT_SIM_CONFIG`、`~/.git-sim/config.toml`。
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env::var("GIT_SIM_CONFIG").ok().map(PathBuf::from));
        let mut config = match explicit {
            // 显式指定的文件缺失视为错误
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::from_file(&path)?
            }
            None => match home_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        #[cfg(not(test))]
        config.load_from_env_file();
        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: SimConfig = toml::from_str(&content).map_err(SimError::from)?;
        Ok(config)
    }

    pub fn load_from_env_file(&mut self) {
        // 尝试从用户主目录加载
        if let Ok(home) = env::var("HOME") {
            let user_env_path = PathBuf::from(home).join(".git-sim").join(".env");
            if user_env_path.exists() {
                dotenvy::from_path(user_env_path).ok();
            }
        }

        // 尝试从当前目录加载
        dotenvy::dotenv().ok();
    }

    /// 环境变量覆盖配置文件，无法解析的数值会被忽略
    pub fn load_from_env(&mut self) {
        if let Some(value) = env_parse("GIT_SIM_SANDBOX_LOG_CAPACITY") {
            self.sandbox_log_capacity = value;
        }
        if let Some(value) = env_parse("GIT_SIM_SYNC_LOG_CAPACITY") {
            self.sync_log_capacity = value;
        }
        if let Some(value) = env_parse("GIT_SIM_PR_LOG_CAPACITY") {
            self.pr_log_capacity = value;
        }
        if let Some(value) = env_parse("GIT_SIM_TRANSFER_DELAY_MS") {
            self.transfer_delay_ms = value;
        }
        if let Ok(url) = env::var("GIT_SIM_REMOTE_URL") {
            self.remote_url = url;
        }
        if let Some(seed) = env_parse("GIT_SIM_HASH_SEED") {
            self.hash_seed = Some(seed);
        }
        if let Ok(level) = env::var("GIT_SIM_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = env_parse("GIT_SIM_LOG_FORMAT") {
            self.log_format = format;
        }
        if let Ok(output) = env::var("GIT_SIM_LOG_OUTPUT") {
            self.log_output = output;
        }
        if let Ok(filter) = env::var("GIT_SIM_LOG_FILTER") {
            self.log_filter = Some(filter);
        }
    }

    pub fn update_from_args(&mut self, args: &crate::cli::args::Args) {
        // 命令行参数优先级最高
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(delay) = args.delay_ms {
            self.transfer_delay_ms = delay;
        }
        if let Some(seed) = args.seed {
            self.hash_seed = Some(seed);
        }
        if let Some(format) = args.log_format {
            self.log_format = format;
        }
        if let Some(path) = &args.log_file {
            self.log_output = path.display().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.sandbox_log_capacity == 0 || self.sync_log_capacity == 0 || self.pr_log_capacity == 0 {
            return Err(SimError::config("log capacities must be greater than zero"));
        }
        if self.remote_url.trim().is_empty() {
            return Err(SimError::config("remote_url must not be empty"));
        }
        if self.log_output.trim().is_empty() {
            return Err(SimError::config("log_output must not be empty"));
        }
        Ok(())
    }
}

fn home_config_path() -> Option<PathBuf> {
    env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".git-sim").join("config.toml"))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
