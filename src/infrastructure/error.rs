use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 模拟引擎错误类型
///
/// 每个错误都表示一次"未发生任何状态变更"的操作。对应的叙述行在返回
/// 错误之前已经写入 EventLog，调用方无需再补写。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimError {
    #[error("nothing to add")]
    NothingToAdd,

    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("pathspec '{path}' did not match any files")]
    PathspecNotFound { path: String },

    #[error("'{name}' is not a valid branch name")]
    InvalidBranchName { name: String },

    #[error("a branch named '{name}' already exists")]
    BranchExists { name: String },

    #[error("branch '{name}' does not exist")]
    UnknownBranch { name: String },

    #[error("non-fast-forward: remote has {behind} commit(s) not present locally")]
    NonFastForward { behind: usize },

    #[error("a {direction} is already in progress")]
    TransferInProgress { direction: String },

    #[error("no transfer is pending")]
    NoTransferPending,

    #[error("template error: {message}")]
    Template { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// 无事可做，状态保持不变
    NoOp,
    /// 操作被拒绝
    Rejected,
    /// 内部错误（模板、配置）
    Internal,
}

impl SimError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::NothingToAdd | SimError::NothingToCommit | SimError::NoTransferPending => {
                ErrorCategory::NoOp
            }
            SimError::PathspecNotFound { .. }
            | SimError::InvalidBranchName { .. }
            | SimError::BranchExists { .. }
            | SimError::UnknownBranch { .. }
            | SimError::NonFastForward { .. }
            | SimError::TransferInProgress { .. } => ErrorCategory::Rejected,
            SimError::Template { .. } | SimError::Config { .. } => ErrorCategory::Internal,
        }
    }

    /// 是否只是一个无害的空操作
    pub fn is_noop(&self) -> bool {
        self.category() == ErrorCategory::NoOp
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        SimError::Config {
            message: message.into(),
        }
    }
}

impl From<handlebars::RenderError> for SimError {
    fn from(error: handlebars::RenderError) -> Self {
        SimError::Template {
            message: error.to_string(),
        }
    }
}

impl From<handlebars::TemplateError> for SimError {
    fn from(error: handlebars::TemplateError) -> Self {
        SimError::Template {
            message: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for SimError {
    fn from(error: toml::de::Error) -> Self {
        SimError::Config {
            message: format!("TOML parse error: {}", error),
        }
    }
}
