use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::infrastructure::logging::LogFormat;

/// 要运行的交互组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Widget {
    /// 提交图沙盒：暂存、提交、分支、合并
    #[default]
    Sandbox,
    /// 推送/拉取模拟器
    Sync,
    /// Pull Request 流程
    Pr,
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "git-sim",
    version,
    about = "Git 概念模拟器 - 在内存中演示提交、分支、合并、推送/拉取和 PR 流程",
    long_about = "git-sim 在终端中运行网站上的三个交互组件：提交图沙盒、推送/拉取模拟器和 Pull Request 流程。每条命令都会输出模拟的 git 终端日志。"
)]
pub struct Args {
    /// Widget to run (sandbox, sync, pr)
    #[arg(short, long, value_enum, default_value_t = Widget::Sandbox)]
    pub widget: Widget,

    /// 配置文件路径（TOML）
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 诊断日志级别（trace, debug, info, warn, error）
    #[arg(short, long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// 诊断日志格式
    #[arg(long = "log-format", value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// 诊断日志写入文件而不是标准错误
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// 模拟网络延迟（毫秒）
    #[arg(short, long = "delay-ms", value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// 固定随机种子，生成可复现的哈希
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// 每条命令后以 JSON 输出快照
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// 以分号分隔的命令脚本，执行完即退出（如 -e "commit hi; branch feature"）
    #[arg(short = 'e', long = "exec", value_name = "SCRIPT")]
    pub script: Option<String>,
}
