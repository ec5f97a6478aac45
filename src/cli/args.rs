//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "healthcheck.toml";

/// Service Healthcheck - 健康探针聚合服务
#[derive(Parser, Debug, Clone)]
#[command(
    name = "service-healthcheck",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "SERVICE_HEALTHCHECK_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "SERVICE_HEALTHCHECK_LOG_LEVEL",
        global = true
    )]
    pub log_level: LogLevel,

    /// 是否输出JSON格式日志
    #[arg(long, help = "输出JSON格式日志", global = true)]
    pub json_logs: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动健康检查HTTP服务，直到收到中断信号
    Serve {
        /// 覆盖配置文件中的监听地址
        #[arg(
            short,
            long,
            value_name = "ADDR",
            help = "监听地址",
            env = "SERVICE_HEALTHCHECK_ADDRESS"
        )]
        address: Option<String>,
    },

    /// 执行一次健康检查并输出综合状态
    Check {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,

        /// 整体超时时间（毫秒）
        #[arg(short, long, value_name = "MILLIS", help = "整体超时时间（毫秒）")]
        timeout: Option<u64>,
    },

    /// 验证配置文件
    Validate,

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let args = Args::try_parse_from([
            "service-healthcheck",
            "--config",
            "hc.toml",
            "check",
            "--format",
            "json",
            "--timeout",
            "500",
        ])
        .unwrap();

        assert_eq!(args.get_config_path(), PathBuf::from("hc.toml"));
        match args.command {
            Commands::Check { format, timeout } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(timeout, Some(500));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let args = Args {
            config: None,
            log_level: LogLevel::Info,
            json_logs: false,
            command: Commands::Validate,
        };
        assert_eq!(args.get_config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));

        let args =
            Args::try_parse_from(["service-healthcheck", "validate", "--config", "other.toml"])
                .unwrap();
        assert_eq!(args.get_config_path(), PathBuf::from("other.toml"));
        assert!(matches!(args.command, Commands::Validate));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LogLevel::Debug.to_string(), "debug");
    }
}
