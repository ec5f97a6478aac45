//! 日志系统模块
//!
//! 提供结构化日志配置和初始化功能

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 是否使用JSON格式
    pub json_format: bool,
    /// 是否输出ANSI颜色
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            json_format: false,
            ansi: true,
        }
    }
}

/// 初始化全局日志系统
///
/// 重复初始化不视为错误，保留第一次安装的订阅器。
///
/// # 参数
/// * `config` - 日志配置
///
/// # 返回
/// * `anyhow::Result<()>` - 初始化结果
pub fn setup_logging(config: &LogConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let fmt_layer = if config.json_format {
        fmt::layer()
            .json()
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_ansi(config.ansi)
            .with_target(true)
            .with_thread_names(true)
            .boxed()
    };

    match registry().with(env_filter).with(fmt_layer).try_init() {
        Ok(()) => {
            tracing::debug!("日志配置: {:?}", config);
            Ok(())
        }
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("a global default trace dispatcher has already been set")
                || error_msg.contains("attempted to set a logger after the logging system was already initialized")
            {
                tracing::debug!("日志系统已经初始化过了");
                Ok(())
            } else {
                Err(anyhow::anyhow!("tracing subscriber初始化失败: {}", error_msg))
            }
        }
    }
}
