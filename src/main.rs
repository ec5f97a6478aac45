//! Service Healthcheck 主程序入口

use anyhow::{Context, Result};
use clap::Parser;
use service_healthcheck::cli::{command_for, Args};
use service_healthcheck::logging::{setup_logging, LogConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.into(),
        json_format: args.json_logs,
        ..Default::default()
    };
    setup_logging(&log_config).context("初始化日志系统失败")?;

    info!("Service Healthcheck v{} 启动", service_healthcheck::VERSION);

    // 配置错误在启动阶段直接退出
    match command_for(&args).execute(&args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("命令执行失败: {}", e);
            std::process::exit(1);
        }
    }
}
