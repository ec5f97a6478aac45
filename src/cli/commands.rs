//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{ConfigLoader, HealthcheckConfig, TomlConfigLoader};
use crate::context::CheckContext;
use crate::error::Result;
use crate::status::Status;
use crate::web::HealthServer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    ///
    /// # 返回
    /// * `Result<i32>` - 进程退出码
    async fn execute(&self, args: &Args) -> Result<i32>;
}

/// 根据子命令选择处理器
pub fn command_for(args: &Args) -> Box<dyn Command> {
    match args.command {
        Commands::Serve { .. } => Box::new(ServeCommand),
        Commands::Check { .. } => Box::new(CheckCommand),
        Commands::Validate => Box::new(ValidateCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    }
}

/// 加载配置文件
async fn load_config(args: &Args) -> Result<HealthcheckConfig> {
    let loader = TomlConfigLoader::new(true);
    let config = loader.load_from_file(args.get_config_path()).await?;
    Ok(config)
}

/// 启动服务命令
pub struct ServeCommand;

#[async_trait]
impl Command for ServeCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        let Commands::Serve { address } = &args.command else {
            return Ok(0);
        };

        let config = load_config(args).await?;
        let healthcheck = Arc::new(config.build_healthcheck()?);

        let address = address.clone().unwrap_or(config.server.address.clone());
        let mut server = HealthServer::builder(Arc::clone(&healthcheck))
            .address(address)
            .route(config.server.route.clone())
            .build()?;

        server.start().await?;
        info!(
            "已注册 {} 个探针: {:?}",
            healthcheck.probe_count(),
            healthcheck.probe_names()
        );

        match signal::ctrl_c().await {
            Ok(()) => info!("收到中断信号，正在停止服务..."),
            Err(err) => error!("监听中断信号失败: {}", err),
        }

        server.stop().await;
        Ok(0)
    }
}

/// 一次性检查命令
pub struct CheckCommand;

impl CheckCommand {
    /// 执行一次检查并返回综合状态
    pub async fn run(config: &HealthcheckConfig, timeout: Option<Duration>) -> Result<Status> {
        let healthcheck = config.build_healthcheck()?;
        let ctx = match timeout {
            Some(timeout) => CheckContext::with_timeout(timeout),
            None => CheckContext::new(),
        };
        Ok(healthcheck.handle(&ctx).await)
    }

    /// JSON格式的检查报告
    pub fn json_report(status: Status) -> serde_json::Value {
        serde_json::json!({
            "status": status,
            "code": status.as_i32(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })
    }

    /// 状态对应的退出码
    pub fn exit_code(status: Status) -> i32 {
        if status.is_serving() {
            0
        } else {
            1
        }
    }
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        let Commands::Check { format, timeout } = &args.command else {
            return Ok(0);
        };

        let config = load_config(args).await?;
        let status = Self::run(&config, timeout.map(Duration::from_millis)).await?;

        match format {
            OutputFormat::Json => println!("{}", Self::json_report(status)),
            OutputFormat::Text => println!("{}", status),
        }

        Ok(Self::exit_code(status))
    }
}

/// 验证配置命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        let path = args.get_config_path();
        match load_config(args).await {
            Ok(config) => {
                println!("✓ 配置文件有效: {}", path.display());
                println!("  探针数量: {}", config.probes.len());
                println!(
                    "  阈值: 降级 {}ms / 不健康 {}ms",
                    config.thresholds.degraded_ms, config.thresholds.unhealthy_ms
                );
                Ok(0)
            }
            Err(e) => {
                println!("✗ 配置文件无效: {}", path.display());
                println!("  {}", e);
                Ok(1)
            }
        }
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", version_info);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(0)
    }
}
