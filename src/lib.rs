//! Service Healthcheck - 健康探针聚合
//!
//! 在各自的时间预算内并发执行一组具名探针，将结果归约为单一的综合状态，
//! 供存活/就绪检查端点使用：
//! - 两级超时阈值分级（降级 / 不健康）
//! - 探针 panic 隔离
//! - 最坏优先的状态归约
//! - 基于 axum 的 HTTP 端点
//! - TOML 配置文件

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod health;
pub mod logging;
pub mod probe;
pub mod probes;
pub mod status;
pub mod web;

// 重新导出主要类型
pub use context::CheckContext;
pub use error::{ConfigError, HealthcheckError, ServerError};
pub use health::{Healthcheck, HealthcheckBuilder, Thresholds};
pub use probe::{probe_fn, FnProbe, Probe};
pub use status::Status;

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
