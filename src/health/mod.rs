//! 健康检查模块
//!
//! 提供探针注册、并发执行和状态聚合功能

pub mod builder;
pub mod checker;

// 重新导出主要类型
pub use builder::HealthcheckBuilder;
pub use checker::{classify, reduce, Healthcheck, Thresholds};
