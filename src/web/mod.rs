//! Web 服务模块
//!
//! 通过 HTTP 端点暴露聚合后的健康状态

use crate::health::Healthcheck;
use crate::status::Status;
use axum::http::StatusCode;
use std::sync::Arc;

pub mod handlers;
pub mod server;

pub use handlers::default_status_adapter;
pub use server::{HealthServer, HealthServerBuilder};

/// 状态到 HTTP 响应码和响应体的映射
pub type StatusAdapter = Arc<dyn Fn(Status) -> (StatusCode, String) + Send + Sync>;

/// Web 应用状态
#[derive(Clone)]
pub struct WebAppState {
    /// 健康检查引擎
    pub healthcheck: Arc<Healthcheck>,
    /// 状态映射
    pub status_adapter: StatusAdapter,
}
