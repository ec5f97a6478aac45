//! Web 路由处理函数
//!
//! 把一次请求映射为一次健康检查，再把状态映射为 HTTP 响应

use super::WebAppState;
use crate::context::CheckContext;
use crate::status::Status;
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

/// 健康检查端点处理函数
///
/// 只接受 GET，HEAD 在内的其他方法直接返回 405，不触发检查。
/// 每个请求使用独立的上下文；请求被中止时上下文随守卫一起取消。
pub async fn health(method: Method, State(app_state): State<WebAppState>) -> Response {
    if method != Method::GET {
        return method_not_allowed();
    }

    let ctx = CheckContext::new();
    let _guard = ctx.drop_guard();

    let status = app_state.healthcheck.handle(&ctx).await;
    (app_state.status_adapter)(status).into_response()
}

/// 非 GET 请求
pub fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response()
}

/// 默认的状态映射
pub fn default_status_adapter(status: Status) -> (StatusCode, String) {
    let code = match status {
        Status::Healthy | Status::Degraded => StatusCode::OK,
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        Status::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (code, status.to_string())
}
