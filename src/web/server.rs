//! Web服务器实现
//!
//! 提供健康检查 HTTP 服务器的构建、启动和关闭

use super::{handlers, StatusAdapter, WebAppState};
use crate::error::ServerError;
use crate::health::Healthcheck;
use crate::status::Status;
use axum::http::StatusCode;
use axum::routing::any;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::instrument::WithSubscriber;
use tracing::{dispatcher, error, info, Dispatch};

const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_ROUTE: &str = "/health";

/// 监听目标
enum BindTarget {
    /// 启动时绑定的地址
    Address(String),
    /// 预先绑定好的监听器
    Listener(std::net::TcpListener),
}

/// Web服务器构建器
pub struct HealthServerBuilder {
    logger: Dispatch,
    healthcheck: Arc<Healthcheck>,
    bind: BindTarget,
    route: String,
    status_adapter: StatusAdapter,
    error: Option<ServerError>,
}

impl HealthServerBuilder {
    /// 设置服务器生命周期日志的接收者
    pub fn logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// 设置监听地址
    pub fn address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        if address.is_empty() {
            self.fail(ServerError::EmptyAddress);
        } else {
            self.bind = BindTarget::Address(address);
        }
        self
    }

    /// 使用预先绑定的监听器
    pub fn listener(mut self, listener: std::net::TcpListener) -> Self {
        self.bind = BindTarget::Listener(listener);
        self
    }

    /// 设置健康检查路由
    pub fn route(mut self, route: impl Into<String>) -> Self {
        let route = route.into();
        if !route.starts_with('/') {
            self.fail(ServerError::InvalidRoute(route));
        } else {
            self.route = route;
        }
        self
    }

    /// 设置自定义状态映射
    pub fn status_adapter<F>(mut self, adapter: F) -> Self
    where
        F: Fn(Status) -> (StatusCode, String) + Send + Sync + 'static,
    {
        self.status_adapter = Arc::new(adapter);
        self
    }

    /// 校验并构建服务器
    pub fn build(self) -> Result<HealthServer, ServerError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        Ok(HealthServer {
            logger: self.logger,
            state: WebAppState {
                healthcheck: self.healthcheck,
                status_adapter: self.status_adapter,
            },
            bind: Some(self.bind),
            route: self.route,
            shutdown_tx: None,
            task: None,
            local_addr: None,
        })
    }

    fn fail(&mut self, err: ServerError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// 健康检查 Web 服务器
pub struct HealthServer {
    /// 日志接收者
    logger: Dispatch,
    /// 应用状态
    state: WebAppState,
    /// 监听目标，启动后被取走
    bind: Option<BindTarget>,
    /// 健康检查路由
    route: String,
    /// 关闭信号发送器
    shutdown_tx: Option<broadcast::Sender<()>>,
    /// 服务任务
    task: Option<JoinHandle<()>>,
    /// 实际监听地址
    local_addr: Option<SocketAddr>,
}

impl HealthServer {
    /// 创建构建器
    pub fn builder(healthcheck: Arc<Healthcheck>) -> HealthServerBuilder {
        HealthServerBuilder {
            logger: dispatcher::get_default(Dispatch::clone),
            healthcheck,
            bind: BindTarget::Address(DEFAULT_ADDRESS.to_string()),
            route: DEFAULT_ROUTE.to_string(),
            status_adapter: Arc::new(handlers::default_status_adapter),
            error: None,
        }
    }

    /// 创建路由
    pub fn router(&self) -> Router {
        Router::new()
            .route(
                &self.route,
                any(handlers::health),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// 健康检查路由
    pub fn route(&self) -> &str {
        &self.route
    }

    /// 实际监听地址，启动后可用
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// 启动Web服务器
    ///
    /// 绑定监听地址后在后台任务中处理请求，立即返回实际监听地址。
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        let bind = self.bind.take().ok_or(ServerError::AlreadyStarted)?;

        let listener = match bind {
            BindTarget::Address(address) => match TcpListener::bind(address.as_str()).await {
                Ok(listener) => listener,
                Err(source) => return Err(ServerError::Bind { address, source }),
            },
            BindTarget::Listener(listener) => {
                listener.set_nonblocking(true)?;
                TcpListener::from_std(listener)?
            }
        };

        let addr = listener.local_addr()?;
        let router = self.router();
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(
            async move {
                let result = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_rx.recv().await;
                        info!("接收到关闭信号，正在关闭健康检查服务器...");
                    })
                    .await;

                if let Err(e) = result {
                    error!("健康检查服务器错误: {}", e);
                }
            }
            .with_subscriber(self.logger.clone()),
        );

        dispatcher::with_default(&self.logger, || {
            info!("健康检查服务器已启动: http://{}{}", addr, self.route);
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);
        self.local_addr = Some(addr);

        Ok(addr)
    }

    /// 关闭Web服务器并等待服务任务结束
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let result = task.await;
            dispatcher::with_default(&self.logger, || match result {
                Ok(()) => info!("健康检查服务器已关闭"),
                Err(e) => error!("关闭健康检查服务器失败: {}", e),
            });
        }
    }
}
