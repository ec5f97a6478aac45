//! 健康检查构建器
//!
//! 按调用顺序应用配置项，在 `build()` 时统一校验

use crate::context::CheckContext;
use crate::error::ConfigError;
use crate::health::checker::{Healthcheck, Thresholds};
use crate::probe::{probe_fn, Probe};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Dispatch;

/// 健康检查构建器
///
/// 默认值：降级阈值 1 秒，不健康阈值 10 秒，没有探针，
/// 日志输出到创建构建器时的当前 tracing 分发器。
pub struct HealthcheckBuilder {
    logger: Dispatch,
    probes: HashMap<String, Arc<dyn Probe>>,
    thresholds: Thresholds,
    error: Option<ConfigError>,
}

impl HealthcheckBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            logger: tracing::dispatcher::get_default(Dispatch::clone),
            probes: HashMap::new(),
            thresholds: Thresholds::default(),
            error: None,
        }
    }

    /// 设置日志分发器
    pub fn logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// 注册探针
    pub fn probe(self, name: impl Into<String>, probe: impl Probe + 'static) -> Self {
        self.probe_arc(name, Arc::new(probe))
    }

    /// 注册已共享的探针
    pub fn probe_arc(mut self, name: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        let name = name.into();
        if self.probes.contains_key(&name) {
            self.fail(ConfigError::DuplicateProbe { name });
        } else {
            self.probes.insert(name, probe);
        }
        self
    }

    /// 用闭包注册探针
    pub fn probe_fn<F, Fut>(self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(CheckContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.probe(name, probe_fn(check))
    }

    /// 设置降级阈值
    pub fn timeout_degraded(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            self.fail(ConfigError::NonPositiveTimeout { which: "degraded" });
        } else {
            self.thresholds.degraded = timeout;
        }
        self
    }

    /// 设置不健康阈值
    pub fn timeout_unhealthy(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            self.fail(ConfigError::NonPositiveTimeout { which: "unhealthy" });
        } else {
            self.thresholds.unhealthy = timeout;
        }
        self
    }

    /// 校验并构建健康检查实例
    ///
    /// # 返回
    /// * `Result<Healthcheck, ConfigError>` - 第一个配置错误，或构建好的实例
    pub fn build(self) -> Result<Healthcheck, ConfigError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        if self.thresholds.degraded >= self.thresholds.unhealthy {
            return Err(ConfigError::ThresholdOrder {
                degraded: self.thresholds.degraded,
                unhealthy: self.thresholds.unhealthy,
            });
        }

        Ok(Healthcheck::from_parts(
            self.logger,
            self.probes,
            self.thresholds,
        ))
    }

    fn fail(&mut self, err: ConfigError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl Default for HealthcheckBuilder {
    fn default() -> Self {
        Self::new()
    }
}
