//! 健康检查聚合引擎
//!
//! 并发执行所有探针，按两个时间阈值对每个探针分级，再取最严重的状态

use crate::context::CheckContext;
use crate::health::builder::HealthcheckBuilder;
use crate::probe::Probe;
use crate::status::Status;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::instrument::WithSubscriber;
use tracing::{error, warn, Dispatch};

/// 探针分级阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// 超过此时长视为降级
    pub degraded: Duration,
    /// 超过此时长视为不健康，同时也是探针上下文的超时
    pub unhealthy: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            degraded: Duration::from_secs(1),
            unhealthy: Duration::from_secs(10),
        }
    }
}

/// 健康检查引擎
///
/// 构建完成后不可变，可以在多个并发请求之间共享。
pub struct Healthcheck {
    logger: Dispatch,
    probes: HashMap<String, Arc<dyn Probe>>,
    thresholds: Thresholds,
}

impl Healthcheck {
    /// 创建构建器
    pub fn builder() -> HealthcheckBuilder {
        HealthcheckBuilder::new()
    }

    pub(crate) fn from_parts(
        logger: Dispatch,
        probes: HashMap<String, Arc<dyn Probe>>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            logger,
            probes,
            thresholds,
        }
    }

    /// 分级阈值
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// 已注册探针数量
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// 已注册探针名称（无序）
    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.keys().map(String::as_str).collect()
    }

    /// 执行一次健康检查
    ///
    /// 没有探针或上下文在入口处已结束时返回 `Status::Unknown`，不会执行任何探针。
    /// 否则等待所有探针完成后返回最严重的状态。
    ///
    /// # 参数
    /// * `ctx` - 调用方上下文，取消信号会传递给每个探针
    ///
    /// # 返回
    /// * `Status` - 聚合后的状态
    pub async fn handle(&self, ctx: &CheckContext) -> Status {
        if self.probes.is_empty() {
            return Status::Unknown;
        }

        if ctx.is_done() {
            return Status::Unknown;
        }

        let mut tasks = JoinSet::new();
        for (name, probe) in &self.probes {
            let name = name.clone();
            let probe = Arc::clone(probe);
            let probe_ctx = ctx.child_with_timeout(self.thresholds.unhealthy);
            let thresholds = self.thresholds;

            tasks.spawn(
                run_probe(name, probe, probe_ctx, thresholds).with_subscriber(self.logger.clone()),
            );
        }

        // 慢探针也要等到结束，不提前返回
        let mut statuses = Vec::with_capacity(self.probes.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    tracing::dispatcher::with_default(&self.logger, || {
                        error!(error = %e, "探针任务异常退出");
                    });
                    statuses.push(Status::Unhealthy);
                }
            }
        }

        reduce(statuses)
    }
}

impl std::fmt::Debug for Healthcheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Healthcheck")
            .field("probes", &self.probe_names())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

/// 在单独的任务中执行一个探针，panic 被限制在此边界内
async fn run_probe(
    name: String,
    probe: Arc<dyn Probe>,
    ctx: CheckContext,
    thresholds: Thresholds,
) -> Status {
    let started = Instant::now();
    let outcome = AssertUnwindSafe(probe.check(&ctx)).catch_unwind().await;
    let elapsed = started.elapsed();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(panic) => {
            error!(
                probe = %name,
                panic = %panic_message(panic.as_ref()),
                "探针发生panic"
            );
            return Status::Unhealthy;
        }
    };

    let status = classify(&outcome, elapsed, &thresholds);
    match status {
        Status::Unhealthy => {
            let reason = match &outcome {
                Err(e) => format!("{e:#}"),
                Ok(()) => "超过不健康阈值".to_string(),
            };
            error!(
                probe = %name,
                error = %reason,
                duration = ?elapsed,
                "探针检查失败"
            );
        }
        Status::Degraded => {
            warn!(probe = %name, duration = ?elapsed, "探针响应降级");
        }
        _ => {}
    }

    status
}

/// 对单个探针的结果分级
///
/// 按顺序判断：失败或超过不健康阈值为 `Unhealthy`；
/// 超过降级阈值为 `Degraded`；其余为 `Healthy`。
pub fn classify(outcome: &anyhow::Result<()>, elapsed: Duration, thresholds: &Thresholds) -> Status {
    if outcome.is_err() || elapsed > thresholds.unhealthy {
        return Status::Unhealthy;
    }

    if elapsed > thresholds.degraded {
        return Status::Degraded;
    }

    Status::Healthy
}

/// 取所有状态中最严重的一个，以 `Healthy` 为起点
///
/// 遇到 `Unhealthy` 立即结束。
pub fn reduce<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut status = Status::Healthy;
    for s in statuses {
        status = status.worst(s);
        if status == Status::Unhealthy {
            break;
        }
    }
    status
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(degraded_ms: u64, unhealthy_ms: u64) -> Thresholds {
        Thresholds {
            degraded: Duration::from_millis(degraded_ms),
            unhealthy: Duration::from_millis(unhealthy_ms),
        }
    }

    #[test]
    fn test_classify_healthy() {
        let t = thresholds(10, 20);
        assert_eq!(classify(&Ok(()), Duration::from_millis(5), &t), Status::Healthy);
        // 恰好等于阈值不算超过
        assert_eq!(classify(&Ok(()), Duration::from_millis(10), &t), Status::Healthy);
    }

    #[test]
    fn test_classify_degraded() {
        let t = thresholds(10, 20);
        assert_eq!(classify(&Ok(()), Duration::from_millis(11), &t), Status::Degraded);
        assert_eq!(classify(&Ok(()), Duration::from_millis(20), &t), Status::Degraded);
    }

    #[test]
    fn test_classify_unhealthy() {
        let t = thresholds(10, 20);
        assert_eq!(classify(&Ok(()), Duration::from_millis(21), &t), Status::Unhealthy);
        assert_eq!(
            classify(&Err(anyhow::anyhow!("boom")), Duration::from_millis(1), &t),
            Status::Unhealthy
        );
        assert_eq!(
            classify(&Err(anyhow::anyhow!("boom")), Duration::from_millis(15), &t),
            Status::Unhealthy
        );
    }

    #[test]
    fn test_reduce_takes_worst() {
        use Status::*;
        assert_eq!(reduce([Healthy, Degraded, Healthy]), Degraded);
        assert_eq!(reduce([Healthy, Healthy]), Healthy);
        assert_eq!(reduce([Unhealthy, Degraded]), Unhealthy);
        assert_eq!(reduce([Degraded, Healthy, Unhealthy]), Unhealthy);
        assert_eq!(reduce([Healthy, Healthy, Degraded]), Degraded);
    }

    #[test]
    fn test_reduce_empty_is_healthy() {
        assert_eq!(reduce(std::iter::empty()), Status::Healthy);
    }

    #[test]
    fn test_reduce_order_independent() {
        use Status::*;
        let set = [Healthy, Degraded, Healthy, Degraded];
        let mut rev = set;
        rev.reverse();
        assert_eq!(reduce(set), reduce(rev));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("probe panic");
        assert_eq!(panic_message(payload.as_ref()), "probe panic");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
