//! 探针接口定义
//!
//! 探针是一个具名的检查单元：给定上下文，返回成功或描述性的失败

use crate::context::CheckContext;
use async_trait::async_trait;
use std::future::Future;

/// 健康探针trait，定义检测接口
#[async_trait]
pub trait Probe: Send + Sync {
    /// 执行一次检查
    ///
    /// # 参数
    /// * `ctx` - 执行上下文，结束后应尽快返回
    ///
    /// # 返回
    /// * `anyhow::Result<()>` - 成功或失败原因
    async fn check(&self, ctx: &CheckContext) -> anyhow::Result<()>;
}

/// 基于闭包的探针
pub struct FnProbe<F> {
    check: F,
}

impl<F> FnProbe<F> {
    /// 用闭包创建探针
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn(CheckContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn check(&self, ctx: &CheckContext) -> anyhow::Result<()> {
        (self.check)(ctx.clone()).await
    }
}

/// 将闭包包装为探针
pub fn probe_fn<F, Fut>(check: F) -> FnProbe<F>
where
    F: Fn(CheckContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnProbe::new(check)
}
