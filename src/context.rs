//! 探针执行上下文
//!
//! 可取消、可带截止时间的上下文，由调用方传入健康检查，再派生给每个探针

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// 执行上下文
///
/// 取消信号沿父子关系向下传播：父上下文取消后，所有子上下文同时结束。
/// 截止时间取父上下文与自身超时中较早的一个。
#[derive(Debug, Clone)]
pub struct CheckContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CheckContext {
    /// 创建永不过期的根上下文
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// 创建带超时的根上下文
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// 创建带截止时间的根上下文
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// 派生子上下文，截止时间不会晚于父上下文
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let own = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < own => parent,
            _ => own,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// 取消上下文及其所有子上下文
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// 是否已被显式取消
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 是否已经结束（取消或超过截止时间）
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// 截止时间
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 距离截止时间的剩余时长
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// 等待上下文结束
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// 返回一个守卫，被丢弃时取消此上下文
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}

impl Default for CheckContext {
    fn default() -> Self {
        Self::new()
    }
}
