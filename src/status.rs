//! 健康状态类型
//!
//! 三个有序的严重级别加一个“无结论”哨兵值

use serde::{Deserialize, Serialize};

/// 聚合后的健康状态
///
/// `Healthy < Degraded < Unhealthy`。`Unknown` 不参与归约，只在没有注册探针
/// 或调用方上下文在入口处已经结束时作为最终结果返回。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// 状态未知
    Unknown,
    /// 健康
    Healthy,
    /// 降级，功能可用但响应变慢
    Degraded,
    /// 不健康
    Unhealthy,
}

impl Status {
    /// 整数表示，跨版本保持稳定
    pub fn as_i32(self) -> i32 {
        match self {
            Status::Unknown => -1,
            Status::Healthy => 0,
            Status::Degraded => 1,
            Status::Unhealthy => 2,
        }
    }

    /// 文本表示
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Healthy => "healthy",
            Status::Degraded => "degraded",
            Status::Unhealthy => "unhealthy",
            Status::Unknown => "unknown",
        }
    }

    /// 归约时使用的严重级别，`Unknown` 没有级别
    pub fn severity(self) -> Option<u8> {
        match self {
            Status::Healthy => Some(0),
            Status::Degraded => Some(1),
            Status::Unhealthy => Some(2),
            Status::Unknown => None,
        }
    }

    /// 判断状态是否可以对外提供服务
    pub fn is_serving(self) -> bool {
        matches!(self, Status::Healthy | Status::Degraded)
    }

    /// 取两个状态中更严重的一个；`Unknown` 永远不会胜出
    pub fn worst(self, other: Status) -> Status {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) if b > a => other,
            (None, Some(_)) => other,
            _ => self,
        }
    }
}

impl From<i32> for Status {
    fn from(value: i32) -> Self {
        match value {
            0 => Status::Healthy,
            1 => Status::Degraded,
            2 => Status::Unhealthy,
            _ => Status::Unknown,
        }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.as_i32()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
