//! 配置数据结构定义
//!
//! 定义配置文件结构体，并将其转换为健康检查构建器

use crate::error::ConfigError;
use crate::health::{Healthcheck, HealthcheckBuilder};
use crate::probes::{HttpProbe, TcpProbe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HealthcheckConfig {
    /// 分级阈值
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    /// HTTP 服务配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 探针列表
    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

/// 阈值配置（毫秒）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdsConfig {
    /// 降级阈值
    #[serde(default = "default_degraded_ms")]
    pub degraded_ms: u64,
    /// 不健康阈值
    #[serde(default = "default_unhealthy_ms")]
    pub unhealthy_ms: u64,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_address")]
    pub address: String,
    /// 健康检查路由
    #[serde(default = "default_route")]
    pub route: String,
}

/// 单个探针配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
    /// 探针名称
    pub name: String,
    /// 探针类型及参数
    #[serde(flatten)]
    pub target: ProbeTarget,
}

/// 探针类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProbeTarget {
    /// HTTP端点
    Http {
        url: String,
        #[serde(default = "default_method")]
        method: String,
        #[serde(default = "default_expected_status_codes")]
        expected_status_codes: Vec<u16>,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    /// TCP端口
    Tcp { address: String },
}

// 默认值函数
fn default_degraded_ms() -> u64 {
    1000
}
fn default_unhealthy_ms() -> u64 {
    10_000
}
fn default_address() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_route() -> String {
    "/health".to_string()
}
fn default_method() -> String {
    "GET".to_string()
}
fn default_expected_status_codes() -> Vec<u16> {
    vec![200]
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            degraded_ms: default_degraded_ms(),
            unhealthy_ms: default_unhealthy_ms(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            route: default_route(),
        }
    }
}

impl HealthcheckConfig {
    /// 转换为健康检查构建器
    ///
    /// 阈值、探针名称等校验留给构建器的 `build()`。
    pub fn to_builder(&self) -> Result<HealthcheckBuilder, ConfigError> {
        let mut builder = Healthcheck::builder()
            .timeout_degraded(Duration::from_millis(self.thresholds.degraded_ms))
            .timeout_unhealthy(Duration::from_millis(self.thresholds.unhealthy_ms));

        for probe in &self.probes {
            builder = match &probe.target {
                ProbeTarget::Http {
                    url,
                    method,
                    expected_status_codes,
                    headers,
                } => {
                    let invalid = |e: anyhow::Error| ConfigError::InvalidProbe {
                        name: probe.name.clone(),
                        reason: e.to_string(),
                    };
                    let mut http = HttpProbe::new(url.as_str())
                        .and_then(|p| p.with_method(method))
                        .map_err(invalid)?
                        .with_expected_status_codes(expected_status_codes.clone());
                    for (key, value) in headers {
                        http = http.with_header(key, value);
                    }
                    builder.probe(probe.name.as_str(), http)
                }
                ProbeTarget::Tcp { address } => {
                    builder.probe(probe.name.as_str(), TcpProbe::new(address.as_str()))
                }
            };
        }

        Ok(builder)
    }

    /// 构建健康检查实例
    pub fn build_healthcheck(&self) -> Result<Healthcheck, ConfigError> {
        self.to_builder()?.build()
    }
}
