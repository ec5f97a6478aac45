//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。探针执行失败不属于这里的错误：
//! 它们只会被折算为健康状态，不会向调用方传播。

use std::time::Duration;
use thiserror::Error;

/// 健康检查库的主要错误类型
#[derive(Error, Debug)]
pub enum HealthcheckError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// HTTP 服务相关错误
    #[error("服务器错误: {0}")]
    Server(#[from] ServerError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
///
/// 全部在构建阶段同步检测，运行期不会出现。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 降级阈值必须严格小于不健康阈值
    #[error("降级超时 {degraded:?} 必须小于不健康超时 {unhealthy:?}")]
    ThresholdOrder {
        degraded: Duration,
        unhealthy: Duration,
    },

    /// 超时必须大于零
    #[error("{which} 超时必须大于零")]
    NonPositiveTimeout { which: &'static str },

    /// 探针名称重复
    #[error("探针 '{name}' 已经注册")]
    DuplicateProbe { name: String },

    /// 探针定义无效
    #[error("探针 '{name}' 无效: {reason}")]
    InvalidProbe { name: String, reason: String },

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    Parse(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVar { var: String },
}

/// HTTP 服务错误类型
#[derive(Error, Debug)]
pub enum ServerError {
    /// 监听地址为空
    #[error("监听地址不能为空")]
    EmptyAddress,

    /// 路由格式无效
    #[error("路由格式无效: '{0}'，必须以 '/' 开头")]
    InvalidRoute(String),

    /// 绑定监听端口失败
    #[error("绑定监听地址失败 {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// 服务已经启动
    #[error("服务器已经启动")]
    AlreadyStarted,

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, HealthcheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DuplicateProbe {
            name: "db".to_string(),
        };
        assert!(err.to_string().contains("'db'"));

        let err = ConfigError::ThresholdOrder {
            degraded: Duration::from_secs(5),
            unhealthy: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_error_conversion() {
        let err: HealthcheckError = ConfigError::Parse("bad".to_string()).into();
        assert!(matches!(err, HealthcheckError::Config(ConfigError::Parse(_))));

        let err: HealthcheckError = ServerError::EmptyAddress.into();
        assert!(matches!(err, HealthcheckError::Server(ServerError::EmptyAddress)));
    }
}
