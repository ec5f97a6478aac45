//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和错误处理功能

use crate::config::types::HealthcheckConfig;
use crate::error::ConfigError;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<HealthcheckConfig, ConfigError>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(
        &self,
        path: P,
    ) -> Result<HealthcheckConfig, ConfigError>;

    /// 从字符串加载配置
    fn load_from_string(&self, content: &str) -> Result<HealthcheckConfig, ConfigError>;

    /// 验证配置
    fn validate(&self, config: &HealthcheckConfig) -> Result<(), ConfigError>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用 `${VAR}` 环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::Parse(format!("正则表达式错误: {}", e)))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ConfigError::EnvVar {
                        var: var_name.to_string(),
                    });
                }
            }
        }

        Ok(result)
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<HealthcheckConfig, ConfigError> {
        let processed_content = self.substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| ConfigError::Parse(format!("TOML解析失败: {}", e)))
    }
}

impl Default for TomlConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(
        &self,
        path: P,
    ) -> Result<HealthcheckConfig, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Parse(format!("读取文件失败: {}", e)))?;

        let config = self.load_from_string(&content)?;

        tracing::info!("成功加载配置文件: {}", path.display());
        tracing::debug!("配置内容: {:?}", config);

        Ok(config)
    }

    fn load_from_string(&self, content: &str) -> Result<HealthcheckConfig, ConfigError> {
        let config = self.parse_toml(content)?;
        self.validate(&config)?;
        Ok(config)
    }

    fn validate(&self, config: &HealthcheckConfig) -> Result<(), ConfigError> {
        if config.server.address.is_empty() {
            return Err(ConfigError::Parse("监听地址不能为空".to_string()));
        }

        if !config.server.route.starts_with('/') {
            return Err(ConfigError::Parse(format!(
                "路由格式无效: {}",
                config.server.route
            )));
        }

        // 阈值顺序、探针重名等规则由构建器统一校验
        config.build_healthcheck().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    const TEST_CONFIG_TOML: &str = r#"
[thresholds]
degraded_ms = 200
unhealthy_ms = 2000

[server]
address = "127.0.0.1:9000"
route = "/healthz"

[[probes]]
name = "api"
kind = "http"
url = "http://localhost:3000/ping"
expected_status_codes = [200, 204]

[[probes]]
name = "db"
kind = "tcp"
address = "127.0.0.1:5432"
"#;

    #[test]
    fn test_toml_parsing() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(TEST_CONFIG_TOML).unwrap();

        assert_eq!(config.thresholds.degraded_ms, 200);
        assert_eq!(config.thresholds.unhealthy_ms, 2000);
        assert_eq!(config.server.address, "127.0.0.1:9000");
        assert_eq!(config.server.route, "/healthz");
        assert_eq!(config.probes.len(), 2);
        assert_eq!(config.probes[0].name, "api");
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("HEALTHCHECK_TEST_DB_ADDR", "10.0.0.5:5432");

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(
                r#"
[[probes]]
name = "db"
kind = "tcp"
address = "${HEALTHCHECK_TEST_DB_ADDR}"
"#,
            )
            .unwrap();

        assert_eq!(
            config.probes[0].target,
            crate::config::types::ProbeTarget::Tcp {
                address: "10.0.0.5:5432".to_string()
            }
        );

        env::remove_var("HEALTHCHECK_TEST_DB_ADDR");
    }

    #[test]
    fn test_env_var_substitution_missing_var() {
        let loader = TomlConfigLoader::new(true);
        let result = loader.load_from_string(
            r#"
[[probes]]
name = "db"
kind = "tcp"
address = "${HEALTHCHECK_TEST_MISSING_VAR}"
"#,
        );

        assert_eq!(
            result.err(),
            Some(ConfigError::EnvVar {
                var: "HEALTHCHECK_TEST_MISSING_VAR".to_string()
            })
        );
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_invalid_toml() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("[thresholds\ndegraded_ms = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_duplicate_probe_names_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string(
            r#"
[[probes]]
name = "db"
kind = "tcp"
address = "127.0.0.1:5432"

[[probes]]
name = "db"
kind = "tcp"
address = "127.0.0.1:5433"
"#,
        );

        assert_eq!(
            result.err(),
            Some(ConfigError::DuplicateProbe {
                name: "db".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_route_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("[server]\nroute = \"health\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TEST_CONFIG_TOML.as_bytes()).unwrap();

        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_file(file.path()).await.unwrap();
        assert_eq!(config.probes.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_file(&path).await;
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }
}
