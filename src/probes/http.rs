//! HTTP探针实现
//!
//! 发送HTTP请求并校验响应状态码，请求与上下文结束信号竞争

use crate::context::CheckContext;
use crate::probe::Probe;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::str::FromStr;

/// HTTP探针
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// HTTP客户端
    client: Client,
    /// 请求URL
    url: String,
    /// HTTP方法
    method: Method,
    /// 期望的状态码列表
    expected_status_codes: Vec<u16>,
    /// 请求头
    headers: HashMap<String, String>,
}

impl HttpProbe {
    /// 创建GET请求、期望200的HTTP探针
    ///
    /// # 参数
    /// * `url` - 请求URL
    ///
    /// # 返回
    /// * `anyhow::Result<Self>` - 探针实例
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .context("创建HTTP客户端失败")?;

        Ok(Self {
            client,
            url: url.into(),
            method: Method::GET,
            expected_status_codes: vec![200],
            headers: HashMap::new(),
        })
    }

    /// 设置HTTP方法
    pub fn with_method(mut self, method: &str) -> anyhow::Result<Self> {
        self.method = Method::from_str(&method.to_uppercase())
            .map_err(|_| anyhow!("无效的HTTP方法: {}", method))?;
        Ok(self)
    }

    /// 设置期望的状态码
    pub fn with_expected_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.expected_status_codes = codes;
        self
    }

    /// 添加请求头
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// 请求URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn validate_status_code(&self, status_code: u16) -> bool {
        self.expected_status_codes.contains(&status_code)
    }

    fn build_request(&self) -> reqwest::RequestBuilder {
        let mut request = self.client.request(self.method.clone(), &self.url);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        request
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self, ctx: &CheckContext) -> anyhow::Result<()> {
        let mut request = self.build_request();
        if let Some(remaining) = ctx.remaining() {
            request = request.timeout(remaining);
        }

        let response = tokio::select! {
            _ = ctx.done() => bail!("请求在上下文结束前未完成: {}", self.url),
            response = request.send() => response.map_err(|e| anyhow!(format_request_error(&e)))?,
        };

        let status = response.status();
        if !self.validate_status_code(status.as_u16()) {
            bail!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
        }

        Ok(())
    }
}

/// 格式化请求错误信息
fn format_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_request() {
        "Invalid request".to_string()
    } else if error.is_decode() {
        "Response decode error".to_string()
    } else {
        format!("Request failed: {}", error)
    }
}
