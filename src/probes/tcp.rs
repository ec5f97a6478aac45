//! TCP连接探针

use crate::context::CheckContext;
use crate::probe::Probe;
use anyhow::{bail, Context};
use async_trait::async_trait;
use tokio::net::TcpStream;

/// TCP连接探针，能建立连接即视为成功
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
}

impl TcpProbe {
    /// 创建TCP探针
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// 目标地址
    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self, ctx: &CheckContext) -> anyhow::Result<()> {
        tokio::select! {
            _ = ctx.done() => bail!("连接 {} 在上下文结束前未完成", self.address),
            stream = TcpStream::connect(&self.address) => {
                stream.with_context(|| format!("连接 {} 失败", self.address))?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_probe_connects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = TcpProbe::new(addr.to_string());
        assert!(probe.check(&CheckContext::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_tcp_probe_refused() {
        // 先绑定再释放，得到一个确定没有监听的端口
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = TcpProbe::new(addr.to_string());
        let err = probe.check(&CheckContext::new()).await.unwrap_err();
        assert!(err.to_string().contains(&addr.to_string()));
    }

    #[tokio::test]
    async fn test_tcp_probe_cancelled() {
        let ctx = CheckContext::new();
        ctx.cancel();

        let probe = TcpProbe::new("10.255.255.1:81");
        assert!(probe.check(&ctx).await.is_err());
    }
}
