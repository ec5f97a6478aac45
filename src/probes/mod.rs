//! 内置探针
//!
//! HTTP端点探针和TCP连接探针

pub mod http;
pub mod tcp;

pub use http::HttpProbe;
pub use tcp::TcpProbe;
