//! Opteck Affiliate API Client Library
//!
//! Opteck 二元期权 affiliate REST API 的 Rust 客户端库
//!
//! # 功能
//! - 请求签名 (checksum)
//! - 响应解析和错误分类
//! - 用户注册、登录、入金和交易记录查询
//! - 市场、品种、期权定义和报价查询
//! - 一步开仓 (`open_position`)
//!
//! # 示例
//! ```no_run
//! use opteck_client::{Credentials, Direction, OpteckClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpteckClient::new(Credentials::new(1234, "partner-id"))?;
//!
//!     // 开仓
//!     let confirmation = client
//!         .open_position("john@example.com", "password", "EURUSD", Direction::Call, 25.0)
//!         .await?;
//!     println!("{:?}", confirmation);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod crypto;
pub mod error;
pub mod params;
pub mod payload;
pub mod protocol;
pub mod responses;
pub mod serde_util;
pub mod types;

pub use api::{ClientConfig, HttpTransport, Transport};
pub use client::{date_param, OpteckClient};
pub use crypto::ChecksumSigner;
pub use error::{ErrorKind, OpteckError, Result};
pub use params::{FormParams, SignedForm};
pub use payload::{FailurePayload, Payload, SuccessPayload};
pub use protocol::{is_forbidden_country, Direction, Endpoint, FORBIDDEN_COUNTRIES};
pub use responses::FromPayload;
pub use types::*;

/// API 凭证
#[derive(Clone)]
pub struct Credentials {
    /// 合作方 ID，每个请求都会发送
    pub affiliate_id: u64,
    /// 合作方密钥，只用于计算 checksum
    pub partner_id: String,
}

impl Credentials {
    pub fn new(affiliate_id: u64, partner_id: impl Into<String>) -> Self {
        Self {
            affiliate_id,
            partner_id: partner_id.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("affiliate_id", &self.affiliate_id)
            .field("partner_id", &"***")
            .finish()
    }
}
