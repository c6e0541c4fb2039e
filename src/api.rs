//! HTTP 传输层 - 发送表单 POST 请求

use crate::error::{OpteckError, Result};
use crate::protocol::{DEFAULT_BASE_URL, USER_AGENT};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// 请求超时
    pub timeout: Duration,
    /// 连接超时
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// 使用自定义基础 URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }
}

/// 表单 POST 传输
///
/// body 已经是编码好的 `application/x-www-form-urlencoded` 字符串，实现方不得重新编码
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送请求并返回响应体，非 2xx 返回 `OpteckError::Transport`
    async fn post_form(&self, url: &str, body: String) -> Result<String>;
}

/// 基于 reqwest 的传输实现
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// 创建新的传输
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// 使用已有的 reqwest 客户端
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, body: String) -> Result<String> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("POST {} failed: HTTP {}", url, status);
            return Err(OpteckError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.optaffiliates.com/v1");
        assert_eq!(config.user_agent, "Opteck API Client");
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_post_form_sends_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/trade/getMarkets"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(header("user-agent", "Opteck API Client"))
            .and(body_string("affiliateID=1&checksum=ABC"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"returnCode":1}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let body = transport
            .post_form(
                &format!("{}/v1/trade/getMarkets", server.uri()),
                "affiliateID=1&checksum=ABC".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(body, r#"{"returnCode":1}"#);
    }

    #[tokio::test]
    async fn test_post_form_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&ClientConfig::default()).unwrap();
        let err = transport
            .post_form(&format!("{}/v1/trade/auth", server.uri()), String::new())
            .await
            .unwrap_err();
        match err {
            OpteckError::Transport { status, reason } => {
                assert_eq!(status, 403);
                assert_eq!(reason, "Forbidden");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
