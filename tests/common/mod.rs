//! 测试公共工具

use opteck_client::{Credentials, OpteckClient};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub const AFFILIATE_ID: u64 = 1234;
pub const PARTNER_ID: &str = "test-partner";

/// 初始化测试日志，RUST_LOG 可覆盖默认级别
///
/// 多个测试共用一个全局 subscriber，重复初始化直接忽略
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("opteck_client=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// 启动 mock 服务器
pub async fn setup_mock_server() -> MockServer {
    init_tracing();
    MockServer::start().await
}

/// 指向 mock 服务器的客户端
pub fn mock_client(server: &MockServer) -> OpteckClient {
    let config = opteck_client::ClientConfig::with_base_url(&format!("{}/v1", server.uri()));
    OpteckClient::with_config(Credentials::new(AFFILIATE_ID, PARTNER_ID), config)
        .expect("client should build")
}

/// 解析请求体中的表单字段 (保持顺序)
pub fn form_fields(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

/// 表单字段值
#[allow(dead_code)]
pub fn form_value(body: &[u8], key: &str) -> Option<String> {
    form_fields(body)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// 成功响应
#[allow(dead_code)]
pub fn ok_body(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "returnCode": 1,
        "description": "Successful call",
        "timestampGenerated": "2016-04-22T15:54:56+03:00",
        "data": data,
    })
}
