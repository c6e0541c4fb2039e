//! Opteck Affiliate API 客户端

use crate::api::{ClientConfig, HttpTransport, Transport};
use crate::crypto::ChecksumSigner;
use crate::error::{OpteckError, Result};
use crate::params::FormParams;
use crate::payload::Payload;
use crate::protocol::{Direction, Endpoint, FORBIDDEN_COUNTRIES};
use crate::responses::FromPayload;
use crate::types::{
    normalize_symbol, validate_amount, Asset, AssetRate, AuthToken, CreateLeadRequest, Definition,
    Deposit, GetDefinitionsRequest, LeadCreated, LeadDetails, Market, OptionType, TradeAction,
    TradeConfirmation, TradeRequest,
};
use crate::Credentials;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// 交易记录默认查询最近 7 天
const DEFAULT_TRADE_ACTIONS_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Opteck API 客户端
///
/// 除了不可变的凭证外没有可变状态，可以在多个任务间共享
#[derive(Clone)]
pub struct OpteckClient {
    affiliate_id: u64,
    signer: ChecksumSigner,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl OpteckClient {
    /// 使用默认配置创建客户端
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// 使用自定义配置创建客户端
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(
            credentials,
            &config.base_url,
            Arc::new(transport),
        ))
    }

    /// 使用自定义传输创建客户端
    pub fn with_transport(
        credentials: Credentials,
        base_url: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            affiliate_id: credentials.affiliate_id,
            signer: ChecksumSigner::new(credentials.partner_id),
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn affiliate_id(&self) -> u64 {
        self.affiliate_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 禁止注册的国家
    pub fn forbidden_countries(&self) -> &'static [&'static str] {
        FORBIDDEN_COUNTRIES
    }

    /// 注册新用户
    pub async fn create_lead(&self, request: &CreateLeadRequest) -> Result<LeadCreated> {
        let mut params = self.params();
        params
            .push("email", &request.email)
            .push("firstName", &request.first_name)
            .push("lastName", &request.last_name)
            .push("phone", &request.phone)
            .push_opt("password", request.password.as_deref())
            .push("language", &request.language)
            .push("country", &request.country)
            .push_opt("ip", request.ip.as_deref())
            .push_opt("campaign", request.campaign.as_deref())
            .push_opt("subcampaign", request.subcampaign.as_deref())
            .push_opt("comment", request.comment.as_deref())
            .push_opt("marker", request.marker.as_deref());

        let lead: LeadCreated = self.call(Endpoint::CreateLead, params).await?;
        tracing::info!("Lead created: lead_id={}", lead.lead_id);
        Ok(lead)
    }

    /// 登录，返回下单所需的 token 和用户信息
    pub async fn auth(&self, email: &str, password: &str) -> Result<AuthToken> {
        let mut params = self.params();
        params.push("email", email).push("password", password);

        self.call(Endpoint::Auth, params).await
    }

    /// 获取用户详情
    pub async fn get_lead_details(&self, email: &str) -> Result<LeadDetails> {
        let mut params = self.params();
        params.push("email", email);

        self.call(Endpoint::GetLeadDetails, params).await
    }

    /// 获取时间范围内的入金记录
    ///
    /// # 参数
    /// - `from_timestamp`: 开始时间 (Unix 时间戳)
    /// - `to_timestamp`: 结束时间，None 为当前时间
    pub async fn get_deposits(
        &self,
        from_timestamp: i64,
        to_timestamp: Option<i64>,
    ) -> Result<Vec<Deposit>> {
        let to_timestamp = to_timestamp.unwrap_or_else(|| Utc::now().timestamp());

        let mut params = self.params();
        params
            .push("dateFrom", date_param(from_timestamp)?)
            .push("dateTo", date_param(to_timestamp)?);

        self.call(Endpoint::GetDeposits, params).await
    }

    /// 获取期权类型，`option_type_id` 为 None 或 0 时返回全部
    pub async fn get_option_types(&self, option_type_id: Option<u64>) -> Result<Vec<OptionType>> {
        let mut params = self.params();
        params.push_id("optionTypeID", option_type_id);

        self.call(Endpoint::GetOptionTypes, params).await
    }

    /// 获取市场列表
    pub async fn get_markets(&self) -> Result<Vec<Market>> {
        self.call(Endpoint::GetMarkets, self.params()).await
    }

    /// 获取品种列表，可按市场或品种过滤
    pub async fn get_assets(
        &self,
        market_id: Option<u64>,
        asset_id: Option<u64>,
    ) -> Result<Vec<Asset>> {
        let mut params = self.params();
        params
            .push_id("marketID", market_id)
            .push_id("assetID", asset_id);

        self.call(Endpoint::GetAssets, params).await
    }

    /// 获取期权定义
    pub async fn get_definitions(&self, request: &GetDefinitionsRequest) -> Result<Vec<Definition>> {
        let mut params = self.params();
        params.push_id("assetID", request.asset_id);
        if let Some(is_active) = request.is_active {
            params.push_bool("isActive", is_active);
        }
        params.push_id("optionTypeID", request.option_type_id);

        self.call(Endpoint::GetDefinitions, params).await
    }

    /// 获取品种当前报价
    pub async fn get_asset_rate(&self, asset_id: u64) -> Result<AssetRate> {
        let mut params = self.params();
        params.push("assetID", asset_id);

        self.call(Endpoint::GetRate, params).await
    }

    /// 下单
    pub async fn trade(&self, request: &TradeRequest) -> Result<TradeConfirmation> {
        let mut params = self.params();
        params
            .push("token", &request.token)
            .push("timestamp", &request.timestamp)
            .push("microtime", &request.microtime)
            .push("definitionID", request.definition_id)
            .push("strike", &request.strike)
            .push("amount", request.amount)
            .push("direction", request.direction.as_i8());

        let confirmation: TradeConfirmation = self.call(Endpoint::TradeAction, params).await?;
        tracing::info!(
            "Trade accepted: definition_id={}, direction={:?}, amount={}, id={:?}",
            request.definition_id,
            request.direction,
            request.amount,
            confirmation.id
        );
        Ok(confirmation)
    }

    /// 获取用户的交易记录 (持仓和已平仓)
    ///
    /// # 参数
    /// - `time_from`: 开始时间，None 为 7 天前
    /// - `time_to`: 结束时间，None 为当前时间
    pub async fn get_trade_actions(
        &self,
        email: &str,
        time_from: Option<i64>,
        time_to: Option<i64>,
    ) -> Result<Vec<TradeAction>> {
        let now = Utc::now().timestamp();
        let time_from = time_from.unwrap_or(now - DEFAULT_TRADE_ACTIONS_WINDOW_SECS);
        let time_to = time_to.unwrap_or(now);

        let mut params = self.params();
        params
            .push("email", email)
            .push("dateFrom", date_param(time_from)?)
            .push("dateTo", date_param(time_to)?);

        self.call(Endpoint::TradeInstances, params).await
    }

    /// 品种名称转换为品种 ID
    ///
    /// 每次调用都会重新拉取完整品种列表，名称去掉分隔符后不区分大小写比较，第一个匹配的生效
    pub async fn resolve_asset_name_to_id(&self, symbol: &str) -> Result<u64> {
        let not_found = || OpteckError::AssetNotFound {
            symbol: symbol.to_string(),
        };

        let wanted = normalize_symbol(symbol);
        if wanted.is_empty() {
            return Err(not_found());
        }

        let assets = self.get_assets(None, None).await?;

        assets
            .iter()
            .find(|asset| {
                let name = asset.symbol();
                !name.is_empty() && name.eq_ignore_ascii_case(&wanted)
            })
            .map(|asset| asset.id)
            .ok_or_else(not_found)
    }

    /// 开仓
    ///
    /// 依次执行 登录 -> 解析品种 -> 获取期权定义 -> 获取报价 -> 下单，
    /// 任一步失败立即返回该步的错误，不做任何补偿
    ///
    /// # 参数
    /// - `symbol`: 品种名称，如 "EURUSD"
    /// - `direction`: 交易方向
    /// - `amount`: 下单金额
    pub async fn open_position(
        &self,
        email: &str,
        password: &str,
        symbol: &str,
        direction: Direction,
        amount: f64,
    ) -> Result<TradeConfirmation> {
        validate_amount(amount)?;

        tracing::info!(
            "Opening position: symbol={}, direction={:?}, amount={}",
            symbol,
            direction,
            amount
        );

        // 1. 登录
        let auth = self.auth(email, password).await?;
        tracing::debug!("Authenticated: lead_id={:?}", auth.lead_id);

        // 2. 解析品种
        let asset_id = self.resolve_asset_name_to_id(symbol).await?;
        tracing::debug!("Resolved {} to asset_id={}", symbol, asset_id);

        // 3. 获取可交易的期权定义，直接使用第一个
        let definitions = self
            .get_definitions(&GetDefinitionsRequest::active_for_asset(asset_id))
            .await?;
        let definition = definitions
            .first()
            .ok_or_else(|| OpteckError::NoAvailableOptions {
                symbol: symbol.to_string(),
            })?;
        tracing::debug!(
            "Using definition_id={} ({} available)",
            definition.id,
            definitions.len()
        );

        // 4. 获取报价
        let rate = self.get_asset_rate(asset_id).await?;
        tracing::debug!(
            "Rate for asset_id={}: rate={}, timestamp={}, microtime={}",
            asset_id,
            rate.rate,
            rate.timestamp,
            rate.microtime
        );

        // 5. 下单，报价的 timestamp/microtime/rate 原样回传
        let request = TradeRequest::from_rate(auth.token, &rate, definition.id, amount, direction)?;
        self.trade(&request).await
    }

    /// 创建参数表 (affiliateID 在最前)
    fn params(&self) -> FormParams {
        FormParams::new(self.affiliate_id)
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// 签名、发送、解析，失败时返回分类后的错误
    async fn call<T: FromPayload>(&self, endpoint: Endpoint, params: FormParams) -> Result<T> {
        let url = self.url(endpoint);
        let form = self.signer.sign(params);

        tracing::debug!("POST {} fields={:?}", url, form.keys());

        let body = self.transport.post_form(&url, form.body()).await?;
        let payload = Payload::parse(&body)?.into_result().map_err(|err| {
            tracing::warn!("{} failed: {}", endpoint.path(), err);
            err
        })?;

        T::from_payload(&payload)
    }
}

impl std::fmt::Debug for OpteckClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpteckClient")
            .field("affiliate_id", &self.affiliate_id)
            .field("signer", &self.signer)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Unix 时间戳 -> ISO-8601 (带时区偏移)
pub fn date_param(timestamp: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
        .ok_or_else(|| OpteckError::InvalidParams(format!("invalid timestamp: {}", timestamp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 按顺序返回预设响应，并记录请求
    struct ScriptedTransport {
        responses: Mutex<Vec<String>>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedTransport {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn paths(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.trim_start_matches("https://api.test/v1").to_string())
                .collect()
        }

        fn body(&self, index: usize) -> String {
            self.requests.lock().unwrap()[index].1.clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_form(&self, url: &str, body: String) -> Result<String> {
            self.requests.lock().unwrap().push((url.to_string(), body));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or(OpteckError::Transport {
                    status: 500,
                    reason: "no scripted response".to_string(),
                })
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> OpteckClient {
        OpteckClient::with_transport(
            Credentials::new(100, "partner-secret"),
            "https://api.test/v1/",
            transport,
        )
    }

    const AUTH_OK: &str = r#"{"returnCode":1,"data":{"token":"tok-1","leadID":"42"}}"#;
    const ASSETS: &str = r#"{"returnCode":1,"data":{"assets":[{"assetID":3,"name":"GBP/USD"},{"assetID":7,"name":"EUR/USD"},{"assetID":9,"name":"eur-usd"}]}}"#;
    const DEFINITIONS: &str = r#"{"returnCode":1,"data":{"definitions":[{"definitionID":11,"assetID":7},{"definitionID":12,"assetID":7}]}}"#;
    const RATE: &str = r#"{"returnCode":1,"data":{"assetID":7,"rate":"1.13425","timestamp":"1461329696","microtime":"0.51294400"}}"#;
    const TRADE_OK: &str = r#"{"returnCode":1,"data":{"tradeActionID":"555"}}"#;

    #[test]
    fn test_date_param() {
        assert_eq!(date_param(0).unwrap(), "1970-01-01T00:00:00+00:00");
        assert_eq!(date_param(1461329696).unwrap(), "2016-04-22T12:54:56+00:00");
        assert!(date_param(i64::MAX).is_err());
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = client(ScriptedTransport::new(&[]));
        assert_eq!(client.url(Endpoint::Auth), "https://api.test/v1/trade/auth");
        assert!(!format!("{:?}", client).contains("partner-secret"));
    }

    #[tokio::test]
    async fn test_resolve_asset_first_match() {
        let transport = ScriptedTransport::new(&[ASSETS]);
        let id = client(transport.clone())
            .resolve_asset_name_to_id("eurusd")
            .await
            .unwrap();
        assert_eq!(id, 7);
        assert_eq!(transport.paths(), vec!["/trade/getAssets"]);
    }

    #[tokio::test]
    async fn test_resolve_asset_with_separator() {
        let transport = ScriptedTransport::new(&[ASSETS]);
        let id = client(transport).resolve_asset_name_to_id("GBP/USD").await.unwrap();
        assert_eq!(id, 3);
    }

    #[tokio::test]
    async fn test_resolve_asset_not_found() {
        let transport = ScriptedTransport::new(&[ASSETS]);
        let err = client(transport)
            .resolve_asset_name_to_id("XAUUSD")
            .await
            .unwrap_err();
        match err {
            OpteckError::AssetNotFound { symbol } => assert_eq!(symbol, "XAUUSD"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_empty_symbol_not_found() {
        for symbol in ["", "/", " - "] {
            let transport = ScriptedTransport::new(&[ASSETS]);
            let err = client(transport.clone())
                .resolve_asset_name_to_id(symbol)
                .await
                .unwrap_err();
            assert!(matches!(err, OpteckError::AssetNotFound { .. }));
            assert!(transport.paths().is_empty());
        }
    }

    #[tokio::test]
    async fn test_resolve_skips_separator_only_names() {
        let transport = ScriptedTransport::new(&[
            r#"{"returnCode":1,"data":{"assets":[{"assetID":4,"name":"/"},{"assetID":6,"name":"USD/JPY"}]}}"#,
        ]);
        let id = client(transport).resolve_asset_name_to_id("USDJPY").await.unwrap();
        assert_eq!(id, 6);
    }

    #[tokio::test]
    async fn test_resolve_asset_without_name_is_malformed() {
        let transport =
            ScriptedTransport::new(&[r#"{"returnCode":1,"data":{"assets":[{"assetID":5}]}}"#]);
        let err = client(transport)
            .resolve_asset_name_to_id("EURUSD")
            .await
            .unwrap_err();
        assert!(matches!(err, OpteckError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_open_position_rejects_bad_amount_before_calls() {
        for amount in [0.0, -5.0, f64::NAN] {
            let transport = ScriptedTransport::new(&[AUTH_OK, ASSETS, DEFINITIONS, RATE, TRADE_OK]);
            let err = client(transport.clone())
                .open_position("john@example.com", "secret", "EURUSD", Direction::Call, amount)
                .await
                .unwrap_err();
            assert!(matches!(err, OpteckError::InvalidParams(_)));
            assert!(transport.paths().is_empty());
        }
    }

    #[tokio::test]
    async fn test_open_position_happy_path() {
        let transport = ScriptedTransport::new(&[AUTH_OK, ASSETS, DEFINITIONS, RATE, TRADE_OK]);
        let confirmation = client(transport.clone())
            .open_position("john@example.com", "secret", "EURUSD", Direction::Put, 25.0)
            .await
            .unwrap();

        assert_eq!(confirmation.id, Some(555));
        assert_eq!(
            transport.paths(),
            vec![
                "/trade/auth",
                "/trade/getAssets",
                "/trade/getDefinitions",
                "/trade/getRate",
                "/trade/action"
            ]
        );
        assert!(transport
            .body(2)
            .starts_with("affiliateID=100&assetID=7&isActive=1&checksum="));
        assert!(transport.body(4).starts_with(
            "affiliateID=100&token=tok-1&timestamp=1461329696&microtime=0.51294400&definitionID=11&strike=1.13425&amount=25&direction=-1&checksum="
        ));
    }

    #[tokio::test]
    async fn test_open_position_stops_without_definitions() {
        let transport = ScriptedTransport::new(&[
            AUTH_OK,
            ASSETS,
            r#"{"returnCode":1,"data":{"definitions":[]}}"#,
        ]);
        let err = client(transport.clone())
            .open_position("john@example.com", "secret", "EUR/USD", Direction::Call, 25.0)
            .await
            .unwrap_err();

        match err {
            OpteckError::NoAvailableOptions { symbol } => assert_eq!(symbol, "EUR/USD"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.paths().len(), 3);
    }

    #[tokio::test]
    async fn test_open_position_auth_failure_is_terminal() {
        let transport = ScriptedTransport::new(&[
            r#"{"returnCode":2,"description":"Lead not found"}"#,
        ]);
        let err = client(transport.clone())
            .open_position("ghost@example.com", "secret", "EURUSD", Direction::Call, 25.0)
            .await
            .unwrap_err();

        assert!(matches!(err, OpteckError::LeadNotFound { .. }));
        assert_eq!(transport.paths(), vec!["/trade/auth"]);
    }

    #[tokio::test]
    async fn test_open_position_trade_failure_propagates() {
        let transport = ScriptedTransport::new(&[
            AUTH_OK,
            ASSETS,
            DEFINITIONS,
            RATE,
            r#"{"returnCode":5,"description":"Insufficient balance"}"#,
        ]);
        let err = client(transport)
            .open_position("john@example.com", "secret", "EURUSD", Direction::Call, 1000.0)
            .await
            .unwrap_err();

        assert!(matches!(err, OpteckError::NoEnoughBalance { code: 5, .. }));
    }

    #[tokio::test]
    async fn test_checksum_covers_preceding_fields() {
        let transport = ScriptedTransport::new(&[r#"{"returnCode":1,"data":[]}"#]);
        let client = client(transport.clone());
        client.get_markets().await.unwrap();

        let body = transport.body(0);
        let (encoded, checksum) = body.split_once("&checksum=").unwrap();
        assert_eq!(encoded, "affiliateID=100");
        assert_eq!(checksum, ChecksumSigner::new("partner-secret").checksum(encoded));
    }
}
