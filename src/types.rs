//! 数据类型定义

use crate::error::{OpteckError, Result};
use crate::protocol::{is_forbidden_country, Direction};
use serde::Deserialize;
use serde_json::{Map, Value};

/// 注册成功返回的用户信息
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeadCreated {
    /// 用户 ID
    #[serde(rename = "leadID", with = "crate::serde_util::id")]
    pub lead_id: u64,
    /// 注册时间 (ISO-8601)
    #[serde(rename = "dateRegistered", default)]
    pub date_registered: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub subcampaign: Option<String>,
    /// 用户状态 (如 "New")
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "languageCode", default)]
    pub language_code: Option<String>,
    #[serde(rename = "countryCode", default)]
    pub country_code: Option<String>,
    #[serde(rename = "currencyCode", default)]
    pub currency_code: Option<String>,
}

/// 登录返回的交易 token
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthToken {
    /// 会话 token，下单时使用
    pub token: String,
    /// 用户 ID
    #[serde(rename = "leadID", default, with = "crate::serde_util::opt_id")]
    pub lead_id: Option<u64>,
    /// 其余用户字段
    #[serde(flatten)]
    pub lead: Map<String, Value>,
}

/// 用户详情
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeadDetails {
    #[serde(rename = "leadID", default, with = "crate::serde_util::opt_id")]
    pub lead_id: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "countryCode", alias = "country", default)]
    pub country_code: Option<String>,
    #[serde(rename = "currencyCode", alias = "currency", default)]
    pub currency_code: Option<String>,
    /// 账户余额 (服务器原样文本)
    #[serde(default, with = "crate::serde_util::opt_text")]
    pub balance: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 入金记录
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Deposit {
    #[serde(rename = "depositID", alias = "id", default, with = "crate::serde_util::opt_id")]
    pub id: Option<u64>,
    #[serde(rename = "leadID", default, with = "crate::serde_util::opt_id")]
    pub lead_id: Option<u64>,
    #[serde(default, with = "crate::serde_util::opt_text")]
    pub amount: Option<String>,
    #[serde(rename = "currencyCode", alias = "currency", default)]
    pub currency_code: Option<String>,
    #[serde(rename = "dateCreated", alias = "date", default)]
    pub date_created: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 期权类型
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionType {
    #[serde(rename = "optionTypeID", alias = "id", with = "crate::serde_util::id")]
    pub id: u64,
    #[serde(alias = "optionTypeName")]
    pub name: String,
}

/// 市场
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Market {
    #[serde(rename = "marketID", alias = "id", with = "crate::serde_util::id")]
    pub id: u64,
    #[serde(alias = "marketName")]
    pub name: String,
}

/// 交易品种
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    #[serde(rename = "assetID", alias = "id", with = "crate::serde_util::id")]
    pub id: u64,
    /// 品种名称 (如 "EUR/USD")
    #[serde(alias = "assetName")]
    pub name: String,
    /// 报价小数位数
    #[serde(default, with = "crate::serde_util::opt_id")]
    pub precision: Option<u64>,
    #[serde(rename = "marketID", default, with = "crate::serde_util::opt_id")]
    pub market_id: Option<u64>,
    #[serde(rename = "isActive", default, with = "crate::serde_util::opt_flag")]
    pub is_active: Option<bool>,
    /// 休市品种的下次开盘时间
    #[serde(rename = "nextOpenTime", default)]
    pub next_open_time: Option<String>,
}

impl Asset {
    /// 是否可交易
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(false)
    }

    /// 去掉分隔符后的名称 ("EUR/USD" -> "EURUSD")
    pub fn symbol(&self) -> String {
        normalize_symbol(&self.name)
    }
}

/// 去掉品种名称中的分隔符
pub fn normalize_symbol(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '-' | '_' | ' ' | '.'))
        .collect()
}

/// 期权定义
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Definition {
    #[serde(rename = "definitionID", alias = "id", with = "crate::serde_util::id")]
    pub id: u64,
    #[serde(rename = "assetID", default, with = "crate::serde_util::opt_id")]
    pub asset_id: Option<u64>,
    #[serde(rename = "optionTypeID", default, with = "crate::serde_util::opt_id")]
    pub option_type_id: Option<u64>,
    #[serde(rename = "isActive", default, with = "crate::serde_util::opt_flag")]
    pub is_active: Option<bool>,
    /// 到期、收益率等其余字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 品种报价
///
/// timestamp 和 microtime 是服务器签发的报价凭证，下单时必须原样回传
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRate {
    #[serde(rename = "assetID", default, with = "crate::serde_util::opt_id")]
    pub asset_id: Option<u64>,
    #[serde(with = "crate::serde_util::text")]
    pub rate: String,
    #[serde(with = "crate::serde_util::text")]
    pub timestamp: String,
    #[serde(with = "crate::serde_util::text")]
    pub microtime: String,
}

impl AssetRate {
    /// 报价数值
    pub fn rate_value(&self) -> Option<f64> {
        self.rate.trim().parse().ok()
    }
}

/// 下单结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeConfirmation {
    #[serde(
        rename = "tradeActionID",
        alias = "positionID",
        alias = "id",
        default,
        with = "crate::serde_util::opt_id"
    )]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 交易记录
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeAction {
    #[serde(
        rename = "tradeActionID",
        alias = "positionID",
        alias = "id",
        default,
        with = "crate::serde_util::opt_id"
    )]
    pub id: Option<u64>,
    #[serde(rename = "leadID", default, with = "crate::serde_util::opt_id")]
    pub lead_id: Option<u64>,
    #[serde(rename = "definitionID", default, with = "crate::serde_util::opt_id")]
    pub definition_id: Option<u64>,
    #[serde(rename = "assetID", default, with = "crate::serde_util::opt_id")]
    pub asset_id: Option<u64>,
    #[serde(default, with = "crate::serde_util::opt_text")]
    pub amount: Option<String>,
    #[serde(default, with = "crate::serde_util::opt_text")]
    pub strike: Option<String>,
    #[serde(default, with = "crate::serde_util::opt_text")]
    pub direction: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 注册请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLeadRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password: Option<String>,
    /// 语言代码 (如 "EN")
    pub language: String,
    /// 国家代码 (ISO 3166-1 alpha-2)
    pub country: String,
    pub ip: Option<String>,
    pub campaign: Option<String>,
    pub subcampaign: Option<String>,
    pub comment: Option<String>,
    pub marker: Option<String>,
}

impl CreateLeadRequest {
    /// 创建构建器
    pub fn builder() -> CreateLeadRequestBuilder {
        CreateLeadRequestBuilder::default()
    }
}

/// 注册请求构建器
#[derive(Debug, Clone, Default)]
pub struct CreateLeadRequestBuilder {
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    password: Option<String>,
    language: Option<String>,
    country: Option<String>,
    ip: Option<String>,
    campaign: Option<String>,
    subcampaign: Option<String>,
    comment: Option<String>,
    marker: Option<String>,
}

impl CreateLeadRequestBuilder {
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    pub fn phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    pub fn password(mut self, value: impl Into<String>) -> Self {
        self.password = Some(value.into());
        self
    }

    pub fn language(mut self, value: impl Into<String>) -> Self {
        self.language = Some(value.into());
        self
    }

    pub fn country(mut self, value: impl Into<String>) -> Self {
        self.country = Some(value.into());
        self
    }

    pub fn ip(mut self, value: impl Into<String>) -> Self {
        self.ip = Some(value.into());
        self
    }

    pub fn campaign(mut self, value: impl Into<String>) -> Self {
        self.campaign = Some(value.into());
        self
    }

    pub fn subcampaign(mut self, value: impl Into<String>) -> Self {
        self.subcampaign = Some(value.into());
        self
    }

    pub fn comment(mut self, value: impl Into<String>) -> Self {
        self.comment = Some(value.into());
        self
    }

    pub fn marker(mut self, value: impl Into<String>) -> Self {
        self.marker = Some(value.into());
        self
    }

    /// 校验并创建请求
    pub fn build(self) -> Result<CreateLeadRequest> {
        let email = required("email", self.email)?;
        if !email.contains('@') {
            return Err(OpteckError::InvalidParams(format!("invalid email: {}", email)));
        }

        let country = required("country", self.country)?.to_ascii_uppercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(OpteckError::InvalidParams(format!(
                "country must be an ISO 3166-1 alpha-2 code: {}",
                country
            )));
        }
        if is_forbidden_country(&country) {
            return Err(OpteckError::InvalidParams(format!(
                "signup is forbidden for country {}",
                country
            )));
        }

        Ok(CreateLeadRequest {
            email,
            first_name: required("firstName", self.first_name)?,
            last_name: required("lastName", self.last_name)?,
            phone: required("phone", self.phone)?,
            password: non_empty(self.password),
            language: required("language", self.language)?.to_ascii_uppercase(),
            country,
            ip: non_empty(self.ip),
            campaign: non_empty(self.campaign),
            subcampaign: non_empty(self.subcampaign),
            comment: non_empty(self.comment),
            marker: non_empty(self.marker),
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    non_empty(value).ok_or_else(|| OpteckError::InvalidParams(format!("{} is required", field)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 期权定义查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetDefinitionsRequest {
    pub asset_id: Option<u64>,
    pub is_active: Option<bool>,
    pub option_type_id: Option<u64>,
}

impl GetDefinitionsRequest {
    /// 某个品种当前可交易的定义
    pub fn active_for_asset(asset_id: u64) -> Self {
        Self {
            asset_id: Some(asset_id),
            is_active: Some(true),
            option_type_id: None,
        }
    }
}

/// 下单金额必须为有限正数
pub fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(OpteckError::InvalidParams(format!(
            "amount must be positive: {}",
            amount
        )))
    }
}

/// 下单请求
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    /// 登录获得的会话 token
    pub token: String,
    /// 报价时间戳 (原样回传)
    pub timestamp: String,
    /// 报价微秒标记 (原样回传)
    pub microtime: String,
    pub definition_id: u64,
    /// 执行价，即报价
    pub strike: String,
    /// 下单金额
    pub amount: f64,
    pub direction: Direction,
}

impl TradeRequest {
    /// 校验并创建下单请求
    pub fn new(
        token: impl Into<String>,
        timestamp: impl Into<String>,
        microtime: impl Into<String>,
        definition_id: u64,
        strike: impl Into<String>,
        amount: f64,
        direction: Direction,
    ) -> Result<Self> {
        let request = Self {
            token: token.into(),
            timestamp: timestamp.into(),
            microtime: microtime.into(),
            definition_id,
            strike: strike.into(),
            amount,
            direction,
        };

        for (field, value) in [
            ("token", &request.token),
            ("timestamp", &request.timestamp),
            ("microtime", &request.microtime),
            ("strike", &request.strike),
        ] {
            if value.trim().is_empty() {
                return Err(OpteckError::InvalidParams(format!("{} is required", field)));
            }
        }
        if definition_id == 0 {
            return Err(OpteckError::InvalidParams("definitionID is required".to_string()));
        }
        validate_amount(amount)?;

        Ok(request)
    }

    /// 用报价创建下单请求，报价字段原样使用
    pub fn from_rate(
        token: impl Into<String>,
        rate: &AssetRate,
        definition_id: u64,
        amount: f64,
        direction: Direction,
    ) -> Result<Self> {
        Self::new(
            token,
            rate.timestamp.clone(),
            rate.microtime.clone(),
            definition_id,
            rate.rate.clone(),
            amount,
            direction,
        )
    }
}
