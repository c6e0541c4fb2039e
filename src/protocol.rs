//! Opteck Affiliate API 协议常量

/// 默认 API 基础 URL
pub const DEFAULT_BASE_URL: &str = "https://api.optaffiliates.com/v1";

/// 默认 User-Agent
pub const USER_AGENT: &str = "Opteck API Client";

/// 成功响应的 returnCode
pub const RETURN_CODE_SUCCESS: i64 = 1;

/// API 端点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// 注册用户
    CreateLead,
    /// 登录，获取交易 token
    Auth,
    /// 用户详情
    GetLeadDetails,
    /// 入金记录
    GetDeposits,
    /// 期权类型
    GetOptionTypes,
    /// 市场列表
    GetMarkets,
    /// 品种列表
    GetAssets,
    /// 期权定义
    GetDefinitions,
    /// 品种报价
    GetRate,
    /// 下单
    TradeAction,
    /// 交易记录
    TradeInstances,
}

impl Endpoint {
    /// 端点路径 (相对基础 URL)
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CreateLead => "/lead/create",
            Endpoint::Auth => "/trade/auth",
            Endpoint::GetLeadDetails => "/trade/getLeadDetails",
            Endpoint::GetDeposits => "/lead/getDeposits",
            Endpoint::GetOptionTypes => "/trade/getOptionTypes",
            Endpoint::GetMarkets => "/trade/getMarkets",
            Endpoint::GetAssets => "/trade/getAssets",
            Endpoint::GetDefinitions => "/trade/getDefinitions",
            Endpoint::GetRate => "/trade/getRate",
            Endpoint::TradeAction => "/trade/action",
            Endpoint::TradeInstances => "/trade/instances",
        }
    }
}

/// 交易方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Direction {
    /// 看跌
    Put = -1,
    /// 看涨
    Call = 1,
}

impl Direction {
    /// 从整数创建
    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Direction::Put),
            1 => Some(Direction::Call),
            _ => None,
        }
    }

    /// 请求参数中的值
    pub fn as_i8(&self) -> i8 {
        *self as i8
    }
}

/// 禁止注册的国家 (ISO 3166-1 alpha-2)
pub const FORBIDDEN_COUNTRIES: &[&str] = &[
    "IL", "US", "IQ", "NG", "DZ", "MA", "SD", "LY", "YE", "BW", "TN", "SY", "UM", "VI", "IR",
    "KP", "CU", "BZ",
];

/// 国家是否禁止注册 (不区分大小写)
pub fn is_forbidden_country(code: &str) -> bool {
    FORBIDDEN_COUNTRIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(code.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_values() {
        assert_eq!(Direction::Put.as_i8(), -1);
        assert_eq!(Direction::Call.as_i8(), 1);
        assert_eq!(Direction::from_i8(-1), Some(Direction::Put));
        assert_eq!(Direction::from_i8(0), None);
    }

    #[test]
    fn test_forbidden_countries() {
        assert!(!FORBIDDEN_COUNTRIES.is_empty());
        assert!(is_forbidden_country("US"));
        assert!(is_forbidden_country("kp"));
        assert!(!is_forbidden_country("GB"));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::GetRate.path(), "/trade/getRate");
        assert_eq!(Endpoint::TradeInstances.path(), "/trade/instances");
    }
}
