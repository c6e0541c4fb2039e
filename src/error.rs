//! 错误类型定义

use thiserror::Error;

/// Opteck 客户端错误类型
#[derive(Error, Debug)]
pub enum OpteckError {
    /// HTTP 请求错误 (连接失败、超时等)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务器返回非 2xx 状态码
    #[error("Transport error: HTTP {status} {reason}")]
    Transport { status: u16, reason: String },

    /// 响应体无法解析
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 字段校验失败
    #[error("{description} (code: {code}, fields: {fields:?})")]
    InvalidField {
        code: i64,
        description: String,
        fields: Vec<String>,
    },

    /// 邮箱已注册
    #[error("Email already exists: {description} (code: {code})")]
    EmailAlreadyExists { code: i64, description: String },

    /// 用户不存在
    #[error("Lead not found: {description} (code: {code})")]
    LeadNotFound { code: i64, description: String },

    /// 品种不存在
    #[error("Asset [{symbol}] not found")]
    AssetNotFound { symbol: String },

    /// 没有可交易的期权
    #[error("No available options for {symbol}")]
    NoAvailableOptions { symbol: String },

    /// 余额不足
    #[error("Not enough balance: {description} (code: {code})")]
    NoEnoughBalance { code: i64, description: String },

    /// 未识别的服务器错误
    #[error("Server error: {description} (code: {code})")]
    Server { code: i64, description: String },

    /// 无效参数
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

/// 服务器错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidField,
    EmailAlreadyExists,
    LeadNotFound,
    NoEnoughBalance,
}

/// 分类规则的匹配条件
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// returnCode 完全相等
    Code(i64),
    /// description 包含该子串 (不区分大小写)
    Description(&'static str),
}

impl Matcher {
    fn matches(&self, code: i64, description: &str) -> bool {
        match self {
            Matcher::Code(c) => *c == code,
            Matcher::Description(needle) => description.to_ascii_lowercase().contains(needle),
        }
    }
}

/// 服务器错误分类表，按顺序匹配，第一条命中的规则生效
///
/// 服务器只对字段校验提供稳定的 returnCode，其余错误只能靠 description 识别
pub const ERROR_RULES: &[(Matcher, ErrorKind)] = &[
    (Matcher::Code(3), ErrorKind::InvalidField),
    (Matcher::Description("email already exists"), ErrorKind::EmailAlreadyExists),
    (Matcher::Description("lead not found"), ErrorKind::LeadNotFound),
    (Matcher::Description("insufficient balance"), ErrorKind::NoEnoughBalance),
    (Matcher::Description("not enough balance"), ErrorKind::NoEnoughBalance),
];

impl OpteckError {
    /// 根据失败响应的 returnCode / description 创建错误
    pub fn classify(code: i64, description: &str, invalid_fields: &[String]) -> Self {
        let kind = ERROR_RULES
            .iter()
            .find(|(matcher, _)| matcher.matches(code, description))
            .map(|(_, kind)| *kind);

        let description = description.to_string();
        match kind {
            Some(ErrorKind::InvalidField) => OpteckError::InvalidField {
                code,
                description,
                fields: invalid_fields.to_vec(),
            },
            Some(ErrorKind::EmailAlreadyExists) => {
                OpteckError::EmailAlreadyExists { code, description }
            }
            Some(ErrorKind::LeadNotFound) => OpteckError::LeadNotFound { code, description },
            Some(ErrorKind::NoEnoughBalance) => OpteckError::NoEnoughBalance { code, description },
            None => OpteckError::Server { code, description },
        }
    }

    /// 服务器返回的 returnCode (仅服务器错误有)
    pub fn code(&self) -> Option<i64> {
        match self {
            OpteckError::InvalidField { code, .. }
            | OpteckError::EmailAlreadyExists { code, .. }
            | OpteckError::LeadNotFound { code, .. }
            | OpteckError::NoEnoughBalance { code, .. }
            | OpteckError::Server { code, .. } => Some(*code),
            OpteckError::Transport { status, .. } => Some(i64::from(*status)),
            _ => None,
        }
    }

    /// 错误描述
    pub fn description(&self) -> String {
        match self {
            OpteckError::InvalidField { description, .. }
            | OpteckError::EmailAlreadyExists { description, .. }
            | OpteckError::LeadNotFound { description, .. }
            | OpteckError::NoEnoughBalance { description, .. }
            | OpteckError::Server { description, .. } => description.clone(),
            OpteckError::Transport { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// 校验失败的字段名
    pub fn invalid_fields(&self) -> &[String] {
        match self {
            OpteckError::InvalidField { fields, .. } => fields,
            _ => &[],
        }
    }

    /// 是否为业务错误 (非传输/解析错误)
    pub fn is_domain_error(&self) -> bool {
        !matches!(
            self,
            OpteckError::Http(_)
                | OpteckError::Transport { .. }
                | OpteckError::MalformedResponse(_)
                | OpteckError::InvalidParams(_)
        )
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, OpteckError>;
