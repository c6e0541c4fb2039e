//! 响应解析

use crate::error::{OpteckError, Result};
use crate::protocol::RETURN_CODE_SUCCESS;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// 响应信封
#[derive(Debug, Clone, Deserialize)]
struct Envelope {
    #[serde(rename = "returnCode", with = "crate::serde_util::int")]
    return_code: i64,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "timestampGenerated", default)]
    timestamp_generated: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(rename = "invalidFields", default)]
    invalid_fields: Option<Vec<String>>,
}

/// 解析后的响应，成功或失败二者之一
#[derive(Debug, Clone)]
pub enum Payload {
    Success(SuccessPayload),
    Failure(FailurePayload),
}

/// 成功响应 (returnCode == 1)
#[derive(Debug, Clone)]
pub struct SuccessPayload {
    pub description: String,
    pub timestamp_generated: Option<String>,
    data: Option<Value>,
}

/// 失败响应 (returnCode != 1)
#[derive(Debug, Clone)]
pub struct FailurePayload {
    pub return_code: i64,
    pub description: String,
    pub timestamp_generated: Option<String>,
    pub invalid_fields: Vec<String>,
}

impl Payload {
    /// 解析响应体
    pub fn parse(body: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| OpteckError::MalformedResponse(format!("{}: {}", e, truncate(body))))?;

        let description = envelope.description.unwrap_or_default();
        if envelope.return_code == RETURN_CODE_SUCCESS {
            Ok(Payload::Success(SuccessPayload {
                description,
                timestamp_generated: envelope.timestamp_generated,
                data: envelope.data,
            }))
        } else {
            Ok(Payload::Failure(FailurePayload {
                return_code: envelope.return_code,
                description,
                timestamp_generated: envelope.timestamp_generated,
                invalid_fields: envelope.invalid_fields.unwrap_or_default(),
            }))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Payload::Success(_))
    }

    /// 失败时分类为具体错误
    pub fn into_result(self) -> Result<SuccessPayload> {
        match self {
            Payload::Success(success) => Ok(success),
            Payload::Failure(failure) => Err(failure.into_error()),
        }
    }
}

impl FailurePayload {
    /// 通过错误分类表转换为错误
    pub fn into_error(self) -> OpteckError {
        OpteckError::classify(self.return_code, &self.description, &self.invalid_fields)
    }
}

impl SuccessPayload {
    /// 原始 data 字段
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref().filter(|v| !v.is_null())
    }

    /// 将 data 解析为对象
    pub fn entity<T: DeserializeOwned>(&self) -> Result<T> {
        // 服务器用空数组表示空对象
        let data = match self.data() {
            Some(Value::Array(items)) if items.is_empty() => Value::Object(Default::default()),
            Some(value) => value.clone(),
            None => Value::Object(Default::default()),
        };
        serde_json::from_value(data)
            .map_err(|e| OpteckError::MalformedResponse(format!("Invalid data: {}", e)))
    }

    /// 将 data 解析为列表
    ///
    /// data 可以直接是数组，也可以是 `{key: [...]}`；缺失时为空列表。保持服务器顺序
    pub fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let items = match self.data() {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Object(map)) => match map.get(key) {
                Some(Value::Array(items)) => items.clone(),
                None | Some(Value::Null) => Vec::new(),
                Some(other) => {
                    return Err(OpteckError::MalformedResponse(format!(
                        "Expected list under '{}', got {}",
                        key, other
                    )))
                }
            },
            Some(other) => {
                return Err(OpteckError::MalformedResponse(format!(
                    "Expected list, got {}",
                    other
                )))
            }
        };

        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    OpteckError::MalformedResponse(format!("Invalid '{}' item: {}", key, e))
                })
            })
            .collect()
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
