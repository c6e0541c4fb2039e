//! 服务器字段格式的 serde 辅助
//!
//! 服务器对数字字段并不一致: 有时是 JSON 数字，有时是字符串 (如 `"leadID":"160422888612"`)

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(u8::from(b).to_string()),
        _ => None,
    }
}

/// 数字或字符串 -> i64
pub mod int {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| de::Error::custom(format!("Invalid integer: {}", n))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("Invalid integer: {}", s))),
            other => Err(de::Error::custom(format!("Expected integer, got {}", other))),
        }
    }
}

/// 数字或字符串 -> u64
pub mod id {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::opt_id::deserialize(deserializer)?
            .ok_or_else(|| de::Error::custom("Missing id"))
    }
}

/// 标量 -> 原样文本
pub mod text {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let shown = value.to_string();
        scalar_to_string(value)
            .ok_or_else(|| de::Error::custom(format!("Expected scalar, got {}", shown)))
    }
}

/// 可选的数字或字符串 -> u64，null/空串/缺失为 None
pub mod opt_id {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("Invalid id: {}", n))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("Invalid id: {}", s))),
            Some(other) => Err(de::Error::custom(format!("Expected id, got {}", other))),
        }
    }
}

/// 可选的标量 -> 原样文本 (数字保留服务器给出的写法)
pub mod opt_text {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(scalar_to_string))
    }
}

/// 可选的布尔值，接受 true/false、0/1、"0"/"1"
pub mod opt_flag {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::Number(n)) => Ok(Some(n.as_f64().unwrap_or(0.0) != 0.0)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "1" | "true" | "yes" => Ok(Some(true)),
                "0" | "false" | "no" => Ok(Some(false)),
                _ => Err(de::Error::custom(format!("Invalid flag: {}", s))),
            },
            Some(other) => Err(de::Error::custom(format!("Expected flag, got {}", other))),
        }
    }
}
