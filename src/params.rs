//! 请求参数构建与编码

use url::form_urlencoded;

/// 请求中的 affiliate 字段
pub const AFFILIATE_FIELD: &str = "affiliateID";

/// 校验和字段，总是最后一个
pub const CHECKSUM_FIELD: &str = "checksum";

/// 有序的请求参数 (不含 checksum)
///
/// 字段顺序即发送顺序，也是计算校验和的顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormParams {
    fields: Vec<(&'static str, String)>,
}

impl FormParams {
    /// 创建参数表，第一个字段为 affiliateID
    pub fn new(affiliate_id: u64) -> Self {
        Self {
            fields: vec![(AFFILIATE_FIELD, affiliate_id.to_string())],
        }
    }

    /// 追加字段
    pub fn push(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// 追加可选字段，None 时省略
    pub fn push_opt(&mut self, key: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// 追加可选 ID，None 或 0 时省略
    pub fn push_id(&mut self, key: &'static str, id: Option<u64>) -> &mut Self {
        if let Some(id) = id.filter(|id| *id > 0) {
            self.push(key, id);
        }
        self
    }

    /// 追加布尔字段 (0/1)
    pub fn push_bool(&mut self, key: &'static str, value: bool) -> &mut Self {
        self.push(key, u8::from(value))
    }

    /// 字段名 (按顺序)
    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(k, _)| *k).collect()
    }

    /// 查找字段值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 按发送格式编码: key=value&key=value
    pub fn encode(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// 已签名的请求体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedForm {
    params: FormParams,
    checksum: String,
}

impl SignedForm {
    /// 只能由签名器创建，保证 checksum 对应 params
    pub(crate) fn new(params: FormParams, checksum: String) -> Self {
        Self { params, checksum }
    }

    pub fn params(&self) -> &FormParams {
        &self.params
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// 完整的字段名列表，checksum 在最后
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = self.params.keys();
        keys.push(CHECKSUM_FIELD);
        keys
    }

    /// 请求体: 参数编码 + &checksum=...
    pub fn body(&self) -> String {
        format!(
            "{}&{}={}",
            self.params.encode(),
            CHECKSUM_FIELD,
            encode_component(&self.checksum)
        )
    }
}

/// 表单编码: 空格为 '+'，除字母数字和 "-_." 外全部百分号编码
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
}
