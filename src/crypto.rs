//! 请求校验和 (MD5)

use crate::params::{FormParams, SignedForm};
use md5::{Digest, Md5};
use std::fmt;

/// 请求签名器
///
/// checksum = upper(hex(md5(partner_id + 编码后的参数)))
#[derive(Clone)]
pub struct ChecksumSigner {
    /// 合作方密钥，只参与计算，不会发送
    partner_id: String,
}

impl ChecksumSigner {
    /// 创建新的签名器
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
        }
    }

    /// 计算已编码参数的校验和
    pub fn checksum(&self, encoded: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.partner_id.as_bytes());
        hasher.update(encoded.as_bytes());
        hex::encode_upper(hasher.finalize())
    }

    /// 签名参数表，checksum 追加在最后
    pub fn sign(&self, params: FormParams) -> SignedForm {
        let checksum = self.checksum(&params.encode());
        SignedForm::new(params, checksum)
    }

    /// 校验已签名的请求
    pub fn verify(&self, form: &SignedForm) -> bool {
        self.checksum(&form.params().encode()) == form.checksum()
    }
}

impl fmt::Debug for ChecksumSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumSigner")
            .field("partner_id", &"***")
            .finish()
    }
}
