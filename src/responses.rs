//! 各端点的响应映射

use crate::error::{OpteckError, Result};
use crate::payload::SuccessPayload;
use crate::types::{
    Asset, AssetRate, AuthToken, Definition, Deposit, LeadCreated, LeadDetails, Market,
    OptionType, TradeAction, TradeConfirmation,
};

/// 从成功响应构建结果
pub trait FromPayload: Sized {
    fn from_payload(payload: &SuccessPayload) -> Result<Self>;
}

/// data 为单个对象的端点
macro_rules! entity_mapper {
    ($ty:ty) => {
        impl FromPayload for $ty {
            fn from_payload(payload: &SuccessPayload) -> Result<Self> {
                payload.entity()
            }
        }
    };
}

/// data 为列表的端点，key 为列表在 data 中的字段名
macro_rules! list_mapper {
    ($ty:ty, $key:literal) => {
        impl FromPayload for Vec<$ty> {
            fn from_payload(payload: &SuccessPayload) -> Result<Self> {
                payload.list($key)
            }
        }
    };
}

entity_mapper!(LeadCreated);
entity_mapper!(LeadDetails);
entity_mapper!(AssetRate);
entity_mapper!(TradeConfirmation);

list_mapper!(Deposit, "deposits");
list_mapper!(OptionType, "optionTypes");
list_mapper!(Market, "markets");
list_mapper!(Asset, "assets");
list_mapper!(Definition, "definitions");
list_mapper!(TradeAction, "tradeActions");

impl FromPayload for AuthToken {
    fn from_payload(payload: &SuccessPayload) -> Result<Self> {
        let token: AuthToken = payload.entity()?;
        if token.token.is_empty() {
            return Err(OpteckError::MalformedResponse(
                "auth response without token".to_string(),
            ));
        }
        Ok(token)
    }
}
