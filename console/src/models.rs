//! 卡片服务数据模型

use serde::{Deserialize, Deserializer, Serialize};

/// 远端字段为 null 时取默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// 卡片信息
///
/// 卡号、CVC、有效期只有在激活后才会由远端填充
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardInfo {
    /// 卡密
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub card_number: Option<u64>,
    pub card_cvc: Option<String>,
    /// 可读的有效期（如 "12/27"）
    pub card_exp_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub card_nickname: String,
    /// 远端原始的有效期编码
    #[serde(deserialize_with = "null_as_default")]
    pub exp_date: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub create_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub card_limit: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub delete_date: Option<String>,
    pub card_activation_time: Option<String>,
    pub billing_address: Option<String>,
}

impl CardInfo {
    /// 卡号、CVC、有效期同时缺失即视为未激活
    pub fn is_unactivated(&self) -> bool {
        self.card_number.is_none() && self.card_cvc.is_none() && self.card_exp_date.is_none()
    }
}

/// 卡片服务统一响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub result: Option<CardInfo>,
    pub msg: Option<String>,
    pub error: Option<String>,
}

impl ApiResponse {
    /// 响应体中的错误信息（空字符串视为无错误）
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

pub fn is_card_unactivated(result: Option<&CardInfo>) -> bool {
    result.is_some_and(CardInfo::is_unactivated)
}
