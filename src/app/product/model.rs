//! 产品数据模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// 产品
///
/// `id` 是存储主键，其余字段原样透传。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Product {
    #[serde(rename = "id", alias = "Id")]
    #[validate(length(min = 1, message = "产品 id 不能为空"))]
    pub id: String,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}
