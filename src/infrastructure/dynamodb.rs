//! DynamoDB 基础设施

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{config::Region, types::AttributeValue, Client};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::{debug, info};

use super::store::{ProductStore, StoreError};
use crate::app::product::model::Product;
use crate::config::StorageConfig;

type Item = HashMap<String, AttributeValue>;

/// DynamoDB 客户端上下文
///
/// 进程内只创建一次，之后只读共享。
#[derive(Clone)]
pub struct DynamoDbContext {
    client: Client,
    table_name: String,
    key_attribute: String,
}

impl DynamoDbContext {
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        info!(
            "已创建 DynamoDB 客户端，表: {}，主键: {}，端点: {}",
            config.table_name,
            config.key_attribute,
            config.endpoint_url.as_deref().unwrap_or("默认")
        );

        Self::new(
            Client::new(&sdk_config),
            config.table_name.clone(),
            config.key_attribute.clone(),
        )
    }

    pub fn new(client: Client, table_name: String, key_attribute: String) -> Self {
        Self {
            client,
            table_name,
            key_attribute,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }
}

fn sdk_error<E>(err: E) -> StoreError
where
    aws_sdk_dynamodb::Error: From<E>,
{
    StoreError::backend(aws_sdk_dynamodb::Error::from(err))
}

/// 基于 DynamoDB 的产品存储
pub struct DynamoProductStore {
    context: DynamoDbContext,
}

impl DynamoProductStore {
    pub fn new(context: DynamoDbContext) -> Self {
        Self { context }
    }

    fn key(&self, id: &str) -> (String, AttributeValue) {
        (
            self.context.key_attribute().to_string(),
            AttributeValue::S(id.to_string()),
        )
    }
}

#[async_trait]
impl ProductStore for DynamoProductStore {
    async fn scan(&self) -> Result<Vec<Product>, StoreError> {
        let mut products = Vec::new();
        let mut start_key: Option<Item> = None;
        let mut pages = 0usize;

        loop {
            let output = self
                .context
                .client()
                .scan()
                .table_name(self.context.table_name())
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(sdk_error)?;
            pages += 1;

            for item in output.items() {
                products.push(item_to_product(item, self.context.key_attribute())?);
            }

            start_key = output
                .last_evaluated_key()
                .filter(|key| !key.is_empty())
                .cloned();
            if start_key.is_none() {
                break;
            }
        }

        debug!("扫描完成，共 {} 页，{} 个产品", pages, products.len());
        Ok(products)
    }

    async fn get(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let (key, value) = self.key(id);
        let output = self
            .context
            .client()
            .get_item()
            .table_name(self.context.table_name())
            .key(key, value)
            .send()
            .await
            .map_err(sdk_error)?;

        output
            .item()
            .map(|item| item_to_product(item, self.context.key_attribute()))
            .transpose()
    }

    async fn put(&self, product: &Product) -> Result<(), StoreError> {
        let item = product_to_item(product, self.context.key_attribute())?;
        self.context
            .client()
            .put_item()
            .table_name(self.context.table_name())
            .set_item(Some(item))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let (key, value) = self.key(id);
        self.context
            .client()
            .delete_item()
            .table_name(self.context.table_name())
            .key(key, value)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "dynamodb"
    }
}

/// 产品转换为 DynamoDB 条目，主键写入 `key_attribute`
///
/// 普通属性与主键属性同名时返回编解码错误，不会覆盖主键。
pub fn product_to_item(product: &Product, key_attribute: &str) -> Result<Item, StoreError> {
    if product.attributes.contains_key(key_attribute) {
        return Err(StoreError::Codec(format!(
            "产品 {} 的属性 {} 与主键属性同名",
            product.id, key_attribute
        )));
    }

    let mut item: Item = product
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), json_to_attribute(value)))
        .collect();
    item.insert(key_attribute.to_string(), AttributeValue::S(product.id.clone()));
    Ok(item)
}

/// DynamoDB 条目转换为产品
pub fn item_to_product(item: &Item, key_attribute: &str) -> Result<Product, StoreError> {
    let id = match item.get(key_attribute) {
        Some(AttributeValue::S(id)) => id.clone(),
        Some(other) => {
            return Err(StoreError::Codec(format!(
                "主键属性 {} 不是字符串: {:?}",
                key_attribute, other
            )))
        }
        None => {
            return Err(StoreError::Codec(format!("条目缺少主键属性 {}", key_attribute)))
        }
    };

    let mut attributes = Map::new();
    for (name, value) in item {
        // "id" 已作为主键字段输出
        if name == key_attribute || name == "id" {
            continue;
        }
        attributes.insert(name.clone(), attribute_to_json(value)?);
    }

    Ok(Product { id, attributes })
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

fn parse_number(raw: &str) -> Result<Value, StoreError> {
    serde_json::from_str::<Number>(raw)
        .map(Value::Number)
        .map_err(|e| StoreError::Codec(format!("无效的数值 {}: {}", raw, e)))
}

fn attribute_to_json(value: &AttributeValue) -> Result<Value, StoreError> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(values) => values
            .iter()
            .map(attribute_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => map
            .iter()
            .map(|(k, v)| attribute_to_json(v).map(|v| (k.clone(), v)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        AttributeValue::Ss(values) => Ok(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(values) => values
            .iter()
            .map(|n| parse_number(n))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(StoreError::Codec(format!("不支持的属性类型: {:?}", other))),
    }
}
