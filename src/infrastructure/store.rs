//! 存储抽象
//!
//! 以产品主键组织的键值集合，只支持全表扫描、按键读取、
//! 按键覆盖写入和幂等删除四种操作。

use async_trait::async_trait;

use crate::app::product::model::Product;

/// 存储错误类型
///
/// 底层客户端的错误原样保留在 `source` 中，不做重试也不做转换。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("存储后端请求失败: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("存储数据编解码失败: {0}")]
    Codec(String),
    #[error("存储不可用: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// 产品存储 trait
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 全表扫描，顺序由存储决定
    async fn scan(&self) -> Result<Vec<Product>, StoreError>;

    /// 按主键读取，不存在时返回 `None`
    async fn get(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// 按主键整体覆盖写入
    async fn put(&self, product: &Product) -> Result<(), StoreError>;

    /// 按主键删除，键不存在时同样成功
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// 后端名称，用于健康检查
    fn backend(&self) -> &'static str;
}
