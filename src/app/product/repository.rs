//! 产品仓储

use std::sync::Arc;
use tracing::debug;

use super::model::Product;
use crate::infrastructure::store::{ProductStore, StoreError};

/// 产品仓储，所有操作直接转发给存储后端
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn ProductStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// 获取全部产品
    ///
    /// 全表扫描，不分页，表很大时代价很高。
    pub async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.store.scan().await?;
        debug!("获取到 {} 个产品", products.len());
        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        debug!("读取产品 {}", id);
        self.store.get(id).await
    }

    /// 写入产品，已存在时整体覆盖
    pub async fn save(&self, product: &Product) -> Result<(), StoreError> {
        debug!("保存产品 {}", product.id);
        self.store.put(product).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        debug!("删除产品 {}", id);
        self.store.delete(id).await
    }
}
