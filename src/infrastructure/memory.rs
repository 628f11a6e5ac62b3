//! 内存存储，用于本地运行和测试

use async_trait::async_trait;
use std::{collections::HashMap, sync::RwLock};

use super::store::{ProductStore, StoreError};
use crate::app::product::model::Product;

#[derive(Default)]
pub struct MemoryProductStore {
    items: RwLock<HashMap<String, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("内存存储锁已损坏".to_string())
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn scan(&self) -> Result<Vec<Product>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(id).cloned())
    }

    async fn put(&self, product: &Product) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.remove(id);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
