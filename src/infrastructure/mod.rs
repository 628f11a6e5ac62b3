//! 基础设施：日志与存储后端

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod logger;
pub mod memory;
pub mod store;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use store::ProductStore;

/// 按配置创建存储后端
pub async fn connect_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn ProductStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(memory::MemoryProductStore::new())),
        #[cfg(feature = "dynamodb")]
        StorageBackend::DynamoDb => {
            let context = dynamodb::DynamoDbContext::connect(config).await;
            Ok(Arc::new(dynamodb::DynamoProductStore::new(context)))
        }
        #[cfg(not(feature = "dynamodb"))]
        StorageBackend::DynamoDb => anyhow::bail!("未启用 dynamodb 特性，无法使用 DynamoDB 存储"),
    }
}
