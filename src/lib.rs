//! # 产品目录服务
//!
//! 基于 Axum 的产品 REST 接口，持久化全部交给外部键值存储（DynamoDB）：
//! - `app`：路由、处理器、产品模型与仓储
//! - `common`：错误类型与中间件
//! - `infrastructure`：日志初始化与存储后端
//! - `config`：TOML 配置

pub mod app;
pub mod config;
pub mod common;
pub mod infrastructure;

pub use app::build_app;
pub use app::product::{model::Product, repository::ProductRepository};
pub use infrastructure::store::{ProductStore, StoreError};
