//! 产品模块

pub mod handler;
pub mod model;
pub mod repository;

use axum::{routing::get, Router};

use handler::{
    create_product, delete_product, get_product, list_products, update_product, AppState,
    PRODUCTS_PATH,
};
use repository::ProductRepository;

/// 产品路由
pub fn routes(repository: ProductRepository) -> Router {
    Router::new()
        .route(PRODUCTS_PATH, get(list_products).post(create_product))
        .route(
            &format!("{}/:id", PRODUCTS_PATH),
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(AppState { repository })
}
