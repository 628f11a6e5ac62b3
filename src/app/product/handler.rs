//! 产品处理器

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use tracing::info;
use url::Url;
use validator::Validate;

use super::{model::Product, repository::ProductRepository};
use crate::common::error::CoreError;

pub const PRODUCTS_PATH: &str = "/api/products";

#[derive(Clone)]
pub struct AppState {
    pub repository: ProductRepository,
}

/// 新建产品的 Location，id 作为单个路径段编码
///
/// `.` 和 `..` 会被 URL 规范化丢弃，需要手工编码为 `%2E`。
fn product_location(id: &str) -> Result<String, CoreError> {
    if id == "." || id == ".." {
        return Ok(format!("{}/{}", PRODUCTS_PATH, id.replace('.', "%2E")));
    }

    let mut url = Url::parse("http://localhost")
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| CoreError::Validation("无法构造 Location".to_string()))?
        .pop_if_empty()
        .extend(["api", "products", id]);
    Ok(url.path().to_string())
}

/// 获取所有产品
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, CoreError> {
    let products = state.repository.list_all().await?;
    Ok(Json(products))
}

/// 获取特定产品
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, CoreError> {
    match state.repository.get_by_id(&id).await? {
        Some(product) => Ok(Json(product)),
        None => Err(CoreError::NotFound),
    }
}

/// 创建产品
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<Product>, JsonRejection>,
) -> Result<impl IntoResponse, CoreError> {
    let Json(product) = payload?;
    product.validate()?;
    let location = product_location(&product.id)?;

    state.repository.save(&product).await?;
    info!("产品 {} 已创建", product.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(product),
    ))
}

/// 更新产品
///
/// 路径 id 必须与请求体 id 完全一致，否则在访问存储之前直接拒绝。
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Product>, JsonRejection>,
) -> Result<StatusCode, CoreError> {
    let Json(product) = payload?;
    if id != product.id {
        return Err(CoreError::IdMismatch);
    }

    state.repository.save(&product).await?;
    info!("产品 {} 已更新", id);

    Ok(StatusCode::NO_CONTENT)
}

/// 删除产品
///
/// 先检查是否存在以便对未知 id 返回 404；检查与删除之间不是原子的。
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CoreError> {
    if state.repository.get_by_id(&id).await?.is_none() {
        return Err(CoreError::NotFound);
    }

    state.repository.delete_by_id(&id).await?;
    info!("产品 {} 已删除", id);

    Ok(StatusCode::NO_CONTENT)
}
