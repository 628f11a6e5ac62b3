//! 核心错误处理模块

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::infrastructure::store::StoreError;

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// 资源不存在，响应体为空
    #[error("资源不存在")]
    NotFound,
    /// 路径 id 与请求体 id 不一致，响应体为空
    #[error("路径 id 与请求体 id 不一致")]
    IdMismatch,
    #[error("请求无效: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(status: StatusCode, error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl From<JsonRejection> for CoreError {
    fn from(rejection: JsonRejection) -> Self {
        CoreError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| {
                errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| "参数校验失败".to_string())
                })
            })
            .collect();

        CoreError::Validation(messages.join(", "))
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        match self {
            CoreError::NotFound => StatusCode::NOT_FOUND.into_response(),
            CoreError::IdMismatch => StatusCode::BAD_REQUEST.into_response(),
            CoreError::Validation(msg) => {
                let status = StatusCode::BAD_REQUEST;
                (status, axum::Json(ErrorResponse::new(status, "BAD_REQUEST", msg))).into_response()
            }
            CoreError::Storage(err) => {
                error!("存储访问失败: {:?}", err);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ErrorResponse::new(
                    status,
                    "INTERNAL_SERVER_ERROR",
                    "存储服务暂时不可用".to_string(),
                );
                (status, axum::Json(body)).into_response()
            }
        }
    }
}
