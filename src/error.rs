//! 业务错误定义
//!
//! 领域层统一返回 [`AppError`]，HTTP 层据此映射状态码。
//! 存储层错误（anyhow）只写入日志，不会把细节返回给调用方。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 缺少或无效的必填字段
    #[error("{0}")]
    Validation(String),

    /// 时间/日期字符串格式错误
    #[error("{0}")]
    Format(String),

    /// 引用的实体不存在
    #[error("{0}")]
    NotFound(String),

    /// 状态前置条件不满足（时段已被预订、邮箱重复等）
    #[error("{0}")]
    Conflict(String),

    /// 登录凭证错误
    #[error("{0}")]
    Unauthorized(String),

    /// 底层存储操作失败
    #[error("persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Format(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Persistence(e) => {
                error!("存储操作失败: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
