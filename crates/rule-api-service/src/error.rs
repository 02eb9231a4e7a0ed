//! 规则 API 服务错误类型定义
//!
//! 所有失败响应的响应体统一为 `{"detail": <消息>}`，
//! 客户端据此提取错误消息展示。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::RuleError;
use serde_json::json;

/// 规则 API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 规则引擎错误（解析、类型、字段缺失等）
    #[error(transparent)]
    Engine(#[from] RuleError),

    // 请求参数错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 请求体无法解析
    #[error("请求体无效: {0}")]
    InvalidBody(String),

    // 系统错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 引擎报出的都是规则或数据本身的问题，按请求错误处理
            Self::Engine(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let detail = match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({ "detail": detail });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从请求体 JSON 解析拒绝转换
impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
