use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::acquisition::AcquireError;

/// 统一的API错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 请求参数错误
    BadRequest(String),
    /// 未找到资源
    NotFound(String),
    /// 请求频率超限
    RateLimited,
    /// 上游凭证缺失或被拒绝
    Auth(String),
    /// 上游服务错误
    Upstream(String),
    /// 网络或超时故障
    Transport(String),
    /// 内部服务器错误
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::RateLimited => write!(f, "Rate limit exceeded"),
            ApiError::Auth(msg) => write!(f, "Upstream auth error: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            ApiError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// 从采集层错误转换
impl From<AcquireError> for ApiError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::InvalidIdentifier(id) => {
                ApiError::BadRequest(format!("invalid username: {}", id))
            }
            AcquireError::NotFound(id) => ApiError::NotFound(format!("creator not found: {}", id)),
            AcquireError::RateLimited => ApiError::RateLimited,
            AcquireError::Auth(msg) => ApiError::Auth(msg),
            AcquireError::Upstream { status, .. } => {
                ApiError::Upstream(format!("upstream returned status {}", status))
            }
            AcquireError::Transport(msg) => ApiError::Transport(msg),
            // 提取失败对调用方来说就是上游给了坏数据
            AcquireError::Extraction(msg) => ApiError::Upstream(msg),
        }
    }
}

/// 实现IntoResponse，将错误转换为HTTP响应
///
/// retryable 告诉调用方稍后重试是否有意义：限流、上游故障和网络
/// 故障可重试，参数错误和资源不存在不可
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, retryable, message) = match self {
            ApiError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", false, msg.clone())
            }
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "not_found", false, msg.clone()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                true,
                "Too many requests, please retry later".to_string(),
            ),
            ApiError::Auth(ref msg) => {
                tracing::error!("Upstream auth error: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    "upstream_auth_error",
                    false,
                    "Upstream credential is missing or rejected".to_string(),
                )
            }
            ApiError::Upstream(ref msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "upstream_error", true, msg.clone())
            }
            ApiError::Transport(ref msg) => {
                tracing::error!("Transport error: {}", msg);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "transport_error",
                    true,
                    "Upstream did not respond in time".to_string(),
                )
            }
            ApiError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    false,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": message,
                "retryable": retryable,
            }
        }));

        (status, body).into_response()
    }
}

/// Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ApiError::NotFound("creator not found: jane".to_string());
        assert_eq!(error.to_string(), "Not found: creator not found: jane");
    }

    #[test]
    fn test_acquire_error_conversion() {
        let error: ApiError = AcquireError::RateLimited.into();
        assert!(matches!(error, ApiError::RateLimited));

        let error: ApiError = AcquireError::InvalidIdentifier("a".to_string()).into();
        assert!(matches!(error, ApiError::BadRequest(_)));

        let error: ApiError = AcquireError::Extraction("markers missing".to_string()).into();
        assert!(matches!(error, ApiError::Upstream(_)));
    }
}
