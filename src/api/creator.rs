use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::response::success;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatorQuery {
    pub username: Option<String>,
}

/// 获取创作者资料与近期视频
pub async fn get_creator(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CreatorQuery>,
) -> ApiResult<impl IntoResponse> {
    let username = query
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("username parameter is required".to_string()))?;

    let caller = client_identity(&headers);
    tracing::info!("creator request for {} from {}", username, caller);

    let data = state.acquisition.acquire(username, &caller).await?;
    Ok(success(data))
}

/// 限流用的调用方标识
///
/// 取 x-forwarded-for 的第一跳；拿不到就归入同一个匿名桶
fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "anonymous".to_string())
}
