use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use super::error::ApiResult;
use super::response::success;
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(success(json!({
        "status": "healthy",
        "strategy": state.acquisition.strategy_name(),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// 获取系统统计信息
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let cache_stats = state.acquisition.cache_stats();

    Ok(success(json!({
        "cache": {
            "profile_entries": cache_stats.profile_entries,
            "video_entries": cache_stats.video_entries,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// 清理过期缓存条目
pub async fn cleanup_cache(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.acquisition.cleanup_expired();

    Ok(success(json!({
        "message": "Cache cleanup completed",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// 清空所有缓存
pub async fn clear_cache(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.acquisition.clear_cache();

    Ok(success(json!({
        "message": "All caches cleared",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
