use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::services::AnalyticsEvent;

use super::error::{ApiError, ApiResult};
use super::response::{success, success_message};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    #[serde(rename = "type")]
    pub event_type: String,
}

/// 获取访问统计汇总
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(success(state.analytics.summary()))
}

/// 记录一次访问事件
pub async fn record_event(
    State(state): State<AppState>,
    Json(request): Json<RecordEventRequest>,
) -> ApiResult<impl IntoResponse> {
    let event = match request.event_type.as_str() {
        "view" => AnalyticsEvent::View,
        "share" => AnalyticsEvent::Share,
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown event type: {}",
                other
            )))
        }
    };

    state.analytics.record(event);
    Ok(success_message("Event recorded"))
}
