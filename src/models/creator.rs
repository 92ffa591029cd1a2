use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 创作者主页资料
///
/// 所有计数字段在上游缺失时默认为 0，不向调用方泄漏 null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    /// 上游唯一标识（比较时不区分大小写）
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub bio: String,
    pub followers: u64,
    /// 关注数，部分上游形态不提供
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following: Option<u64>,
    pub likes: u64,
    pub verified: bool,
}

/// 单条视频
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// 在同一次结果集内唯一
    pub id: String,
    pub thumbnail: String,
    pub views: u64,
    pub likes: u64,
    /// 上游未给出点赞数时，likes 由 views 估算得出
    pub likes_estimated: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// 采集层的完整返回：资料 + 视频列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorData {
    pub profile: CreatorProfile,
    pub videos: Vec<Video>,
}
