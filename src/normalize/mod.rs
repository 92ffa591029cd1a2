// 归一化层
//
// 把任一策略产出的原始数据映射为内部 Creator/Video 模型。纯函数，
// 从不失败：畸形输入落到默认值，失败属于抓取阶段

pub mod magnitude;

use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};

use crate::models::{CreatorProfile, Video};
use crate::strategy::{RawCount, RawProfile, RawTimestamp, RawVideo};

pub use magnitude::parse_magnitude;

/// 上游未给出点赞数时按播放量估算的比例
///
/// 沿用既有启发值，无实证依据；作为策略选择保留，调用方可通过
/// `likes_estimated` 识别估算值
pub const LIKE_ESTIMATE_RATIO: f64 = 0.4;

/// 将原始资料归一化为 CreatorProfile
///
/// 文本字段缺失补空串，计数字段缺失补 0
pub fn profile(raw: RawProfile, username: &str) -> CreatorProfile {
    CreatorProfile {
        username: username.to_string(),
        display_name: raw.display_name.unwrap_or_default(),
        avatar: raw.avatar.unwrap_or_default(),
        bio: raw.bio.unwrap_or_default(),
        followers: count(raw.followers),
        following: raw.following.map(|c| count(Some(c))),
        likes: count(raw.likes),
        verified: raw.verified.unwrap_or(false),
    }
}

/// 将原始视频序列归一化，最多保留 `limit` 条
pub fn videos(raws: Vec<RawVideo>, fetched_at: DateTime<Utc>, limit: usize) -> Vec<Video> {
    raws.into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, raw)| video(raw, fetched_at, index))
        .collect()
}

fn video(raw: RawVideo, fetched_at: DateTime<Utc>, index: usize) -> Video {
    let thumbnail = raw.thumbnail.unwrap_or_default();
    let views = count(raw.views);

    let (likes, likes_estimated) = match raw.likes {
        Some(likes) => (count(Some(likes)), false),
        None => (((views as f64) * LIKE_ESTIMATE_RATIO).floor() as u64, true),
    };

    Video {
        id: synthesize_id(raw.id, &thumbnail, fetched_at, index),
        thumbnail,
        views,
        likes,
        likes_estimated,
        description: raw.description.unwrap_or_default(),
        created_at: raw
            .created_at
            .and_then(resolve_timestamp)
            .unwrap_or(fetched_at),
    }
}

fn count(raw: Option<RawCount>) -> u64 {
    match raw {
        None => 0,
        Some(RawCount::Int(n)) => n.max(0) as u64,
        Some(RawCount::Float(f)) if f > 0.0 => f.round() as u64,
        Some(RawCount::Float(_)) => 0,
        Some(RawCount::Text(text)) => parse_magnitude(&text),
    }
}

/// 视频 id 合成，优先级：显式 id > 缩略图 URL 的稳定哈希 > 抓取时间兜底
///
/// 兜底 id 带上条目在结果集内的序号，保证同一批内不重复；
/// 不保证跨抓取稳定，属已知局限
fn synthesize_id(
    explicit: Option<String>,
    thumbnail: &str,
    fetched_at: DateTime<Utc>,
    index: usize,
) -> String {
    if let Some(id) = explicit.filter(|id| !id.is_empty()) {
        return id;
    }
    if !thumbnail.is_empty() {
        let digest = Sha256::digest(thumbnail.as_bytes());
        return digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    }
    format!("t{}-{}", fetched_at.timestamp_millis(), index)
}

fn resolve_timestamp(raw: RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Unix(secs) => Utc.timestamp_opt(secs, 0).single(),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}
