// 抓取策略层
//
// 将互不兼容的几种上游获取方式（结构化 API、页面提取）收敛到同一个
// 多态接口背后，部署时只激活一种具体策略

pub mod api;
pub mod page;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use api::{ApiStrategy, EnvTokenProvider, TokenProvider};
pub use page::{Browser, ChromeBrowser, PageSession, PageStrategy};

/// 抓取阶段的错误分类
///
/// 归一化阶段从不失败，失败全部归属于这里
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("missing or rejected upstream credential: {0}")]
    Auth(String),

    #[error("creator not found: {0}")]
    NotFound(String),

    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("extraction failed: {0}")]
    Extraction(String),
}

/// 抓取策略接口
///
/// 两种具体策略暴露完全相同的两个操作；配置时选定一次，不按调用切换
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// 策略名，用于健康检查展示
    fn name(&self) -> &'static str;

    /// 抓取创作者资料的原始数据
    async fn fetch_profile(&self, username: &str) -> Result<RawProfile, FetchError>;

    /// 抓取创作者视频列表的原始数据，最多 `limit` 条
    ///
    /// 实际条目不足 `limit` 不是错误
    async fn fetch_videos(&self, username: &str, limit: usize) -> Result<Vec<RawVideo>, FetchError>;
}

/// 原始计数：上游可能给整数、浮点或 "12.3K" 这样的数量级字符串
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Int(i64),
    Float(f64),
    Text(String),
}

/// 原始时间戳：unix 秒或 ISO-8601 文本
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Unix(i64),
    Text(String),
}

/// 策略输出的原始资料形态
///
/// serde 别名吸收各上游形态对同一字段的不同拼写；所有字段都可缺失，
/// 缺失的默认值由归一化层统一处理
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProfile {
    #[serde(alias = "displayName", alias = "nickname")]
    pub display_name: Option<String>,

    #[serde(alias = "avatarUrl", alias = "profileImage")]
    pub avatar: Option<String>,

    #[serde(alias = "signature")]
    pub bio: Option<String>,

    #[serde(alias = "followerCount", alias = "fans")]
    pub followers: Option<RawCount>,

    #[serde(alias = "followingCount")]
    pub following: Option<RawCount>,

    #[serde(alias = "heartCount", alias = "totalLikes")]
    pub likes: Option<RawCount>,

    #[serde(alias = "isVerified")]
    pub verified: Option<bool>,
}

/// 策略输出的原始视频形态
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawVideo {
    #[serde(alias = "videoId")]
    pub id: Option<String>,

    #[serde(alias = "cover", alias = "thumbnailUrl")]
    pub thumbnail: Option<String>,

    #[serde(alias = "playCount", alias = "viewCount")]
    pub views: Option<RawCount>,

    #[serde(alias = "diggCount", alias = "likeCount")]
    pub likes: Option<RawCount>,

    #[serde(alias = "desc")]
    pub description: Option<String>,

    #[serde(alias = "createdAt", alias = "createTime")]
    pub created_at: Option<RawTimestamp>,
}
