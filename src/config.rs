// 进程配置
//
// 启动时从环境变量读取一次（.env 经 dotenv 加载），之后不再变化。
// 抓取策略在这里选定，运行期不按调用切换

use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// 抓取策略种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// 结构化 API（需要上游凭证）
    Api,
    /// 页面提取（无头浏览器）
    Page,
}

/// 结构化 API 策略配置
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
}

/// 页面提取策略配置
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// 整体导航超时
    pub navigation_timeout: Duration,
    /// 关键内容标记的等待超时
    pub marker_timeout: Duration,
    /// 提取前最多滚动几轮以加载更多条目
    pub scroll_rounds: usize,
    /// 相邻两轮滚动的间隔
    pub scroll_pause: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(60),
            marker_timeout: Duration::from_secs(10),
            scroll_rounds: 3,
            scroll_pause: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub strategy: StrategyKind,
    pub cache_ttl: Duration,
    pub rate_window: Duration,
    pub rate_max_requests: usize,
    pub video_limit: usize,
    pub api: ApiConfig,
    pub page: PageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let strategy_name = env_or("FETCH_STRATEGY", "page");
        let strategy = parse_strategy(&strategy_name)
            .with_context(|| format!("unknown FETCH_STRATEGY: {}", strategy_name))?;

        let base_url = env_or(
            "UPSTREAM_API_URL",
            "https://tiktok-profile-data.p.rapidapi.com",
        );
        let base_url = Url::parse(&base_url).context("invalid UPSTREAM_API_URL")?;

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            strategy,
            cache_ttl: Duration::from_secs(env_parse("CACHE_TTL_SECS", 300)),
            rate_window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 60)),
            rate_max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 10),
            video_limit: env_parse("VIDEO_LIMIT", 12),
            api: ApiConfig {
                base_url,
                request_timeout: Duration::from_secs(env_parse("UPSTREAM_TIMEOUT_SECS", 30)),
            },
            page: PageConfig::default(),
        })
    }
}

fn parse_strategy(name: &str) -> Option<StrategyKind> {
    match name {
        "api" => Some(StrategyKind::Api),
        "page" => Some(StrategyKind::Page),
        _ => None,
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
