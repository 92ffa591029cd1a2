// 采集编排器
//
// 对外的唯一入口：校验标识 → 查缓存 → 单飞去重 → 限流 → 抓取 →
// 归一化 → 回填缓存。并发调用同一标识时共享一次上游抓取

pub mod cache;
pub mod clock;
pub mod error;
pub mod rate_limit;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::models::validation::is_valid_username;
use crate::models::{CreatorData, CreatorProfile, Video};
use crate::normalize;
use crate::strategy::FetchStrategy;

pub use cache::ResultCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AcquireError;
pub use rate_limit::RateLimiter;

type Outcome = Result<CreatorData, AcquireError>;

/// 编排器配置
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub cache_ttl: Duration,
    pub rate_window: Duration,
    pub rate_max_requests: usize,
    pub video_limit: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            rate_window: Duration::from_secs(60),
            rate_max_requests: 10,
            video_limit: 12,
        }
    }
}

/// 缓存规模统计
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub profile_entries: usize,
    pub video_entries: usize,
}

/// 采集编排器
///
/// 显式构造、显式注入，不经任何全局状态；整个进程共享一个实例。
/// Clone 后仍共享同一套缓存、在飞表与限流状态
#[derive(Clone)]
pub struct Acquisition {
    strategy: Arc<dyn FetchStrategy>,
    profiles: ResultCache<CreatorProfile>,
    videos: ResultCache<Vec<Video>>,
    in_flight: Arc<Mutex<HashMap<String, broadcast::Sender<Outcome>>>>,
    limiter: RateLimiter,
    video_limit: usize,
}

impl Acquisition {
    pub fn new(
        strategy: Arc<dyn FetchStrategy>,
        config: AcquisitionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            strategy,
            profiles: ResultCache::new(config.cache_ttl, clock.clone()),
            videos: ResultCache::new(config.cache_ttl, clock.clone()),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            limiter: RateLimiter::new(config.rate_window, config.rate_max_requests, clock),
            video_limit: config.video_limit,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// 获取创作者数据（资料 + 视频列表）
    ///
    /// 命中缓存时直接返回，不消耗限流额度；未命中且已有同标识的抓取
    /// 在飞时挂入等待，与其共享同一结果
    pub async fn acquire(&self, username: &str, caller: &str) -> Outcome {
        if !is_valid_username(username) {
            return Err(AcquireError::InvalidIdentifier(username.to_string()));
        }
        let key = username.to_lowercase();

        if let Some(data) = self.cached(&key) {
            tracing::debug!("cache hit for creator {}", key);
            return Ok(data);
        }

        let waiter = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(tx) = in_flight.get(&key) {
                Some(tx.subscribe())
            } else {
                if !self.limiter.try_acquire(caller) {
                    tracing::debug!("rate limit tripped for caller {}", caller);
                    return Err(AcquireError::RateLimited);
                }
                let (tx, _rx) = broadcast::channel(1);
                in_flight.insert(key.clone(), tx);
                None
            }
        };

        match waiter {
            Some(mut rx) => match rx.recv().await {
                Ok(outcome) => outcome,
                Err(_) => Err(AcquireError::Transport(
                    "shared fetch settled without a result".to_string(),
                )),
            },
            None => self.lead_fetch(key, username).await,
        }
    }

    /// 作为在飞抓取的发起方执行抓取并结算所有等待者
    ///
    /// 抓取跑在独立任务里：发起方放弃等待也不会取消已被共享的抓取，
    /// 取消只来自策略自身的超时
    async fn lead_fetch(&self, key: String, username: &str) -> Outcome {
        let this = self.clone();
        let task_key = key.clone();
        let username = username.to_string();

        let handle = tokio::spawn(async move {
            let outcome = this.fetch_and_store(&task_key, &username).await;

            // 无论成败都要结算等待者并清掉在飞标记
            let mut in_flight = this.in_flight.lock().await;
            if let Some(tx) = in_flight.remove(&task_key) {
                let _ = tx.send(outcome.clone());
            }
            outcome
        });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                // 任务 panic 时结算块不会执行，由发起方清掉在飞标记；
                // 发送端随之丢弃，等待者的 recv 以错误结算而不是挂起
                let mut in_flight = self.in_flight.lock().await;
                in_flight.remove(&key);
                drop(in_flight);
                tracing::error!("fetch task for {} failed: {}", key, e);
                Err(AcquireError::Transport(format!("fetch task failed: {}", e)))
            }
        }
    }

    async fn fetch_and_store(&self, key: &str, username: &str) -> Outcome {
        let result = self.fetch_creator(username).await;
        match &result {
            Ok(data) => {
                self.profiles.set(profile_key(key), data.profile.clone());
                self.videos.set(videos_key(key), data.videos.clone());
                tracing::debug!("cached creator data for {}", key);
            }
            Err(e) => {
                // 失败不写缓存，并让既有条目失效，避免继续提供已知
                // 有问题的数据
                self.profiles.invalidate(&profile_key(key));
                self.videos.invalidate(&videos_key(key));
                tracing::warn!("fetch failed for {}: {}", key, e);
            }
        }
        result
    }

    async fn fetch_creator(&self, username: &str) -> Outcome {
        let raw_profile = self.strategy.fetch_profile(username).await?;
        let raw_videos = self.strategy.fetch_videos(username, self.video_limit).await?;
        let fetched_at = Utc::now();

        Ok(CreatorData {
            profile: normalize::profile(raw_profile, username),
            videos: normalize::videos(raw_videos, fetched_at, self.video_limit),
        })
    }

    fn cached(&self, key: &str) -> Option<CreatorData> {
        let profile = self.profiles.get(&profile_key(key))?;
        let videos = self.videos.get(&videos_key(key))?;
        Some(CreatorData { profile, videos })
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            profile_entries: self.profiles.len(),
            video_entries: self.videos.len(),
        }
    }

    pub fn cleanup_expired(&self) {
        self.profiles.cleanup_expired();
        self.videos.cleanup_expired();
    }

    pub fn clear_cache(&self) {
        self.profiles.clear();
        self.videos.clear();
    }
}

fn profile_key(key: &str) -> String {
    format!("profile:{}", key)
}

fn videos_key(key: &str) -> String {
    format!("videos:{}", key)
}

/// 定期清理过期缓存条目的后台任务
pub struct CacheCleanupTask {
    acquisition: Acquisition,
    interval: Duration,
}

impl CacheCleanupTask {
    pub fn new(acquisition: Acquisition, interval: Duration) -> Self {
        Self {
            acquisition,
            interval,
        }
    }

    /// 启动定期清理循环
    pub async fn start(self) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            self.acquisition.cleanup_expired();
            let stats = self.acquisition.cache_stats();
            tracing::debug!(
                "cache cleanup completed, profiles: {}, videos: {}",
                stats.profile_entries,
                stats.video_entries
            );
        }
    }
}
