// 采集编排器集成测试
//
// 用脚本化策略替身驱动完整的 校验→缓存→单飞→限流→归一化 链路

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use creator_viewer_backend::acquisition::{
    Acquisition, AcquisitionConfig, AcquireError, SystemClock,
};
use creator_viewer_backend::strategy::{
    FetchError, FetchStrategy, RawCount, RawProfile, RawVideo,
};

/// 计数并可注入失败的策略替身
struct MockStrategy {
    profile_calls: AtomicUsize,
    video_calls: AtomicUsize,
    fail_with: Option<FetchError>,
}

impl MockStrategy {
    fn ok() -> Self {
        Self {
            profile_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    fn failing(err: FetchError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::ok()
        }
    }
}

#[async_trait]
impl FetchStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_profile(&self, username: &str) -> Result<RawProfile, FetchError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        // 给并发调用留出重叠窗口
        tokio::time::sleep(Duration::from_millis(20)).await;

        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }

        Ok(RawProfile {
            display_name: Some(format!("Creator {}", username)),
            bio: Some("hello".to_string()),
            followers: Some(RawCount::Text("2.1M".to_string())),
            likes: Some(RawCount::Text("50K".to_string())),
            verified: Some(true),
            ..RawProfile::default()
        })
    }

    async fn fetch_videos(&self, _username: &str, _limit: usize) -> Result<Vec<RawVideo>, FetchError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }

        Ok(vec![RawVideo {
            id: Some("v1".to_string()),
            thumbnail: Some("https://cdn.example.com/1.jpg".to_string()),
            views: Some(RawCount::Int(1000)),
            ..RawVideo::default()
        }])
    }
}

fn acquisition(strategy: Arc<MockStrategy>) -> Acquisition {
    Acquisition::new(
        strategy,
        AcquisitionConfig::default(),
        Arc::new(SystemClock),
    )
}

#[tokio::test]
async fn test_end_to_end_normalization() {
    let strategy = Arc::new(MockStrategy::ok());
    let acq = acquisition(strategy);

    let data = acq.acquire("jane_doe", "caller-1").await.unwrap();

    assert_eq!(data.profile.username, "jane_doe");
    assert_eq!(data.profile.display_name, "Creator jane_doe");
    assert_eq!(data.profile.followers, 2_100_000);
    assert_eq!(data.profile.likes, 50_000);
    assert!(data.profile.verified);

    assert_eq!(data.videos.len(), 1);
    assert_eq!(data.videos[0].views, 1000);
    // 列表页拿不到点赞数，按浏览量的四成估算
    assert_eq!(data.videos[0].likes, 400);
    assert!(data.videos[0].likes_estimated);
}

#[tokio::test]
async fn test_cache_hit_skips_upstream() {
    let strategy = Arc::new(MockStrategy::ok());
    let acq = acquisition(strategy.clone());

    let first = acq.acquire("jane_doe", "caller-1").await.unwrap();
    // 大小写不同的标识命中同一条缓存
    let second = acq.acquire("Jane_Doe", "caller-1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(strategy.profile_calls.load(Ordering::SeqCst), 1);
    assert_eq!(strategy.video_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let strategy = Arc::new(MockStrategy::ok());
    let acq = acquisition(strategy.clone());

    let (a, b, c) = tokio::join!(
        acq.acquire("jane_doe", "caller-1"),
        acq.acquire("jane_doe", "caller-2"),
        acq.acquire("jane_doe", "caller-3"),
    );

    let a = a.unwrap();
    assert_eq!(a, b.unwrap());
    assert_eq!(a, c.unwrap());
    assert_eq!(strategy.profile_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_identifier_rejected_before_upstream() {
    let strategy = Arc::new(MockStrategy::ok());
    let acq = acquisition(strategy.clone());

    let err = acq.acquire("a", "caller-1").await.unwrap_err();
    assert!(matches!(err, AcquireError::InvalidIdentifier(_)));

    let err = acq.acquire("has space", "caller-1").await.unwrap_err();
    assert!(matches!(err, AcquireError::InvalidIdentifier(_)));

    assert_eq!(strategy.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rate_limit_per_caller() {
    let strategy = Arc::new(MockStrategy::ok());
    let acq = acquisition(strategy);

    for i in 0..10 {
        acq.acquire(&format!("creator_{}", i), "caller-1")
            .await
            .unwrap();
    }

    // 第 11 次冷请求触发限流
    let err = acq.acquire("creator_10", "caller-1").await.unwrap_err();
    assert_eq!(err, AcquireError::RateLimited);

    // 命中缓存的请求不占额度
    let cached = acq.acquire("creator_0", "caller-1").await;
    assert!(cached.is_ok());

    // 其他调用方不受影响
    let other = acq.acquire("creator_10", "caller-2").await;
    assert!(other.is_ok());
}

#[tokio::test]
async fn test_failure_propagates_and_is_not_cached() {
    let strategy = Arc::new(MockStrategy::failing(FetchError::NotFound(
        "jane_doe".to_string(),
    )));
    let acq = acquisition(strategy.clone());

    let err = acq.acquire("jane_doe", "caller-1").await.unwrap_err();
    assert_eq!(err, AcquireError::NotFound("jane_doe".to_string()));

    // 失败不会进缓存，重试会再次打到上游
    let err = acq.acquire("jane_doe", "caller-1").await.unwrap_err();
    assert_eq!(err, AcquireError::NotFound("jane_doe".to_string()));
    assert_eq!(strategy.profile_calls.load(Ordering::SeqCst), 2);
}

/// 每次调用都 panic 的策略替身
struct PanickingStrategy;

#[async_trait]
impl FetchStrategy for PanickingStrategy {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn fetch_profile(&self, _username: &str) -> Result<RawProfile, FetchError> {
        panic!("strategy blew up");
    }

    async fn fetch_videos(&self, _username: &str, _limit: usize) -> Result<Vec<RawVideo>, FetchError> {
        panic!("strategy blew up");
    }
}

#[tokio::test]
async fn test_panicking_fetch_does_not_wedge_identifier() {
    let acq = Acquisition::new(
        Arc::new(PanickingStrategy),
        AcquisitionConfig::default(),
        Arc::new(SystemClock),
    );

    let err = acq.acquire("jane_doe", "caller-1").await.unwrap_err();
    assert!(matches!(err, AcquireError::Transport(_)));

    // 在飞标记已被清掉，后续同标识请求照常走完而不是永远挂起
    let retry = tokio::time::timeout(
        Duration::from_secs(2),
        acq.acquire("jane_doe", "caller-1"),
    )
    .await
    .expect("retry must settle, not hang");
    assert!(matches!(retry.unwrap_err(), AcquireError::Transport(_)));
}

#[tokio::test]
async fn test_waiters_share_failure() {
    let strategy = Arc::new(MockStrategy::failing(FetchError::Transport(
        "connection reset".to_string(),
    )));
    let acq = acquisition(strategy.clone());

    let (a, b) = tokio::join!(
        acq.acquire("jane_doe", "caller-1"),
        acq.acquire("jane_doe", "caller-2"),
    );

    assert!(matches!(a.unwrap_err(), AcquireError::Transport(_)));
    assert!(matches!(b.unwrap_err(), AcquireError::Transport(_)));
    assert_eq!(strategy.profile_calls.load(Ordering::SeqCst), 1);
}
