use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use creator_viewer_backend::acquisition::{
    Acquisition, AcquisitionConfig, CacheCleanupTask, SystemClock,
};
use creator_viewer_backend::api::{self, AppState};
use creator_viewer_backend::config::{AppConfig, StrategyKind};
use creator_viewer_backend::services::AnalyticsStore;
use creator_viewer_backend::strategy::api::{ApiStrategy, EnvTokenProvider};
use creator_viewer_backend::strategy::page::{ChromeBrowser, PageStrategy};
use creator_viewer_backend::strategy::FetchStrategy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    // 抓取策略在启动时选定，整个进程只用一种
    let strategy: Arc<dyn FetchStrategy> = match config.strategy {
        StrategyKind::Api => Arc::new(ApiStrategy::new(
            &config.api,
            Arc::new(EnvTokenProvider::default()),
        )?),
        StrategyKind::Page => Arc::new(PageStrategy::new(
            Arc::new(ChromeBrowser::default()),
            config.page.clone(),
        )),
    };
    tracing::info!("using fetch strategy: {}", strategy.name());

    let acquisition = Acquisition::new(
        strategy,
        AcquisitionConfig {
            cache_ttl: config.cache_ttl,
            rate_window: config.rate_window,
            rate_max_requests: config.rate_max_requests,
            video_limit: config.video_limit,
        },
        Arc::new(SystemClock),
    );

    // Start cache cleanup task
    let cleanup_task = CacheCleanupTask::new(
        acquisition.clone(),
        Duration::from_secs(5 * 60), // 每5分钟清理一次
    );
    tokio::spawn(cleanup_task.start());

    let state = AppState {
        acquisition,
        analytics: AnalyticsStore::new(),
    };

    // Build our application with routes
    let app = Router::new()
        .route("/", get(|| async { "Creator Viewer Backend API v1.0" }))
        // Health and stats
        .route("/api/health", get(api::health::health_check))
        .route("/api/stats", get(api::health::get_stats))
        .route("/api/cache/cleanup", post(api::health::cleanup_cache))
        .route("/api/cache/clear", post(api::health::clear_cache))
        // Creator data
        .route("/api/creator", get(api::creator::get_creator))
        // Analytics
        .route(
            "/api/analytics",
            get(api::analytics::get_summary).post(api::analytics::record_event),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
