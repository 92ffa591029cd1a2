// 结构化 API 策略
//
// 走稳定的上游 API，带 bearer 凭证；凭证的获取与刷新由外部提供方
// 负责，这里只消费

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::ApiConfig;

use super::{FetchError, FetchStrategy, RawProfile, RawVideo};

/// 凭证提供方接口（令牌刷新流程不在本仓库范围内）
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// 从环境变量读取凭证的提供方
#[derive(Debug, Default)]
pub struct EnvTokenProvider;

impl TokenProvider for EnvTokenProvider {
    fn access_token(&self) -> Option<String> {
        std::env::var("UPSTREAM_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
    }
}

/// 结构化 API 抓取策略
pub struct ApiStrategy {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

/// 视频列表端点的两种返回形态：裸数组或包一层
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VideoListPayload {
    List(Vec<RawVideo>),
    Wrapped { videos: Vec<RawVideo> },
}

impl ApiStrategy {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn token(&self) -> Result<String, FetchError> {
        self.tokens
            .access_token()
            .ok_or_else(|| FetchError::Auth("no access token configured".to_string()))
    }

    async fn check_status(
        username: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(username.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Auth(format!(
                "upstream rejected credential ({})",
                status
            ))),
            _ if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(FetchError::Upstream {
                    status: status.as_u16(),
                    body,
                })
            }
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl FetchStrategy for ApiStrategy {
    fn name(&self) -> &'static str {
        "structured-api"
    }

    async fn fetch_profile(&self, username: &str) -> Result<RawProfile, FetchError> {
        let token = self.token()?;
        let url = format!("{}/profile/{}", self.base_url, username);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(FetchError::from)?;
        let response = Self::check_status(username, response).await?;
        let status = response.status().as_u16();

        response
            .json::<RawProfile>()
            .await
            .map_err(|e| FetchError::Upstream {
                status,
                body: format!("malformed profile payload: {}", e),
            })
    }

    async fn fetch_videos(&self, username: &str, limit: usize) -> Result<Vec<RawVideo>, FetchError> {
        let token = self.token()?;
        let url = format!("{}/videos/{}", self.base_url, username);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(FetchError::from)?;
        let response = Self::check_status(username, response).await?;
        let status = response.status().as_u16();

        let payload = response
            .json::<VideoListPayload>()
            .await
            .map_err(|e| FetchError::Upstream {
                status,
                body: format!("malformed video payload: {}", e),
            })?;

        let mut videos = match payload {
            VideoListPayload::List(videos) => videos,
            VideoListPayload::Wrapped { videos } => videos,
        };
        videos.truncate(limit);
        Ok(videos)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            FetchError::Transport(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Upstream {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
