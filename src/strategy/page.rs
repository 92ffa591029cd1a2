// 页面提取策略
//
// 驱动无头浏览器加载创作者公开主页，等待关键内容标记出现后从渲染的
// DOM 中提取字段。选择器式提取天然脆弱，因此整段逻辑被隔离在策略
// 接口之后，可整体换成结构化 API 而不动编排器、归一化与缓存

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser as Chrome, LaunchOptions, Tab};

use crate::config::PageConfig;

use super::{FetchError, FetchStrategy, RawProfile, RawVideo};

// 上游页面的关键标记
const NOT_FOUND_SELECTOR: &str = r#"div[data-e2e="user-not-found"]"#;
const PROFILE_MARKER_SELECTOR: &str = r#"[data-e2e="followers-count"]"#;
const VIDEO_ITEM_SELECTOR: &str = r#"div[data-e2e="user-post-item"]"#;

// 资料提取脚本：返回 JSON 字符串，计数保持页面原样的数量级文本，
// 由归一化层解析
const PROFILE_SCRIPT: &str = r#"
JSON.stringify((() => {
    const text = (sel) => {
        const el = document.querySelector(sel);
        return el ? el.textContent.trim() : null;
    };
    const avatar = (() => {
        const img = document.querySelector('[data-e2e="user-avatar"] img');
        return img ? img.src : null;
    })();
    return {
        displayName: text('[data-e2e="user-subtitle"]') || text('[data-e2e="user-title"]'),
        bio: text('[data-e2e="user-bio"]'),
        followers: text('[data-e2e="followers-count"]'),
        following: text('[data-e2e="following-count"]'),
        likes: text('[data-e2e="likes-count"]'),
        verified: !!document.querySelector('[data-e2e="user-verified"]'),
        avatar: avatar,
    };
})())
"#;

// 视频列表提取脚本；点赞数在列表页不可见，留空交给归一化层估算
const VIDEOS_SCRIPT_TEMPLATE: &str = r#"
JSON.stringify((() => {
    const items = Array.from(document.querySelectorAll('div[data-e2e="user-post-item"]'))
        .slice(0, __LIMIT__);
    return items.map((item) => {
        const img = Array.from(item.querySelectorAll('img')).find((i) => i.src);
        const stat = item.querySelector('strong');
        const desc = item.querySelector('[data-e2e="user-post-item-desc"]')
            || item.querySelector('div[class*="desc"]');
        const time = item.querySelector('time');
        const link = item.querySelector('a');
        let id = null;
        if (link && link.href) {
            const last = link.href.split('/').filter(Boolean).pop();
            if (last) id = last;
        }
        return {
            id: id,
            thumbnail: img ? img.src : null,
            views: stat ? stat.textContent.trim() : null,
            description: desc ? desc.textContent.trim() : null,
            createdAt: time && time.dateTime ? time.dateTime : null,
        };
    });
})())
"#;

/// 一次已导航完成的页面会话
///
/// 实现方负责释放底层资源；策略保证每条执行路径都会调用 close
#[async_trait]
pub trait PageSession: Send + Sync {
    /// 等待选择器出现；Ok(false) 表示超时内未出现（不是硬失败）
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, FetchError>;

    /// 执行页面脚本；脚本须求值为 JSON 字符串
    async fn evaluate_json(&self, expression: &str) -> Result<serde_json::Value, FetchError>;

    /// 向下滚动一个视口高度，用于触发懒加载
    async fn scroll_by_viewport(&self) -> Result<(), FetchError>;

    async fn close(&self);
}

/// 无头浏览协作方接口
#[async_trait]
pub trait Browser: Send + Sync {
    /// 打开 URL 并等待导航完成
    async fn open(&self, url: &str, timeout: Duration) -> Result<Box<dyn PageSession>, FetchError>;
}

/// 页面提取抓取策略
pub struct PageStrategy {
    browser: Arc<dyn Browser>,
    config: PageConfig,
}

impl PageStrategy {
    pub fn new(browser: Arc<dyn Browser>, config: PageConfig) -> Self {
        Self { browser, config }
    }

    fn profile_url(username: &str) -> String {
        format!("https://www.tiktok.com/@{}", username)
    }

    async fn extract_profile(
        &self,
        page: &dyn PageSession,
        username: &str,
    ) -> Result<RawProfile, FetchError> {
        if !page
            .wait_for(PROFILE_MARKER_SELECTOR, self.config.marker_timeout)
            .await?
        {
            if page.wait_for(NOT_FOUND_SELECTOR, Duration::from_secs(2)).await? {
                return Err(FetchError::NotFound(username.to_string()));
            }
            // 标记始终未出现：按字段降级为空资料，而不是硬失败
            tracing::warn!("profile markers missing for {}, returning partial data", username);
            return Ok(RawProfile::default());
        }

        // 提取类失败同样降级为空资料；传输类失败仍然上抛
        let value = match page.evaluate_json(PROFILE_SCRIPT).await {
            Ok(value) => value,
            Err(FetchError::Extraction(msg)) => {
                tracing::warn!("profile extraction failed for {}: {}", username, msg);
                return Ok(RawProfile::default());
            }
            Err(e) => return Err(e),
        };
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    async fn extract_videos(
        &self,
        page: &dyn PageSession,
        username: &str,
        limit: usize,
    ) -> Result<Vec<RawVideo>, FetchError> {
        if !page
            .wait_for(VIDEO_ITEM_SELECTOR, self.config.marker_timeout)
            .await?
        {
            if page.wait_for(NOT_FOUND_SELECTOR, Duration::from_secs(2)).await? {
                return Err(FetchError::NotFound(username.to_string()));
            }
            // 没有视频是合法状态，不是错误
            tracing::warn!("no video items appeared for {}, treating as empty", username);
            return Ok(Vec::new());
        }

        // 有限滚动加载更多条目；实际不足 limit 不是错误
        for _ in 0..self.config.scroll_rounds {
            if let Err(e) = page.scroll_by_viewport().await {
                match e {
                    // 滚动失败只影响能加载多少，用已有的条目继续
                    FetchError::Extraction(msg) => {
                        tracing::warn!("scroll failed for {}: {}", username, msg);
                        break;
                    }
                    other => return Err(other),
                }
            }
            tokio::time::sleep(self.config.scroll_pause).await;
        }

        // 空视频列表是合法结果，提取类失败降级为空而不是报错
        let script = VIDEOS_SCRIPT_TEMPLATE.replace("__LIMIT__", &limit.to_string());
        let value = match page.evaluate_json(&script).await {
            Ok(value) => value,
            Err(FetchError::Extraction(msg)) => {
                tracing::warn!("video extraction failed for {}: {}", username, msg);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        Ok(serde_json::from_value(value).unwrap_or_default())
    }
}

#[async_trait]
impl FetchStrategy for PageStrategy {
    fn name(&self) -> &'static str {
        "page-derived"
    }

    async fn fetch_profile(&self, username: &str) -> Result<RawProfile, FetchError> {
        let url = Self::profile_url(username);
        let page = self.browser.open(&url, self.config.navigation_timeout).await?;
        let result = self.extract_profile(page.as_ref(), username).await;
        page.close().await;
        result
    }

    async fn fetch_videos(&self, username: &str, limit: usize) -> Result<Vec<RawVideo>, FetchError> {
        let url = Self::profile_url(username);
        let page = self.browser.open(&url, self.config.navigation_timeout).await?;
        let result = self.extract_videos(page.as_ref(), username, limit).await;
        page.close().await;
        result
    }
}

/// 基于 headless_chrome 的浏览协作方
///
/// 每次 open 启动独立的浏览器实例；CDP 调用是阻塞的，全部包进
/// spawn_blocking
#[derive(Debug, Default)]
pub struct ChromeBrowser;

struct ChromePage {
    // 保持浏览器进程存活到会话关闭
    _browser: Chrome,
    tab: Arc<Tab>,
}

impl ChromeBrowser {
    fn transport(context: &str, err: impl std::fmt::Display) -> FetchError {
        FetchError::Transport(format!("{}: {}", context, err))
    }
}

#[async_trait]
impl Browser for ChromeBrowser {
    async fn open(&self, url: &str, timeout: Duration) -> Result<Box<dyn PageSession>, FetchError> {
        let url = url.to_string();

        let page = tokio::task::spawn_blocking(move || -> Result<ChromePage, FetchError> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .window_size(Some((1920, 1080)))
                .build()
                .map_err(|e| Self::transport("failed to configure browser", e))?;
            let browser =
                Chrome::new(options).map_err(|e| Self::transport("failed to launch browser", e))?;
            let tab = browser
                .new_tab()
                .map_err(|e| Self::transport("failed to open tab", e))?;
            tab.set_default_timeout(timeout);
            tab.navigate_to(&url)
                .map_err(|e| Self::transport("navigation failed", e))?;
            tab.wait_until_navigated()
                .map_err(|e| Self::transport("navigation timed out", e))?;
            Ok(ChromePage {
                _browser: browser,
                tab,
            })
        })
        .await
        .map_err(|e| Self::transport("browser task failed", e))??;

        Ok(Box::new(page))
    }
}

#[async_trait]
impl PageSession for ChromePage {
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, FetchError> {
        let tab = self.tab.clone();
        let selector = selector.to_string();

        tokio::task::spawn_blocking(move || {
            tab.wait_for_element_with_custom_timeout(&selector, timeout)
                .is_ok()
        })
        .await
        .map_err(|e| ChromeBrowser::transport("browser task failed", e))
    }

    async fn evaluate_json(&self, expression: &str) -> Result<serde_json::Value, FetchError> {
        let tab = self.tab.clone();
        let expression = expression.to_string();

        let object = tokio::task::spawn_blocking(move || tab.evaluate(&expression, false))
            .await
            .map_err(|e| ChromeBrowser::transport("browser task failed", e))?
            .map_err(|e| FetchError::Extraction(format!("page script failed: {}", e)))?;

        match object.value {
            Some(serde_json::Value::String(text)) => serde_json::from_str(&text)
                .map_err(|e| FetchError::Extraction(format!("page script returned malformed JSON: {}", e))),
            Some(other) => Ok(other),
            None => Ok(serde_json::Value::Null),
        }
    }

    async fn scroll_by_viewport(&self) -> Result<(), FetchError> {
        let tab = self.tab.clone();

        tokio::task::spawn_blocking(move || {
            tab.evaluate("window.scrollBy(0, window.innerHeight)", false)
        })
        .await
        .map_err(|e| ChromeBrowser::transport("browser task failed", e))?
        .map_err(|e| FetchError::Extraction(format!("scroll failed: {}", e)))?;

        Ok(())
    }

    async fn close(&self) {
        let tab = self.tab.clone();
        let _ = tokio::task::spawn_blocking(move || tab.close(true)).await;
    }
}
