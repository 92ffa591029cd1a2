// 采集层错误分类
//
// 抓取阶段的错误在这里重新归类为对外的统一分类；所有变体可克隆，
// 同一结果要广播给全部等待者

use thiserror::Error;

use crate::strategy::FetchError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AcquireError {
    /// 调用方给出的标识格式非法
    #[error("invalid creator identifier: {0}")]
    InvalidIdentifier(String),

    /// 上游确认创作者不存在
    #[error("creator not found: {0}")]
    NotFound(String),

    /// 本地限流触发，未发起任何上游调用
    #[error("request rate limit exceeded")]
    RateLimited,

    /// 凭证缺失或被上游拒绝
    #[error("missing or rejected upstream credential: {0}")]
    Auth(String),

    /// 上游可达但返回错误状态或坏负载
    #[error("upstream error (status {status})")]
    Upstream { status: u16, body: String },

    /// 网络或超时故障
    #[error("transport failure: {0}")]
    Transport(String),

    /// 页面提取未找到预期数据
    #[error("extraction failed: {0}")]
    Extraction(String),
}

impl From<FetchError> for AcquireError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Auth(msg) => AcquireError::Auth(msg),
            FetchError::NotFound(id) => AcquireError::NotFound(id),
            FetchError::Upstream { status, body } => AcquireError::Upstream { status, body },
            FetchError::Transport(msg) => AcquireError::Transport(msg),
            FetchError::Extraction(msg) => AcquireError::Extraction(msg),
        }
    }
}
