// 创作者主页查看服务后端
//
// 分层：api 暴露 HTTP 端点，acquisition 负责缓存/去重/限流编排，
// strategy 提供可替换的上游抓取方式，normalize 把上游形态不一的
// 原始数据收敛成统一模型

pub mod acquisition;
pub mod api;
pub mod config;
pub mod models;
pub mod normalize;
pub mod services;
pub mod strategy;
