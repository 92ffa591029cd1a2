// 访问统计服务
//
// 进程内计数器：总量 + 最近 7 天的按日明细。重启即归零，够展示用，
// 不承诺持久化

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

/// 可记录的事件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    View,
    Share,
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCounters {
    pub views: u64,
    pub shares: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub views: u64,
    pub shares: u64,
}

/// 汇总视图
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub views: u64,
    pub shares: u64,
    /// 分享数占浏览数的百分比，浏览为零时为零
    pub engagement: f64,
    pub daily_stats: Vec<DailyStat>,
}

#[derive(Debug, Default)]
struct AnalyticsInner {
    views: u64,
    shares: u64,
    daily: BTreeMap<NaiveDate, DayCounters>,
}

/// 线程安全的统计存储，Clone 共享同一份计数
#[derive(Debug, Default, Clone)]
pub struct AnalyticsStore {
    inner: Arc<Mutex<AnalyticsInner>>,
}

impl AnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: AnalyticsEvent) {
        self.record_at(event, Utc::now().date_naive());
    }

    fn record_at(&self, event: AnalyticsEvent, date: NaiveDate) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        let day = inner.daily.entry(date).or_default();
        match event {
            AnalyticsEvent::View => {
                day.views += 1;
                inner.views += 1;
            }
            AnalyticsEvent::Share => {
                day.shares += 1;
                inner.shares += 1;
            }
        }

        // 只保留最近 7 天的明细，总量不受影响
        let cutoff = date - Duration::days(6);
        inner.daily.retain(|day, _| *day >= cutoff);
    }

    pub fn summary(&self) -> AnalyticsSummary {
        let inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };

        let engagement = if inner.views > 0 {
            inner.shares as f64 * 100.0 / inner.views as f64
        } else {
            0.0
        };

        AnalyticsSummary {
            views: inner.views,
            shares: inner.shares,
            engagement,
            daily_stats: inner
                .daily
                .iter()
                .map(|(date, counters)| DailyStat {
                    date: *date,
                    views: counters.views,
                    shares: counters.shares,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(text: &str) -> NaiveDate {
        text.parse().unwrap()
    }

    #[test]
    fn test_record_and_summarize() {
        let store = AnalyticsStore::new();
        store.record_at(AnalyticsEvent::View, day("2026-08-30"));
        store.record_at(AnalyticsEvent::View, day("2026-08-30"));
        store.record_at(AnalyticsEvent::Share, day("2026-08-30"));

        let summary = store.summary();
        assert_eq!(summary.views, 2);
        assert_eq!(summary.shares, 1);
        assert_eq!(summary.engagement, 50.0);
        assert_eq!(summary.daily_stats.len(), 1);
        assert_eq!(summary.daily_stats[0].views, 2);
    }

    #[test]
    fn test_zero_views_engagement() {
        let store = AnalyticsStore::new();
        store.record_at(AnalyticsEvent::Share, day("2026-08-30"));
        assert_eq!(store.summary().engagement, 0.0);
    }

    #[test]
    fn test_daily_detail_pruned_to_seven_days() {
        let store = AnalyticsStore::new();
        store.record_at(AnalyticsEvent::View, day("2026-08-01"));
        store.record_at(AnalyticsEvent::View, day("2026-08-10"));

        let summary = store.summary();
        assert_eq!(summary.views, 2, "totals survive pruning");
        assert_eq!(summary.daily_stats.len(), 1);
        assert_eq!(summary.daily_stats[0].date, day("2026-08-10"));
    }

    #[test]
    fn test_clone_shares_counters() {
        let store = AnalyticsStore::new();
        let other = store.clone();
        other.record_at(AnalyticsEvent::View, day("2026-08-30"));
        assert_eq!(store.summary().views, 1);
    }
}
