pub mod analytics;

pub use analytics::{AnalyticsEvent, AnalyticsStore, AnalyticsSummary};
