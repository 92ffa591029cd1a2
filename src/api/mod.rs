pub mod analytics;
pub mod creator;
pub mod error;
pub mod health;
pub mod response;

use crate::acquisition::Acquisition;
use crate::services::AnalyticsStore;

#[derive(Clone)]
pub struct AppState {
    pub acquisition: Acquisition,
    pub analytics: AnalyticsStore,
}
