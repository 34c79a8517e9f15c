pub mod handlers;

pub use handlers::*;

use crate::db::DocumentStore;
use crate::service::BulkMaintenance;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 共享状态: 存储句柄 + 清理服务
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub maintenance: Arc<BulkMaintenance>,
    pub strict_availability: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, max_batch_size: usize, strict_availability: bool) -> Self {
        let maintenance = BulkMaintenance::new(store.clone()).with_batch_size(max_batch_size);
        Self {
            store,
            maintenance: Arc::new(maintenance),
            strict_availability,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/stats", post(compute_stats))
        .route("/api/dashboard", get(dashboard))
        .route("/api/reports/profit.csv", get(profit_report))
        .route("/api/maintenance/clear-financials", post(clear_financials))
        .with_state(state)
}
