use super::AppState;
use crate::db::{load_ledger_entries, load_orders};
use crate::error::{MaintenanceError, StoreError};
use crate::models::{ClearOptions, ClearReport, DashboardStats, LedgerEntry, Order};
use crate::service::{calculate_stats, date_range_for, write_profit_report, DateRange, DurationTag};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 请求体: 由调用方直接提供订单和账本
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub ledger_entries: Option<Vec<LedgerEntry>>,
    #[serde(default)]
    pub range_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub range_end: Option<DateTime<Utc>>,
    /// 未给出显式区间时按标签计算
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub duration: Option<String>,
}

/// 仪表盘响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub duration: &'static str,
    pub range: DateRange,
    pub stats: DashboardStats,
}

/// 清理响应体
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub report: Option<ClearReport>,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        if e.is_unavailable() {
            ApiError::Unavailable(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<MaintenanceError> for ApiError {
    fn from(e: MaintenanceError) -> Self {
        match e {
            MaintenanceError::Unavailable(_) => ApiError::Unavailable(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = ErrorResponse {
            success: false,
            message: format!("Error: {}", message),
        };
        (status, Json(body)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 对请求体中的数据做聚合
pub async fn compute_stats(
    body: Result<Json<StatsRequest>, JsonRejection>,
) -> Result<Json<DashboardStats>, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (start, end) = match (req.range_start, req.range_end, req.duration.as_deref()) {
        (None, None, Some(tag)) => {
            let range = date_range_for(DurationTag::from(tag));
            (Some(range.start), Some(range.end))
        }
        (start, end, _) => (start, end),
    };

    Ok(Json(calculate_stats(&req.orders, req.ledger_entries.as_deref(), start, end)))
}

/// 从存储加载订单和账本后聚合
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let tag = DurationTag::from(query.duration.as_deref().unwrap_or_default());
    let range = date_range_for(tag);

    let (orders, entries) = futures::try_join!(
        load_orders(state.store.as_ref()),
        load_ledger_entries(state.store.as_ref())
    )?;

    let stats = calculate_stats(&orders, Some(&entries), Some(range.start), Some(range.end));
    tracing::info!(
        "Dashboard {}: {} orders, {} ledger entries",
        tag.as_str(), orders.len(), entries.len()
    );

    Ok(Json(DashboardResponse {
        duration: tag.as_str(),
        range,
        stats,
    }))
}

/// 订单利润明细 CSV
pub async fn profit_report(State(state): State<AppState>) -> Result<Response, ApiError> {
    let orders = load_orders(state.store.as_ref()).await?;

    let mut buf = Vec::new();
    write_profit_report(&orders, &mut buf).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], buf).into_response())
}

/// 批量清理财务数据 (请求体可省略, 省略的开关取默认值)
pub async fn clear_financials(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClearResponse>, ApiError> {
    let options = parse_clear_options(&body)?;

    if state.strict_availability {
        let report = state.maintenance.clear_financials(options).await?;
        return Ok(Json(cleared(report)));
    }

    match state.maintenance.clear_financials_lenient(options).await? {
        Some(report) => Ok(Json(cleared(report))),
        None => Ok(Json(ClearResponse {
            success: false,
            message: "Document store unavailable, nothing was cleared".to_string(),
            report: None,
        })),
    }
}

/// 仅空请求体取默认开关; 非空请求体不论 Content-Type 都按 JSON 解析, 解析失败即拒绝
fn parse_clear_options(body: &[u8]) -> Result<ClearOptions, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ClearOptions::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid clear options: {}", e)))
}

fn cleared(report: ClearReport) -> ClearResponse {
    ClearResponse {
        success: true,
        message: format!(
            "Cleared {} documents and reset {} orders in {} batches",
            report.documents_deleted, report.orders_reset, report.batches_committed
        ),
        report: Some(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_means_default_options() {
        assert_eq!(parse_clear_options(b"").unwrap(), ClearOptions::default());
        assert_eq!(parse_clear_options(b" \n ").unwrap(), ClearOptions::default());
    }

    #[test]
    fn explicit_switches_are_kept() {
        let opts = parse_clear_options(br#"{"clearLedger":false,"clearInvestment":false}"#).unwrap();
        assert!(!opts.clear_ledger);
        assert!(!opts.clear_investment);
        assert!(opts.clear_party_payments);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(parse_clear_options(b"clearLedger=false"), Err(ApiError::BadRequest(_))));
    }
}
