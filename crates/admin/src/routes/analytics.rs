//! Analytics dashboard routes.

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::db::{AnalyticsRepository, AnalyticsSummary};
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Per-funnel row for the dashboard table.
pub struct FunnelPerformanceView {
    pub funnel_name: String,
    pub discounts_issued: i64,
    pub total_discount_amount: String,
    pub orders_affected: i64,
}

/// Recently discounted order for the sidebar.
pub struct RecentOrderView {
    pub order_name: String,
    pub discount_amount: String,
    pub funnel_name: String,
    pub created_at: String,
}

/// Analytics dashboard page.
#[derive(Template)]
#[template(path = "analytics.html")]
pub struct AnalyticsTemplate {
    pub total_orders: i64,
    pub total_sales: String,
    pub average_order_value: String,
    pub total_discounts_issued: i64,
    pub total_discount_amount: String,
    pub average_discount_amount: String,
    pub orders_with_discounts: i64,
    pub discount_rate: f64,
    pub funnels: Vec<FunnelPerformanceView>,
    pub recent_orders: Vec<RecentOrderView>,
    pub last_updated: String,
}

impl From<AnalyticsSummary> for AnalyticsTemplate {
    fn from(summary: AnalyticsSummary) -> Self {
        Self {
            total_orders: summary.total_orders,
            total_sales: summary.total_sales.round_dp(2).to_string(),
            average_order_value: summary.average_order_value.round_dp(2).to_string(),
            total_discounts_issued: summary.total_discounts_issued,
            total_discount_amount: summary.total_discount_amount.round_dp(2).to_string(),
            average_discount_amount: summary.average_discount_amount.round_dp(2).to_string(),
            orders_with_discounts: summary.orders_with_discounts,
            discount_rate: (summary.discount_rate * 10.0).round() / 10.0,
            funnels: summary
                .funnel_performance
                .into_iter()
                .map(|f| FunnelPerformanceView {
                    funnel_name: f.funnel_name,
                    discounts_issued: f.discounts_issued,
                    total_discount_amount: f.total_discount_amount.round_dp(2).to_string(),
                    orders_affected: f.orders_affected,
                })
                .collect(),
            recent_orders: summary
                .recent_orders
                .into_iter()
                .map(|o| RecentOrderView {
                    order_name: o.order_name,
                    discount_amount: o.discount_amount.round_dp(2).to_string(),
                    funnel_name: o.funnel_name.unwrap_or_else(|| "Unknown".to_string()),
                    created_at: o.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect(),
            last_updated: summary
                .last_updated
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(dashboard))
        .route("/analytics.json", get(summary_json))
}

/// GET /analytics - dashboard page.
async fn dashboard(State(state): State<AppState>) -> Result<Response, AppError> {
    let repo = AnalyticsRepository::new(state.pool());
    let summary = repo.summary(&state.config().shopify.store).await?;

    let template = AnalyticsTemplate::from(summary);
    Ok(Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response())
}

/// GET /analytics.json - summary as JSON.
async fn summary_json(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>, AppError> {
    let repo = AnalyticsRepository::new(state.pool());
    let summary = repo.summary(&state.config().shopify.store).await?;
    Ok(Json(summary))
}
