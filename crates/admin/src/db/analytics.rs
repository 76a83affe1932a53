//! Order analytics repository.
//!
//! The `orders/paid` webhook records every paid order here: one immutable
//! row per order plus running totals per shop and per funnel. Queries use
//! the runtime sqlx API so builds need no live database.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// One paid order as extracted from the webhook payload.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_name: String,
    pub shop_domain: String,
    pub customer_email: Option<String>,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub line_items_count: i32,
    /// Funnel attribution from the order's first discount application
    /// title. That title is the discount message, not a stable id - a
    /// limitation inherited from how checkout reports applications.
    pub funnel_id: Option<String>,
    pub funnel_name: Option<String>,
}

/// Per-funnel counters.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FunnelPerformance {
    pub funnel_id: String,
    pub funnel_name: String,
    pub discounts_issued: i64,
    pub total_discount_amount: Decimal,
    pub orders_affected: i64,
}

/// A recently discounted order for the dashboard sidebar.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentOrder {
    pub order_name: String,
    pub discount_amount: Decimal,
    pub funnel_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated analytics for one shop.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_orders: i64,
    pub total_sales: Decimal,
    pub average_order_value: Decimal,
    pub total_discounts_issued: i64,
    pub total_discount_amount: Decimal,
    pub average_discount_amount: Decimal,
    pub orders_with_discounts: i64,
    /// Share of orders carrying a discount, in percent.
    pub discount_rate: f64,
    pub funnel_performance: Vec<FunnelPerformance>,
    pub recent_orders: Vec<RecentOrder>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct ShopTotalsRow {
    total_orders: i64,
    total_sales: Decimal,
    total_discounts_issued: i64,
    total_discount_amount: Decimal,
    last_updated: DateTime<Utc>,
}

/// Repository for order analytics.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record one paid order and update the running totals.
    ///
    /// Webhook deliveries retry, so the order row is keyed by `order_id`;
    /// a redelivered order is ignored and the totals are not double
    /// counted. Returns `true` when the order was newly recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn record_order(&self, order: &OrderRecord) -> Result<bool, RepositoryError> {
        let inserted = sqlx::query(
            r"
            INSERT INTO order_analytics
                (order_id, order_name, shop_domain, customer_email,
                 discount_amount, total_amount, line_items_count,
                 funnel_id, funnel_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (order_id) DO NOTHING
            ",
        )
        .bind(&order.order_id)
        .bind(&order.order_name)
        .bind(&order.shop_domain)
        .bind(&order.customer_email)
        .bind(order.discount_amount)
        .bind(order.total_amount)
        .bind(order.line_items_count)
        .bind(&order.funnel_id)
        .bind(&order.funnel_name)
        .execute(self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Ok(false);
        }

        self.bump_shop_totals(order).await?;

        if let (Some(funnel_id), Some(funnel_name)) = (&order.funnel_id, &order.funnel_name) {
            self.bump_funnel_performance(funnel_id, funnel_name, order)
                .await?;
        }

        Ok(true)
    }

    async fn bump_shop_totals(&self, order: &OrderRecord) -> Result<(), RepositoryError> {
        let discounted = i64::from(order.discount_amount > Decimal::ZERO);

        sqlx::query(
            r"
            INSERT INTO shop_analytics
                (shop_domain, total_orders, total_sales,
                 total_discounts_issued, total_discount_amount, last_updated)
            VALUES ($1, 1, $2, $3, $4, now())
            ON CONFLICT (shop_domain) DO UPDATE SET
                total_orders = shop_analytics.total_orders + 1,
                total_sales = shop_analytics.total_sales + EXCLUDED.total_sales,
                total_discounts_issued
                    = shop_analytics.total_discounts_issued + EXCLUDED.total_discounts_issued,
                total_discount_amount
                    = shop_analytics.total_discount_amount + EXCLUDED.total_discount_amount,
                last_updated = now()
            ",
        )
        .bind(&order.shop_domain)
        .bind(order.total_amount)
        .bind(discounted)
        .bind(order.discount_amount)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn bump_funnel_performance(
        &self,
        funnel_id: &str,
        funnel_name: &str,
        order: &OrderRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO funnel_performance
                (funnel_id, funnel_name, shop_domain,
                 discounts_issued, total_discount_amount, orders_affected, updated_at)
            VALUES ($1, $2, $3, 1, $4, 1, now())
            ON CONFLICT (funnel_id) DO UPDATE SET
                funnel_name = EXCLUDED.funnel_name,
                discounts_issued = funnel_performance.discounts_issued + 1,
                total_discount_amount
                    = funnel_performance.total_discount_amount + EXCLUDED.total_discount_amount,
                orders_affected = funnel_performance.orders_affected + 1,
                updated_at = now()
            ",
        )
        .bind(funnel_id)
        .bind(funnel_name)
        .bind(&order.shop_domain)
        .bind(order.discount_amount)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Build the dashboard summary for one shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn summary(&self, shop_domain: &str) -> Result<AnalyticsSummary, RepositoryError> {
        let totals = sqlx::query_as::<_, ShopTotalsRow>(
            r"
            SELECT total_orders, total_sales, total_discounts_issued,
                   total_discount_amount, last_updated
            FROM shop_analytics
            WHERE shop_domain = $1
            ",
        )
        .bind(shop_domain)
        .fetch_optional(self.pool)
        .await?;

        let funnel_performance = sqlx::query_as::<_, FunnelPerformance>(
            r"
            SELECT funnel_id, funnel_name, discounts_issued,
                   total_discount_amount, orders_affected
            FROM funnel_performance
            WHERE shop_domain = $1
            ORDER BY total_discount_amount DESC
            ",
        )
        .bind(shop_domain)
        .fetch_all(self.pool)
        .await?;

        let orders_with_discounts = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM order_analytics
            WHERE shop_domain = $1 AND discount_amount > 0
            ",
        )
        .bind(shop_domain)
        .fetch_one(self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, RecentOrder>(
            r"
            SELECT order_name, discount_amount, funnel_name, created_at
            FROM order_analytics
            WHERE shop_domain = $1 AND discount_amount > 0
            ORDER BY created_at DESC
            LIMIT 10
            ",
        )
        .bind(shop_domain)
        .fetch_all(self.pool)
        .await?;

        Ok(build_summary(
            totals,
            funnel_performance,
            orders_with_discounts,
            recent_orders,
        ))
    }

    /// Delete order rows older than the retention window.
    ///
    /// Running totals are intentionally untouched; only the per-order
    /// detail is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn cleanup_old(&self, retention_days: i64) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - Duration::days(retention_days);

        let deleted = sqlx::query("DELETE FROM order_analytics WHERE created_at < $1")
            .bind(cutoff)
            .execute(self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

fn build_summary(
    totals: Option<ShopTotalsRow>,
    funnel_performance: Vec<FunnelPerformance>,
    orders_with_discounts: i64,
    recent_orders: Vec<RecentOrder>,
) -> AnalyticsSummary {
    let (total_orders, total_sales, total_discounts_issued, total_discount_amount, last_updated) =
        totals.map_or(
            (0, Decimal::ZERO, 0, Decimal::ZERO, None),
            |t| {
                (
                    t.total_orders,
                    t.total_sales,
                    t.total_discounts_issued,
                    t.total_discount_amount,
                    Some(t.last_updated),
                )
            },
        );

    let average_order_value = if total_orders > 0 {
        total_sales / Decimal::from(total_orders)
    } else {
        Decimal::ZERO
    };
    let average_discount_amount = if total_discounts_issued > 0 {
        total_discount_amount / Decimal::from(total_discounts_issued)
    } else {
        Decimal::ZERO
    };
    #[allow(clippy::cast_precision_loss)]
    let discount_rate = if total_orders > 0 {
        (orders_with_discounts as f64 / total_orders as f64) * 100.0
    } else {
        0.0
    };

    AnalyticsSummary {
        total_orders,
        total_sales,
        average_order_value,
        total_discounts_issued,
        total_discount_amount,
        average_discount_amount,
        orders_with_discounts,
        discount_rate,
        funnel_performance,
        recent_orders,
        last_updated,
    }
}
