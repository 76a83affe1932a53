//! Automatic app discount bootstrap.
//!
//! The checkout function only runs while an automatic app discount points at
//! it. Exactly one such discount ("Funnel Discounts") is expected per shop;
//! it is created lazily the first time a funnel is saved.

use super::queries::{self, CreateAutomaticDiscountData, SearchDiscountsData};
use super::{AdminClient, AdminShopifyError};

/// Title of the single automatic discount owned by this app.
pub const AUTOMATIC_DISCOUNT_TITLE: &str = "Funnel Discounts";

/// Ensure the shop has the app's automatic discount, creating it if absent.
///
/// Returns `true` when a discount was created, `false` when one already
/// existed.
///
/// # Errors
///
/// Returns `AdminShopifyError::UserError` when the create mutation reports
/// invalid input, or a transport error from either call. Callers treat
/// failure as non-fatal: funnel data is saved regardless, and the bootstrap
/// retries on the next save.
pub async fn ensure_automatic_discount(
    client: &AdminClient,
    function_id: &str,
) -> Result<bool, AdminShopifyError> {
    let search: SearchDiscountsData = client
        .execute(
            queries::SEARCH_DISCOUNTS,
            serde_json::json!({
                "query": format!("title:'{AUTOMATIC_DISCOUNT_TITLE}'"),
                "first": 1,
            }),
        )
        .await?;

    if !search.discount_nodes.edges.is_empty() {
        return Ok(false);
    }

    let variables = serde_json::json!({
        "automaticAppDiscount": {
            "title": AUTOMATIC_DISCOUNT_TITLE,
            "functionId": function_id,
            "startsAt": chrono::Utc::now().to_rfc3339(),
            "discountClasses": ["ORDER", "PRODUCT"],
            "combinesWith": {
                "orderDiscounts": true,
                "productDiscounts": true,
                "shippingDiscounts": false,
            },
        }
    });

    let created: CreateAutomaticDiscountData = client
        .execute(queries::CREATE_AUTOMATIC_DISCOUNT, variables)
        .await?;

    if let Some(first) = created.discount_automatic_app_create.user_errors.first() {
        return Err(AdminShopifyError::UserError(first.describe()));
    }

    tracing::info!(title = AUTOMATIC_DISCOUNT_TITLE, "Automatic discount created");
    Ok(true)
}
