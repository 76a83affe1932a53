//! Storefront-facing JSON API.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use funnelkit_core::types::DiscountTier;

use crate::error::AppError;
use crate::shopify::{AdminShopifyError, FunnelStore};
use crate::state::AppState;

/// Build the storefront API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/check-discount", post(check_discount))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDiscountRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct FunnelBanner {
    pub name: String,
    pub banner_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDiscountResponse {
    pub has_discount: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funnel: Option<FunnelBanner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<DiscountTier>>,
}

impl CheckDiscountResponse {
    const fn none() -> Self {
        Self {
            has_discount: false,
            funnel: None,
            tiers: None,
        }
    }
}

/// POST /api/check-discount - product page widget lookup.
///
/// Returns the first funnel containing the product, matching the order the
/// checkout function scans in. Not being connected to Shopify yet is the
/// same as having no funnels.
async fn check_discount(
    State(state): State<AppState>,
    Json(request): Json<CheckDiscountRequest>,
) -> Result<Json<CheckDiscountResponse>, AppError> {
    let store = FunnelStore::new(state.shopify());

    let funnels = match store.load().await {
        Ok(snapshot) => snapshot.funnels,
        Err(AdminShopifyError::NoAccessToken) => vec![],
        Err(e) => return Err(e.into()),
    };

    let hit = funnels
        .iter()
        .find(|f| f.products.iter().any(|p| p.as_str() == request.product_id));

    let response = hit.map_or_else(CheckDiscountResponse::none, |funnel| {
        CheckDiscountResponse {
            has_discount: true,
            funnel: Some(FunnelBanner {
                name: funnel.name.clone(),
                banner_text: funnel.banner_text.clone(),
            }),
            tiers: Some(funnel.discount_settings.quantity_tiers.clone()),
        }
    });

    Ok(Json(response))
}
