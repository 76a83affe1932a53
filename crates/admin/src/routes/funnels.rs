//! Funnel CRUD routes.
//!
//! Funnels live in the shop metafield, so every handler works through
//! [`FunnelStore`]: read the snapshot, derive a new one, write it back.

use askama::Template;
use axum::{
    Router,
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use funnelkit_core::types::Funnel;

use crate::error::AppError;
use crate::filters;
use crate::shopify::{
    AdminShopifyError, FunnelForm, FunnelStore, TierForm, ensure_automatic_discount,
    list_products,
};
use crate::state::AppState;

/// Products shown in the funnel form picker.
const PRODUCT_PICKER_LIMIT: i64 = 50;

// =============================================================================
// Templates
// =============================================================================

/// Funnel list row.
pub struct FunnelView {
    pub id: String,
    pub name: String,
    pub status: String,
    pub is_active: bool,
    pub product_count: usize,
    pub tier_count: usize,
    pub max_discount: f64,
    pub banner_text: String,
    pub updated_at: String,
}

/// Funnel list page.
#[derive(Template)]
#[template(path = "funnels/index.html")]
pub struct FunnelsIndexTemplate {
    pub connected: bool,
    pub funnels: Vec<FunnelView>,
}

/// Option in the product picker.
pub struct ProductOption {
    pub id: String,
    pub title: String,
    pub status: String,
    pub selected: bool,
}

/// Create/edit form page.
#[derive(Template)]
#[template(path = "funnels/form.html")]
pub struct FunnelFormTemplate {
    pub heading: String,
    pub action: String,
    pub name: String,
    pub banner_text: String,
    pub products_json: String,
    pub tiers_json: String,
    pub products: Vec<ProductOption>,
}

// =============================================================================
// Form payloads
// =============================================================================

/// Funnel form body. `products` and `quantity_tiers` arrive as JSON
/// documents in their form fields.
#[derive(Debug, Deserialize)]
pub struct FunnelFormBody {
    pub name: String,
    #[serde(default)]
    pub banner_text: String,
    pub products: String,
    pub quantity_tiers: String,
}

#[derive(Debug, Deserialize)]
struct TierFormBody {
    min_quantity: u64,
    discount_percentage: f64,
}

impl FunnelFormBody {
    /// Decode the JSON-encoded fields into a [`FunnelForm`].
    fn decode(&self) -> Result<FunnelForm, AppError> {
        let products: Vec<String> = serde_json::from_str(&self.products)
            .map_err(|e| AppError::BadRequest(format!("products field: {e}")))?;
        let tiers: Vec<TierFormBody> = serde_json::from_str(&self.quantity_tiers)
            .map_err(|e| AppError::BadRequest(format!("quantity_tiers field: {e}")))?;

        Ok(FunnelForm {
            name: self.name.clone(),
            banner_text: self.banner_text.clone(),
            products,
            tiers: tiers
                .into_iter()
                .map(|t| TierForm {
                    min_quantity: t.min_quantity,
                    discount_percentage: t.discount_percentage,
                })
                .collect(),
        })
    }
}

/// Build the funnel router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/funnels", get(index).post(create))
        .route("/funnels/new", get(new_form))
        .route("/funnels/{id}/edit", get(edit_form))
        .route("/funnels/{id}", post(update))
        .route("/funnels/{id}/delete", post(delete))
        .route("/funnels/{id}/status", post(toggle_status))
}

// =============================================================================
// Helpers
// =============================================================================

fn render<T: Template>(template: &T) -> Response {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

fn funnel_view(funnel: &Funnel) -> FunnelView {
    FunnelView {
        id: funnel.id.to_string(),
        name: funnel.name.clone(),
        status: funnel.status.to_string(),
        is_active: funnel.is_active(),
        product_count: funnel.products.len(),
        tier_count: funnel.discount_settings.quantity_tiers.len(),
        max_discount: funnel.discount_settings.max_discount,
        banner_text: funnel.banner_text.clone(),
        updated_at: funnel
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    }
}

/// Map a store failure for a specific funnel id to a response error.
fn store_error(id: &str, err: AdminShopifyError) -> AppError {
    match err {
        AdminShopifyError::NotFound(_) => AppError::NotFound(id.to_string()),
        other => AppError::Shopify(other),
    }
}

async fn product_options(
    state: &AppState,
    selected: &[String],
) -> Result<Vec<ProductOption>, AppError> {
    let products = list_products(state.shopify(), PRODUCT_PICKER_LIMIT).await?;
    Ok(products
        .into_iter()
        .map(|p| ProductOption {
            selected: selected.contains(&p.id),
            id: p.id,
            title: p.title,
            status: p.status,
        })
        .collect())
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /funnels - funnel list.
///
/// Renders an empty, disconnected state instead of failing when no OAuth
/// token is stored yet.
async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let store = FunnelStore::new(state.shopify());

    let (connected, funnels) = match store.load().await {
        Ok(snapshot) => (true, snapshot.funnels),
        Err(AdminShopifyError::NoAccessToken) => (false, vec![]),
        Err(e) => return Err(e.into()),
    };

    let template = FunnelsIndexTemplate {
        connected,
        funnels: funnels.iter().map(funnel_view).collect(),
    };
    Ok(render(&template))
}

/// GET /funnels/new - creation form.
async fn new_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let template = FunnelFormTemplate {
        heading: "Create funnel".to_string(),
        action: "/funnels".to_string(),
        name: String::new(),
        banner_text: String::new(),
        products_json: "[]".to_string(),
        tiers_json: "[]".to_string(),
        products: product_options(&state, &[]).await?,
    };
    Ok(render(&template))
}

/// POST /funnels - create a funnel.
async fn create(
    State(state): State<AppState>,
    Form(body): Form<FunnelFormBody>,
) -> Result<Response, AppError> {
    let form = body.decode()?;
    let (products, tiers) = form
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let store = FunnelStore::new(state.shopify());
    let funnel = store
        .create(products, tiers, form.name, form.banner_text)
        .await?;

    // The automatic discount is what routes carts into the checkout
    // function; the funnel itself is saved either way.
    if let Err(e) =
        ensure_automatic_discount(state.shopify(), &state.config().shopify.function_id).await
    {
        tracing::warn!(error = %e, "Automatic discount bootstrap failed");
    }

    tracing::info!(funnel_id = %funnel.id, name = %funnel.name, "Funnel created");
    Ok(Redirect::to("/funnels").into_response())
}

/// GET /funnels/{id}/edit - edit form.
async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let store = FunnelStore::new(state.shopify());
    let snapshot = store.load().await?;

    let funnel = snapshot
        .funnels
        .iter()
        .find(|f| f.id.as_str() == id)
        .ok_or_else(|| AppError::NotFound(id.clone()))?;

    let selected: Vec<String> = funnel.products.iter().map(ToString::to_string).collect();

    let template = FunnelFormTemplate {
        heading: format!("Edit {}", funnel.name),
        action: format!("/funnels/{id}"),
        name: funnel.name.clone(),
        banner_text: funnel.banner_text.clone(),
        products_json: serde_json::to_string(&funnel.products)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        tiers_json: serde_json::to_string(&funnel.discount_settings.quantity_tiers)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        products: product_options(&state, &selected).await?,
    };
    Ok(render(&template))
}

/// POST /funnels/{id} - update a funnel.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(body): Form<FunnelFormBody>,
) -> Result<Response, AppError> {
    let form = body.decode()?;
    let (products, tiers) = form
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let store = FunnelStore::new(state.shopify());
    store
        .update(&id, products, tiers, form.name, form.banner_text)
        .await
        .map_err(|e| store_error(&id, e))?;

    tracing::info!(funnel_id = %id, "Funnel updated");
    Ok(Redirect::to("/funnels").into_response())
}

/// POST /funnels/{id}/delete - delete a funnel.
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let store = FunnelStore::new(state.shopify());
    store.delete(&id).await.map_err(|e| store_error(&id, e))?;

    tracing::info!(funnel_id = %id, "Funnel deleted");
    Ok(Redirect::to("/funnels").into_response())
}

/// POST /funnels/{id}/status - toggle ACTIVE/INACTIVE.
async fn toggle_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let store = FunnelStore::new(state.shopify());
    let status = store
        .toggle_status(&id)
        .await
        .map_err(|e| store_error(&id, e))?;

    tracing::info!(funnel_id = %id, status = %status, "Funnel status changed");
    Ok(Redirect::to("/funnels").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_decode() {
        let body = FunnelFormBody {
            name: "Bundle".to_string(),
            banner_text: "Save more".to_string(),
            products: r#"["gid://shopify/Product/1"]"#.to_string(),
            quantity_tiers: r#"[{"min_quantity": 2, "discount_percentage": 10.0}]"#.to_string(),
        };

        let form = body.decode().expect("decode");
        assert_eq!(form.products.len(), 1);
        assert_eq!(form.tiers.len(), 1);
        assert_eq!(form.tiers[0].min_quantity, 2);
    }

    #[test]
    fn test_form_body_rejects_bad_json() {
        let body = FunnelFormBody {
            name: "Bundle".to_string(),
            banner_text: String::new(),
            products: "not json".to_string(),
            quantity_tiers: "[]".to_string(),
        };

        assert!(matches!(body.decode(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_funnel_view_formats_timestamp() {
        use chrono::TimeZone;
        use funnelkit_core::types::{DiscountSettings, FunnelId, FunnelStatus};

        let funnel = Funnel {
            id: FunnelId::new("funnel_1"),
            name: "F".to_string(),
            products: vec![],
            discount_settings: DiscountSettings::from_tiers(vec![]),
            banner_text: String::new(),
            created_at: None,
            updated_at: Some(chrono::Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()),
            status: FunnelStatus::Active,
        };

        let view = funnel_view(&funnel);
        assert_eq!(view.updated_at, "2026-01-15 09:30");
        assert_eq!(view.status, "ACTIVE");
    }
}
