//! Product catalog listing for the funnel form.

use super::queries::{self, GetProductsData, ProductNode};
use super::{AdminClient, AdminShopifyError};

/// Fetch the first `first` products for the funnel form's product picker.
///
/// # Errors
///
/// Returns `AdminShopifyError` when the query fails.
pub async fn list_products(
    client: &AdminClient,
    first: i64,
) -> Result<Vec<ProductNode>, AdminShopifyError> {
    let data: GetProductsData = client
        .execute(queries::GET_PRODUCTS, serde_json::json!({ "first": first }))
        .await?;

    Ok(data.products.edges.into_iter().map(|e| e.node).collect())
}
