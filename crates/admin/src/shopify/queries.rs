//! GraphQL documents for the Admin API and their typed response envelopes.
//!
//! Each document is a hand-written constant paired with the serde structs
//! its response deserializes into. Responses are validated here, at the
//! boundary, so the rest of the crate never touches untyped JSON.

use serde::Deserialize;

/// Metafield namespace holding all funnel data.
pub const FUNNEL_NAMESPACE: &str = "funnel_discounts";
/// Metafield key for the funnel list document.
pub const FUNNELS_KEY: &str = "funnels";

// =============================================================================
// Shop + funnels metafield
// =============================================================================

pub const GET_FUNNELS: &str = r#"
query getFunnels {
  shop {
    id
    metafield(namespace: "funnel_discounts", key: "funnels") {
      id
      namespace
      key
      value
    }
  }
}"#;

#[derive(Debug, Deserialize)]
pub struct GetFunnelsData {
    pub shop: ShopNode,
}

#[derive(Debug, Deserialize)]
pub struct ShopNode {
    pub id: String,
    pub metafield: Option<MetafieldNode>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldNode {
    pub value: String,
}

// =============================================================================
// Metafield write-back
// =============================================================================

pub const SET_METAFIELDS: &str = r"
mutation updateFunnelsMetafield($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      value
    }
    userErrors {
      field
      message
    }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMetafieldsData {
    pub metafields_set: MetafieldsSetPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// A mutation user error (invalid input rather than a transport failure).
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl UserError {
    /// Render "field: message" for logs and error strings.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), self.message),
            _ => self.message.clone(),
        }
    }
}

// =============================================================================
// Product catalog
// =============================================================================

pub const GET_PRODUCTS: &str = r"
query getProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        handle
        status
      }
    }
  }
}";

#[derive(Debug, Deserialize)]
pub struct GetProductsData {
    pub products: ProductConnection,
}

#[derive(Debug, Deserialize)]
pub struct ProductConnection {
    #[serde(default)]
    pub edges: Vec<ProductEdge>,
}

#[derive(Debug, Deserialize)]
pub struct ProductEdge {
    pub node: ProductNode,
}

/// Product summary for the funnel form's product picker.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub status: String,
}

// =============================================================================
// Automatic app discount
// =============================================================================

pub const SEARCH_DISCOUNTS: &str = r"
query searchDiscounts($query: String!, $first: Int!) {
  discountNodes(first: $first, query: $query) {
    edges {
      node {
        id
        discount {
          ... on DiscountAutomaticApp {
            title
            status
          }
        }
      }
    }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDiscountsData {
    pub discount_nodes: DiscountNodeConnection,
}

#[derive(Debug, Deserialize)]
pub struct DiscountNodeConnection {
    #[serde(default)]
    pub edges: Vec<DiscountNodeEdge>,
}

#[derive(Debug, Deserialize)]
pub struct DiscountNodeEdge {
    pub node: DiscountNode,
}

#[derive(Debug, Deserialize)]
pub struct DiscountNode {
    pub id: String,
    #[serde(default)]
    pub discount: Option<AutomaticAppDiscount>,
}

#[derive(Debug, Deserialize)]
pub struct AutomaticAppDiscount {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub const CREATE_AUTOMATIC_DISCOUNT: &str = r"
mutation discountAutomaticAppCreate($automaticAppDiscount: DiscountAutomaticAppInput!) {
  discountAutomaticAppCreate(automaticAppDiscount: $automaticAppDiscount) {
    automaticAppDiscount {
      title
      status
    }
    userErrors {
      field
      message
    }
  }
}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAutomaticDiscountData {
    pub discount_automatic_app_create: DiscountAutomaticAppCreatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountAutomaticAppCreatePayload {
    #[serde(default)]
    pub automatic_app_discount: Option<AutomaticAppDiscount>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}
