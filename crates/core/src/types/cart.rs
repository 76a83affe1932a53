//! Checkout evaluation input as delivered by the platform.
//!
//! The host runtime hands the discount function one JSON document per
//! evaluation: the cart snapshot, the discount classes enabled for this run,
//! and the shop metafield holding the funnel list. The transport schema is
//! owned by the platform; these types only mirror the fields the engine
//! reads. Every field is defaulted so a sparser input degrades to "no
//! discount" instead of a deserialization failure.

use serde::{Deserialize, Serialize};

use super::id::{CartLineId, ProductId};

/// Checkout-level discount category the host will accept in this evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountClass {
    Order,
    Product,
    /// Any class this function does not emit (e.g. shipping). Carried so an
    /// unexpected value in the input list cannot fail the whole evaluation.
    #[serde(other)]
    Other,
}

/// Host-defined rule for choosing among candidates of the same class.
///
/// This function always declares `First`: if multiple candidates of one
/// class are ever produced, only the first is honored downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStrategy {
    First,
}

/// Reference to the product behind a cart line's merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: ProductId,
}

/// Merchandise on a cart line.
///
/// Custom-sale lines carry no product reference; the aggregator skips them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchandise {
    #[serde(default)]
    pub product: Option<ProductRef>,
}

/// One line of the cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub quantity: u64,
    #[serde(default)]
    pub merchandise: Merchandise,
}

impl CartLine {
    /// The product this line contributes quantity to, if identifiable.
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        self.merchandise.product.as_ref().map(|p| &p.id)
    }
}

/// The cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

/// Discount context for this evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountContext {
    #[serde(default)]
    pub discount_classes: Vec<DiscountClass>,
}

impl DiscountContext {
    /// Whether the given class is enabled for this evaluation.
    #[must_use]
    pub fn has_class(&self, class: DiscountClass) -> bool {
        self.discount_classes.contains(&class)
    }
}

/// The shop metafield carrying the serialized funnel list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelMetafield {
    pub value: String,
}

/// Shop-scoped portion of the evaluation input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(default)]
    pub metafield: Option<FunnelMetafield>,
}

/// Full evaluation input: one cart, one funnel snapshot, one class set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartInput {
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub discount: DiscountContext,
    #[serde(default)]
    pub shop: Shop,
}

impl CartInput {
    /// Raw funnel metafield value, if the shop has one.
    #[must_use]
    pub fn funnel_metafield_value(&self) -> Option<&str> {
        self.shop.metafield.as_ref().map(|m| m.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_deserializes_documented_shape() {
        let input: CartInput = serde_json::from_str(
            r#"{
                "cart": {
                    "lines": [
                        {
                            "id": "gid://shopify/CartLine/1",
                            "quantity": 3,
                            "merchandise": {
                                "__typename": "ProductVariant",
                                "product": { "id": "gid://shopify/Product/1" }
                            }
                        }
                    ]
                },
                "discount": { "discountClasses": ["ORDER", "PRODUCT"] },
                "shop": { "metafield": { "value": "[]" } }
            }"#,
        )
        .expect("deserialize");

        assert_eq!(input.cart.lines.len(), 1);
        assert!(input.discount.has_class(DiscountClass::Order));
        assert!(input.discount.has_class(DiscountClass::Product));
        assert_eq!(input.funnel_metafield_value(), Some("[]"));
    }

    #[test]
    fn test_empty_document_defaults() {
        let input: CartInput = serde_json::from_str("{}").expect("deserialize");
        assert!(input.cart.lines.is_empty());
        assert!(input.discount.discount_classes.is_empty());
        assert!(input.funnel_metafield_value().is_none());
    }

    #[test]
    fn test_unknown_discount_class_tolerated() {
        let ctx: DiscountContext =
            serde_json::from_str(r#"{ "discountClasses": ["SHIPPING", "ORDER"] }"#)
                .expect("deserialize");
        assert!(ctx.has_class(DiscountClass::Order));
        assert!(!ctx.has_class(DiscountClass::Product));
    }

    #[test]
    fn test_custom_sale_line_has_no_product() {
        let line: CartLine = serde_json::from_str(
            r#"{ "id": "gid://shopify/CartLine/9", "quantity": 1, "merchandise": {} }"#,
        )
        .expect("deserialize");
        assert!(line.product_id().is_none());
    }
}
