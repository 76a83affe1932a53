//! Discount operation construction.
//!
//! Serde shapes here are the function's output wire format: externally
//! tagged enums produce the `{"orderDiscountsAdd": {...}}` envelopes and
//! camelCase fields the host expects.

use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, DiscountClass, DiscountContext, DiscountTier, SelectionStrategy};

use super::matcher::FunnelMatch;

/// Percentage-off value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentage {
    pub value: f64,
}

/// Discount value wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountValue {
    pub percentage: Percentage,
}

/// Order subtotal target, minus an exclusion set (always empty here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubtotalTarget {
    pub excluded_cart_line_ids: Vec<CartLineId>,
}

/// Target of an order-level discount candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderDiscountTarget {
    OrderSubtotal(OrderSubtotalTarget),
}

/// Reference to a single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineTarget {
    pub id: CartLineId,
}

/// Target of a product-level discount candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductDiscountTarget {
    CartLine(CartLineTarget),
}

/// One order-level discount candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDiscountCandidate {
    pub message: String,
    pub targets: Vec<OrderDiscountTarget>,
    pub value: DiscountValue,
}

/// One product-level discount candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDiscountCandidate {
    pub message: String,
    pub targets: Vec<ProductDiscountTarget>,
    pub value: DiscountValue,
}

/// `orderDiscountsAdd` operation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDiscountsAdd {
    pub candidates: Vec<OrderDiscountCandidate>,
    pub selection_strategy: SelectionStrategy,
}

/// `productDiscountsAdd` operation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDiscountsAdd {
    pub candidates: Vec<ProductDiscountCandidate>,
    pub selection_strategy: SelectionStrategy,
}

/// A discount operation handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    OrderDiscountsAdd(OrderDiscountsAdd),
    ProductDiscountsAdd(ProductDiscountsAdd),
}

/// Translate a resolved tier into operations for the enabled classes.
///
/// Emits at most one order-level operation (one candidate spanning the
/// order subtotal) and one product-level operation (one candidate per
/// contributing cart line). A disabled class is simply not emitted.
#[must_use]
pub fn emit_operations(
    matched: &FunnelMatch<'_>,
    tier: &DiscountTier,
    context: &DiscountContext,
) -> Vec<Operation> {
    let mut operations = Vec::new();
    let percentage = tier.discount_percentage;
    let funnel_name = &matched.funnel.name;

    if context.has_class(DiscountClass::Order) {
        let message = format!(
            "{percentage}% OFF - {funnel_name} ({} items)",
            matched.matched_quantity
        );
        operations.push(Operation::OrderDiscountsAdd(OrderDiscountsAdd {
            candidates: vec![OrderDiscountCandidate {
                message,
                targets: vec![OrderDiscountTarget::OrderSubtotal(OrderSubtotalTarget {
                    excluded_cart_line_ids: vec![],
                })],
                value: DiscountValue {
                    percentage: Percentage { value: percentage },
                },
            }],
            selection_strategy: SelectionStrategy::First,
        }));
    }

    if context.has_class(DiscountClass::Product) {
        let candidates: Vec<ProductDiscountCandidate> = matched
            .lines
            .iter()
            .map(|line| ProductDiscountCandidate {
                message: format!("{percentage}% OFF - {funnel_name}"),
                targets: vec![ProductDiscountTarget::CartLine(CartLineTarget {
                    id: line.id.clone(),
                })],
                value: DiscountValue {
                    percentage: Percentage { value: percentage },
                },
            })
            .collect();

        if !candidates.is_empty() {
            operations.push(Operation::ProductDiscountsAdd(ProductDiscountsAdd {
                candidates,
                selection_strategy: SelectionStrategy::First,
            }));
        }
    }

    operations
}
