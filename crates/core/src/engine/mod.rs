//! The checkout discount engine.
//!
//! A single stateless computation from (cart, funnel list, enabled discount
//! classes) to an ordered operation list:
//!
//! ```text
//! cart lines -> aggregate -> match per funnel -> resolve tier -> emit
//! ```
//!
//! The engine never returns an error: malformed funnel data, an empty cart,
//! or a cart that qualifies for nothing all produce an empty operation list.
//! Cost is O(lines + funnels x tiers); there are no retries and no loops
//! over anything but the input.

pub mod aggregate;
pub mod emitter;
pub mod matcher;
pub mod resolver;

use serde::{Deserialize, Serialize};

pub use aggregate::CartAggregation;
pub use emitter::{
    CartLineTarget, DiscountValue, Operation, OrderDiscountCandidate, OrderDiscountTarget,
    OrderDiscountsAdd, OrderSubtotalTarget, Percentage, ProductDiscountCandidate,
    ProductDiscountTarget, ProductDiscountsAdd, emit_operations,
};
pub use matcher::{FunnelMatch, match_funnel};
pub use resolver::resolve_tier;

use crate::parse::parse_funnel_list;
use crate::types::{CartInput, DiscountClass, Funnel};

/// Result of one checkout evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartLinesDiscountsResult {
    pub operations: Vec<Operation>,
}

/// Evaluate the discount function for one cart.
///
/// Reads the funnel list from the shop metafield carried in `input`, then
/// applies the first-funnel-wins policy: funnels are scanned in stored
/// order and the first active one with any matched products is the only one
/// evaluated for emission. Later funnels are never considered in the same
/// pass, even when the winning funnel's quantity resolves no tier. Stacking
/// discounts across funnels is deliberately unsupported.
#[must_use]
pub fn generate_cart_lines_discounts(input: &CartInput) -> CartLinesDiscountsResult {
    if input.cart.lines.is_empty() {
        return CartLinesDiscountsResult::default();
    }

    let wants_order = input.discount.has_class(DiscountClass::Order);
    let wants_product = input.discount.has_class(DiscountClass::Product);
    if !wants_order && !wants_product {
        return CartLinesDiscountsResult::default();
    }

    let funnels = input
        .funnel_metafield_value()
        .map(parse_funnel_list)
        .unwrap_or_default();

    evaluate_funnels(input, &funnels)
}

/// Evaluate against an already-parsed funnel list.
///
/// Same policy as [`generate_cart_lines_discounts`]; used where the caller
/// holds typed funnels (admin previews, tests) rather than a raw metafield.
#[must_use]
pub fn evaluate_funnels(input: &CartInput, funnels: &[Funnel]) -> CartLinesDiscountsResult {
    if input.cart.lines.is_empty() || funnels.is_empty() {
        return CartLinesDiscountsResult::default();
    }

    let aggregation = CartAggregation::from_lines(&input.cart.lines);

    for funnel in funnels.iter().filter(|f| f.is_active()) {
        let Some(matched) = match_funnel(funnel, &aggregation) else {
            continue;
        };

        // First matching funnel wins. A match below every tier threshold
        // still ends the scan with no operations.
        let operations = resolve_tier(
            &funnel.discount_settings.quantity_tiers,
            matched.matched_quantity,
        )
        .map(|tier| emit_operations(&matched, tier, &input.discount))
        .unwrap_or_default();

        return CartLinesDiscountsResult { operations };
    }

    CartLinesDiscountsResult::default()
}
