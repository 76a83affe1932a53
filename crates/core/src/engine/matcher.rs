//! Funnel-to-cart matching.

use std::collections::HashSet;

use crate::types::{CartLine, Funnel};

use super::aggregate::CartAggregation;

/// Intersection of one funnel's product set with the current cart.
///
/// Exists only when the intersection is non-empty: "funnel irrelevant to
/// this cart" (no value) is distinct from "funnel relevant but below every
/// tier threshold" (a match whose quantity resolves no tier).
#[derive(Debug)]
pub struct FunnelMatch<'a> {
    pub funnel: &'a Funnel,
    /// Combined purchased quantity across all matched products.
    pub matched_quantity: u64,
    /// Contributing cart lines, unioned across matched products: funnel
    /// product order first, cart order within each product.
    pub lines: Vec<&'a CartLine>,
}

/// Match one funnel against the aggregated cart.
///
/// Returns `None` when none of the funnel's products are in the cart.
/// A product listed twice in the funnel counts once.
#[must_use]
pub fn match_funnel<'a>(
    funnel: &'a Funnel,
    aggregation: &CartAggregation<'a>,
) -> Option<FunnelMatch<'a>> {
    let mut matched_quantity = 0_u64;
    let mut lines: Vec<&'a CartLine> = Vec::new();
    let mut seen = HashSet::new();

    for product in &funnel.products {
        if !seen.insert(product) {
            continue;
        }
        if let Some(quantity) = aggregation.quantity_of(product) {
            matched_quantity += quantity;
            lines.extend_from_slice(aggregation.lines_of(product));
        }
    }

    if lines.is_empty() {
        return None;
    }

    Some(FunnelMatch {
        funnel,
        matched_quantity,
        lines,
    })
}
