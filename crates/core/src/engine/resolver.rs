//! Tier resolution: highest qualifying threshold wins.

use std::cmp::Ordering;

use crate::types::DiscountTier;

/// Select the applicable tier for a matched quantity.
///
/// Returns the tier with the greatest `min_quantity` not exceeding
/// `matched_quantity`, or `None` when the quantity is below every threshold.
/// The input need not be sorted.
///
/// Tie-break: tiers sharing a `min_quantity` should be rejected at authoring
/// time, but stored data predating that check may still contain them; among
/// equals the greater percentage wins, so the result is deterministic for
/// any input.
#[must_use]
pub fn resolve_tier(tiers: &[DiscountTier], matched_quantity: u64) -> Option<&DiscountTier> {
    let mut ordered: Vec<&DiscountTier> = tiers.iter().collect();
    ordered.sort_by(|a, b| {
        b.min_quantity.cmp(&a.min_quantity).then_with(|| {
            b.discount_percentage
                .partial_cmp(&a.discount_percentage)
                .unwrap_or(Ordering::Equal)
        })
    });

    ordered
        .into_iter()
        .find(|tier| tier.min_quantity <= matched_quantity)
}
