//! Quantity aggregation across cart lines.

use std::collections::HashMap;

use crate::types::{CartLine, ProductId};

/// Per-product totals for one cart snapshot.
///
/// Groups cart lines by underlying product identity: the same product spread
/// across several lines (different variants, different selling plans) is
/// summed. Contributing lines are kept in cart order for later per-line
/// discount targeting. Lines whose merchandise carries no product reference
/// (custom sales) are skipped.
#[derive(Debug, Default)]
pub struct CartAggregation<'a> {
    quantities: HashMap<&'a ProductId, u64>,
    lines: HashMap<&'a ProductId, Vec<&'a CartLine>>,
}

impl<'a> CartAggregation<'a> {
    /// Aggregate an ordered sequence of cart lines.
    #[must_use]
    pub fn from_lines(cart_lines: &'a [CartLine]) -> Self {
        let mut quantities: HashMap<&'a ProductId, u64> = HashMap::new();
        let mut lines: HashMap<&'a ProductId, Vec<&'a CartLine>> = HashMap::new();

        for line in cart_lines {
            let Some(product_id) = line.product_id() else {
                continue;
            };

            *quantities.entry(product_id).or_insert(0) += line.quantity;
            lines.entry(product_id).or_default().push(line);
        }

        Self { quantities, lines }
    }

    /// Total purchased quantity of a product, if present in the cart.
    #[must_use]
    pub fn quantity_of(&self, product: &ProductId) -> Option<u64> {
        self.quantities.get(product).copied()
    }

    /// Cart lines contributing to a product's total, in cart order.
    #[must_use]
    pub fn lines_of(&self, product: &ProductId) -> &[&'a CartLine] {
        self.lines.get(product).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.quantities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartLineId, Merchandise, ProductRef};

    fn line(id: &str, product: Option<&str>, quantity: u64) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            quantity,
            merchandise: Merchandise {
                product: product.map(|p| ProductRef {
                    id: ProductId::new(p),
                }),
            },
        }
    }

    #[test]
    fn test_quantities_sum_across_lines() {
        let lines = vec![
            line("l1", Some("p1"), 2),
            line("l2", Some("p2"), 1),
            line("l3", Some("p1"), 3),
        ];
        let agg = CartAggregation::from_lines(&lines);

        assert_eq!(agg.quantity_of(&ProductId::new("p1")), Some(5));
        assert_eq!(agg.quantity_of(&ProductId::new("p2")), Some(1));
        assert_eq!(agg.product_count(), 2);
    }

    #[test]
    fn test_contributing_lines_keep_cart_order() {
        let lines = vec![
            line("l1", Some("p1"), 2),
            line("l2", Some("p2"), 1),
            line("l3", Some("p1"), 3),
        ];
        let agg = CartAggregation::from_lines(&lines);

        let p1_lines = agg.lines_of(&ProductId::new("p1"));
        let ids: Vec<&str> = p1_lines.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["l1", "l3"]);
    }

    #[test]
    fn test_lines_without_product_are_skipped() {
        let lines = vec![line("l1", None, 4), line("l2", Some("p1"), 1)];
        let agg = CartAggregation::from_lines(&lines);

        assert_eq!(agg.product_count(), 1);
        assert_eq!(agg.quantity_of(&ProductId::new("p1")), Some(1));
    }

    #[test]
    fn test_empty_cart() {
        let agg = CartAggregation::from_lines(&[]);
        assert_eq!(agg.product_count(), 0);
        assert!(agg.lines_of(&ProductId::new("p1")).is_empty());
    }
}
