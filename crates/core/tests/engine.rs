//! End-to-end evaluation tests against the public engine API.
//!
//! Each test builds the full evaluation input (cart, discount classes,
//! metafield document) exactly as the host delivers it, and asserts on the
//! emitted operation list.

use funnelkit_core::engine::Operation;
use funnelkit_core::types::{
    Cart, CartInput, CartLine, CartLineId, DiscountClass, DiscountContext, FunnelMetafield,
    Merchandise, ProductId, ProductRef, Shop,
};
use funnelkit_core::generate_cart_lines_discounts;
use serde_json::json;

fn line(id: &str, product: &str, quantity: u64) -> CartLine {
    CartLine {
        id: CartLineId::new(id),
        quantity,
        merchandise: Merchandise {
            product: Some(ProductRef {
                id: ProductId::new(product),
            }),
        },
    }
}

fn input(lines: Vec<CartLine>, classes: &[DiscountClass], metafield: Option<&str>) -> CartInput {
    CartInput {
        cart: Cart { lines },
        discount: DiscountContext {
            discount_classes: classes.to_vec(),
        },
        shop: Shop {
            metafield: metafield.map(|value| FunnelMetafield {
                value: value.to_string(),
            }),
        },
    }
}

fn funnel_doc(entries: &[serde_json::Value]) -> String {
    serde_json::Value::Array(entries.to_vec()).to_string()
}

fn funnel_entry(
    id: &str,
    name: &str,
    products: &[&str],
    tiers: &[(u64, f64)],
    status: Option<&str>,
) -> serde_json::Value {
    let mut entry = json!({
        "id": id,
        "name": name,
        "products": products,
        "discount_settings": {
            "quantity_tiers": tiers
                .iter()
                .map(|(q, p)| json!({ "min_quantity": q, "discount_percentage": p }))
                .collect::<Vec<_>>(),
            "max_discount": tiers.iter().map(|(_, p)| *p).fold(0.0, f64::max),
        },
        "banner_text": "",
    });
    if let Some(status) = status {
        entry["status"] = json!(status);
    }
    entry
}

const BOTH: &[DiscountClass] = &[DiscountClass::Order, DiscountClass::Product];

#[test]
fn empty_cart_yields_no_operations() {
    let doc = funnel_doc(&[funnel_entry("funnel_1", "F1", &["p1"], &[(1, 10.0)], None)]);
    let result = generate_cart_lines_discounts(&input(vec![], BOTH, Some(&doc)));
    assert!(result.operations.is_empty());
}

#[test]
fn no_discount_classes_yields_no_operations() {
    let doc = funnel_doc(&[funnel_entry("funnel_1", "F1", &["p1"], &[(1, 10.0)], None)]);
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 5)], &[], Some(&doc)));
    assert!(result.operations.is_empty());
}

#[test]
fn missing_metafield_yields_no_operations() {
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 5)], BOTH, None));
    assert!(result.operations.is_empty());
}

#[test]
fn unparseable_metafield_yields_no_operations() {
    let result =
        generate_cart_lines_discounts(&input(vec![line("l1", "p1", 5)], BOTH, Some("not-json")));
    assert!(result.operations.is_empty());
}

#[test]
fn qualifying_cart_gets_order_and_product_operations() {
    // P1 x 3 against tiers {2: 10%, 5: 20%}: 3 >= 2 and 3 < 5, so 10% wins.
    let doc = funnel_doc(&[funnel_entry(
        "funnel_1",
        "F1",
        &["p1"],
        &[(2, 10.0), (5, 20.0)],
        None,
    )]);
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 3)], BOTH, Some(&doc)));

    assert_eq!(result.operations.len(), 2);

    let Operation::OrderDiscountsAdd(order) = &result.operations[0] else {
        panic!("expected order operation first");
    };
    assert_eq!(order.candidates[0].message, "10% OFF - F1 (3 items)");
    assert!((order.candidates[0].value.percentage.value - 10.0).abs() < f64::EPSILON);

    let Operation::ProductDiscountsAdd(product) = &result.operations[1] else {
        panic!("expected product operation second");
    };
    assert_eq!(product.candidates.len(), 1);
    assert!((product.candidates[0].value.percentage.value - 10.0).abs() < f64::EPSILON);
}

#[test]
fn order_class_only_emits_only_order_operation() {
    let doc = funnel_doc(&[funnel_entry("funnel_1", "F1", &["p1"], &[(2, 10.0)], None)]);
    let result = generate_cart_lines_discounts(&input(
        vec![line("l1", "p1", 3)],
        &[DiscountClass::Order],
        Some(&doc),
    ));

    assert_eq!(result.operations.len(), 1);
    assert!(matches!(result.operations[0], Operation::OrderDiscountsAdd(_)));
}

#[test]
fn below_every_threshold_yields_no_operations() {
    // P1 x 1 against a single {2: 10%} tier.
    let doc = funnel_doc(&[funnel_entry("funnel_1", "F1", &["p1"], &[(2, 10.0)], None)]);
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 1)], BOTH, Some(&doc)));
    assert!(result.operations.is_empty());
}

#[test]
fn first_matching_funnel_wins() {
    let doc = funnel_doc(&[
        funnel_entry("funnel_1", "First", &["p1"], &[(2, 10.0)], Some("ACTIVE")),
        funnel_entry("funnel_2", "Second", &["p1"], &[(2, 50.0)], Some("ACTIVE")),
    ]);
    let result =
        generate_cart_lines_discounts(&input(vec![line("l1", "p1", 10)], BOTH, Some(&doc)));

    let Operation::OrderDiscountsAdd(order) = &result.operations[0] else {
        panic!("expected order operation");
    };
    assert!(order.candidates[0].message.contains("First"));
    assert!(
        !result.operations.iter().any(|op| match op {
            Operation::OrderDiscountsAdd(o) =>
                o.candidates.iter().any(|c| c.message.contains("Second")),
            Operation::ProductDiscountsAdd(p) =>
                p.candidates.iter().any(|c| c.message.contains("Second")),
        }),
        "second funnel must not contribute"
    );
}

#[test]
fn first_match_ends_scan_even_without_qualifying_tier() {
    // The first funnel matches the cart but its threshold is out of reach;
    // the scan still stops there, so the second funnel never emits.
    let doc = funnel_doc(&[
        funnel_entry("funnel_1", "First", &["p1"], &[(100, 10.0)], None),
        funnel_entry("funnel_2", "Second", &["p1"], &[(1, 50.0)], None),
    ]);
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 5)], BOTH, Some(&doc)));
    assert!(result.operations.is_empty());
}

#[test]
fn inactive_funnel_is_skipped_entirely() {
    let doc = funnel_doc(&[
        funnel_entry("funnel_1", "Dormant", &["p1"], &[(1, 40.0)], Some("INACTIVE")),
        funnel_entry("funnel_2", "Live", &["p1"], &[(1, 15.0)], Some("ACTIVE")),
    ]);
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 2)], BOTH, Some(&doc)));

    let Operation::OrderDiscountsAdd(order) = &result.operations[0] else {
        panic!("expected order operation");
    };
    assert!(order.candidates[0].message.contains("Live"));
}

#[test]
fn absent_status_behaves_as_active() {
    let with_status = funnel_doc(&[funnel_entry(
        "funnel_1",
        "F1",
        &["p1"],
        &[(2, 10.0)],
        Some("ACTIVE"),
    )]);
    let without_status = funnel_doc(&[funnel_entry("funnel_1", "F1", &["p1"], &[(2, 10.0)], None)]);

    let a = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 3)], BOTH, Some(&with_status)));
    let b =
        generate_cart_lines_discounts(&input(vec![line("l1", "p1", 3)], BOTH, Some(&without_status)));
    assert_eq!(a, b);
    assert!(!a.operations.is_empty());
}

#[test]
fn unmatched_funnel_contributes_nothing() {
    let doc = funnel_doc(&[funnel_entry("funnel_1", "F1", &["p9"], &[(1, 10.0)], None)]);
    let result = generate_cart_lines_discounts(&input(vec![line("l1", "p1", 5)], BOTH, Some(&doc)));
    assert!(result.operations.is_empty());
}

#[test]
fn quantities_aggregate_across_lines_and_products() {
    // 2 + 3 across two products of the same funnel reaches the 5-tier.
    let doc = funnel_doc(&[funnel_entry(
        "funnel_1",
        "F1",
        &["p1", "p2"],
        &[(2, 10.0), (5, 20.0)],
        None,
    )]);
    let result = generate_cart_lines_discounts(&input(
        vec![line("l1", "p1", 2), line("l2", "p2", 3)],
        BOTH,
        Some(&doc),
    ));

    let Operation::OrderDiscountsAdd(order) = &result.operations[0] else {
        panic!("expected order operation");
    };
    assert_eq!(order.candidates[0].message, "20% OFF - F1 (5 items)");

    let Operation::ProductDiscountsAdd(product) = &result.operations[1] else {
        panic!("expected product operation");
    };
    assert_eq!(product.candidates.len(), 2);
}

#[test]
fn evaluation_is_idempotent() {
    let doc = funnel_doc(&[funnel_entry(
        "funnel_1",
        "F1",
        &["p1"],
        &[(2, 10.0), (5, 20.0)],
        None,
    )]);
    let evaluation = input(vec![line("l1", "p1", 7)], BOTH, Some(&doc));

    let first = generate_cart_lines_discounts(&evaluation);
    let second = generate_cart_lines_discounts(&evaluation);
    assert_eq!(first, second);
    assert!(!first.operations.is_empty());
}
