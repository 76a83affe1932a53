//! Cross-crate checkout flow: admin-authored funnels evaluated by the engine.
//!
//! The admin panel serializes `Funnel` values into the metafield; the
//! checkout function parses that document back and evaluates it. These
//! tests round-trip through both sides to catch schema drift between the
//! writer and the reader.

use funnelkit_core::engine::Operation;
use funnelkit_core::types::{
    Cart, CartInput, CartLine, CartLineId, DiscountClass, DiscountContext, DiscountSettings,
    DiscountTier, Funnel, FunnelId, FunnelMetafield, FunnelStatus, Merchandise, ProductId,
    ProductRef, Shop,
};
use funnelkit_core::{generate_cart_lines_discounts, parse_funnel_list};

fn authored_funnel(name: &str, products: &[&str], tiers: &[(u64, f64)]) -> Funnel {
    Funnel {
        id: FunnelId::new(format!("funnel_{name}")),
        name: name.to_string(),
        products: products.iter().map(|p| ProductId::new(*p)).collect(),
        discount_settings: DiscountSettings::from_tiers(
            tiers
                .iter()
                .map(|(q, p)| DiscountTier {
                    min_quantity: *q,
                    discount_percentage: *p,
                })
                .collect(),
        ),
        banner_text: "Buy more, save more".to_string(),
        created_at: None,
        updated_at: None,
        status: FunnelStatus::Active,
    }
}

fn cart_input(lines: Vec<(&str, &str, u64)>, metafield: String) -> CartInput {
    CartInput {
        cart: Cart {
            lines: lines
                .into_iter()
                .map(|(id, product, quantity)| CartLine {
                    id: CartLineId::new(id),
                    quantity,
                    merchandise: Merchandise {
                        product: Some(ProductRef {
                            id: ProductId::new(product),
                        }),
                    },
                })
                .collect(),
        },
        discount: DiscountContext {
            discount_classes: vec![DiscountClass::Order, DiscountClass::Product],
        },
        shop: Shop {
            metafield: Some(FunnelMetafield { value: metafield }),
        },
    }
}

#[test]
fn admin_written_document_round_trips_through_checkout() {
    let funnels = vec![authored_funnel(
        "bulk",
        &["gid://shopify/Product/1"],
        &[(2, 10.0), (5, 20.0)],
    )];

    // What the admin panel writes into the metafield.
    let document = serde_json::to_string(&funnels).expect("serialize");

    // What the checkout function reads back.
    let parsed = parse_funnel_list(&document);
    assert_eq!(parsed, funnels);

    let result = generate_cart_lines_discounts(&cart_input(
        vec![("gid://shopify/CartLine/1", "gid://shopify/Product/1", 5)],
        document,
    ));

    assert_eq!(result.operations.len(), 2);
    let Operation::OrderDiscountsAdd(order) = &result.operations[0] else {
        panic!("expected order operation");
    };
    assert_eq!(order.candidates[0].message, "20% OFF - bulk (5 items)");
}

#[test]
fn status_round_trip_gates_checkout() {
    let mut funnel = authored_funnel("seasonal", &["gid://shopify/Product/7"], &[(1, 30.0)]);
    funnel.status = FunnelStatus::Inactive;

    let document = serde_json::to_string(&vec![funnel]).expect("serialize");
    let result = generate_cart_lines_discounts(&cart_input(
        vec![("gid://shopify/CartLine/1", "gid://shopify/Product/7", 3)],
        document,
    ));

    assert!(result.operations.is_empty());
}

#[test]
fn archived_funnel_is_not_evaluated() {
    let mut archived = authored_funnel("old", &["gid://shopify/Product/1"], &[(1, 50.0)]);
    archived.status = FunnelStatus::Archived;
    let live = authored_funnel("live", &["gid://shopify/Product/1"], &[(1, 5.0)]);

    let document = serde_json::to_string(&vec![archived, live]).expect("serialize");
    let result = generate_cart_lines_discounts(&cart_input(
        vec![("gid://shopify/CartLine/1", "gid://shopify/Product/1", 2)],
        document,
    ));

    let Operation::OrderDiscountsAdd(order) = &result.operations[0] else {
        panic!("expected order operation");
    };
    assert!(order.candidates[0].message.contains("live"));
}

#[test]
fn timestamps_survive_the_round_trip() {
    let mut funnel = authored_funnel("dated", &["gid://shopify/Product/1"], &[(1, 10.0)]);
    funnel.created_at = Some("2026-01-15T09:30:00Z".parse().expect("timestamp"));
    funnel.updated_at = funnel.created_at;

    let document = serde_json::to_string(&vec![funnel.clone()]).expect("serialize");
    let parsed = parse_funnel_list(&document);

    assert_eq!(parsed[0].created_at, funnel.created_at);
}
