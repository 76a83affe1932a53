//! Funnelkit checkout function - cart lines discount run target.
//!
//! The platform invokes this binary once per checkout evaluation with the
//! evaluation input as JSON on stdin and expects the operation list as JSON
//! on stdout. All decision logic lives in `funnelkit-core`; this adapter
//! only moves bytes. It performs no network or file I/O, holds no state
//! between runs, and must stay within the host's per-evaluation time
//! budget, which the pure engine comfortably does.
//!
//! Malformed funnel configuration never fails the run (the engine resolves
//! it to an empty operation list); only an unreadable input document or an
//! unwritable stdout is a hard error, and both belong to the host.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{Read, Write};

use funnelkit_core::generate_cart_lines_discounts;
use funnelkit_core::types::CartInput;
use thiserror::Error;

/// Failures of the stdin/stdout transport itself.
#[derive(Debug, Error)]
enum FunctionError {
    #[error("evaluation transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode evaluation input: {0}")]
    Decode(#[from] serde_json::Error),
}

fn run(input: impl Read, mut output: impl Write) -> Result<(), FunctionError> {
    let input: CartInput = serde_json::from_reader(input)?;
    let result = generate_cart_lines_discounts(&input);
    serde_json::to_writer(&mut output, &result)?;
    output.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run(std::io::stdin().lock(), std::io::stdout().lock())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(input: &str) -> serde_json::Value {
        let mut out = Vec::new();
        run(input.as_bytes(), &mut out).expect("run");
        serde_json::from_slice(&out).expect("valid output JSON")
    }

    #[test]
    fn test_empty_cart_round_trip() {
        let output = evaluate(r#"{ "cart": { "lines": [] } }"#);
        assert_eq!(output, serde_json::json!({ "operations": [] }));
    }

    #[test]
    fn test_full_evaluation_round_trip() {
        let funnels = serde_json::json!([{
            "id": "funnel_1",
            "name": "Bulk",
            "products": ["gid://shopify/Product/1"],
            "discount_settings": {
                "quantity_tiers": [ { "min_quantity": 2, "discount_percentage": 10 } ],
                "max_discount": 10
            },
            "banner_text": ""
        }]);
        let input = serde_json::json!({
            "cart": { "lines": [ {
                "id": "gid://shopify/CartLine/1",
                "quantity": 3,
                "merchandise": { "product": { "id": "gid://shopify/Product/1" } }
            } ] },
            "discount": { "discountClasses": ["ORDER"] },
            "shop": { "metafield": { "value": funnels.to_string() } }
        });

        let output = evaluate(&input.to_string());
        let operations = output["operations"].as_array().expect("operations array");
        assert_eq!(operations.len(), 1);
        assert_eq!(
            operations[0]["orderDiscountsAdd"]["selectionStrategy"],
            "FIRST"
        );
    }

    #[test]
    fn test_invalid_input_document_is_an_error() {
        let mut out = Vec::new();
        let result = run("{not json".as_bytes(), &mut out);
        assert!(matches!(result, Err(FunctionError::Decode(_))));
    }
}
