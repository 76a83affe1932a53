//! Boundary parse: raw metafield JSON to typed funnels.
//!
//! The funnel list reaches checkout as an opaque JSON string inside a shop
//! metafield. Everything downstream works with [`Funnel`] values; this module
//! is the single place where shape is checked. Invalid input never becomes an
//! error here - a malformed document parses to an empty list, a malformed
//! entry or tier is dropped - because at checkout time the only safe response
//! to bad configuration is "no discount", not a failed evaluation.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{DiscountSettings, DiscountTier, Funnel, FunnelId, FunnelStatus, ProductId};

/// Loosely-shaped funnel record as found in storage.
///
/// Numbers arrive as JSON numbers (possibly fractional), status as a free
/// string, timestamps as strings in whatever format the writer used.
#[derive(Debug, Default, Deserialize)]
struct RawFunnel {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    products: Vec<Value>,
    #[serde(default)]
    discount_settings: RawDiscountSettings,
    #[serde(default)]
    banner_text: String,
    created_at: Option<String>,
    updated_at: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDiscountSettings {
    #[serde(default)]
    quantity_tiers: Vec<RawTier>,
}

#[derive(Debug, Deserialize)]
struct RawTier {
    min_quantity: Option<f64>,
    discount_percentage: Option<f64>,
}

impl RawTier {
    /// Validate into a typed tier: integral threshold >= 1, percentage in
    /// [0, 100]. Anything else is dropped.
    fn validate(&self) -> Option<DiscountTier> {
        let min_quantity = self.min_quantity?;
        let discount_percentage = self.discount_percentage?;

        if !min_quantity.is_finite() || min_quantity < 1.0 || min_quantity.fract() != 0.0 {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let tier = DiscountTier {
            min_quantity: min_quantity as u64,
            discount_percentage,
        };
        tier.is_well_formed().then_some(tier)
    }
}

/// Parse the serialized funnel list from a shop metafield.
///
/// Returns an empty list when the document is not valid JSON or not an
/// array. Entries that cannot be validated (no id, or not an object) are
/// dropped individually, so one corrupt record does not disable every
/// funnel in the shop.
#[must_use]
pub fn parse_funnel_list(raw: &str) -> Vec<Funnel> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };

    entries.into_iter().filter_map(funnel_from_value).collect()
}

/// Validate a single stored funnel record.
#[must_use]
pub fn funnel_from_value(value: Value) -> Option<Funnel> {
    let raw: RawFunnel = serde_json::from_value(value).ok()?;
    let id = raw.id?;

    let products: Vec<ProductId> = raw
        .products
        .into_iter()
        .filter_map(|p| match p {
            Value::String(s) => Some(ProductId::new(s)),
            _ => None,
        })
        .collect();

    let tiers: Vec<DiscountTier> = raw
        .discount_settings
        .quantity_tiers
        .iter()
        .filter_map(RawTier::validate)
        .collect();

    Some(Funnel {
        id: FunnelId::new(id),
        name: raw.name,
        products,
        discount_settings: DiscountSettings::from_tiers(tiers),
        banner_text: raw.banner_text,
        created_at: parse_timestamp(raw.created_at.as_deref()),
        updated_at: parse_timestamp(raw.updated_at.as_deref()),
        status: FunnelStatus::from_stored(raw.status.as_deref()),
    })
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
