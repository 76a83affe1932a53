//! Funnel definitions as persisted in the shop metafield.
//!
//! A funnel is a merchant-defined grouping of products with quantity-tiered
//! percentage discounts. The serde field names here are the storage schema:
//! the admin panel serializes this exact shape into the
//! `funnel_discounts/funnels` shop metafield, and the checkout function reads
//! it back. Changing a field name is a data migration.

use serde::{Deserialize, Serialize};

use super::id::{FunnelId, ProductId};

/// Lifecycle status of a funnel.
///
/// Records created before the status field existed carry no status at all;
/// absence is treated as [`FunnelStatus::Active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunnelStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl FunnelStatus {
    /// Whether a funnel with this status participates in checkout matching.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Parse a stored status string, case-insensitively.
    ///
    /// `None` (field absent) defaults to `Active`. Unknown strings map to
    /// `Inactive`: an unrecognized status must never widen the set of carts
    /// that receive a discount.
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Active,
            Some(s) => match s.to_ascii_uppercase().as_str() {
                "ACTIVE" => Self::Active,
                "ARCHIVED" => Self::Archived,
                _ => Self::Inactive,
            },
        }
    }
}

impl std::fmt::Display for FunnelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Inactive => write!(f, "INACTIVE"),
            Self::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// A single quantity threshold and the percentage it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Minimum combined quantity (across the funnel's product set) required
    /// to qualify for this tier. Always >= 1 after boundary parsing.
    pub min_quantity: u64,
    /// Percentage off, in [0, 100].
    pub discount_percentage: f64,
}

impl DiscountTier {
    /// Whether this tier is well-formed: positive threshold, percentage in
    /// [0, 100]. Tiers failing this are dropped at the parse boundary.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.min_quantity >= 1
            && self.discount_percentage.is_finite()
            && (0.0..=100.0).contains(&self.discount_percentage)
    }
}

/// Discount configuration for a funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSettings {
    /// Quantity tiers. Not required to be sorted in storage; the resolver
    /// behaves as if sorted descending by `min_quantity`.
    pub quantity_tiers: Vec<DiscountTier>,
    /// Greatest tier percentage, denormalized for list views.
    pub max_discount: f64,
}

impl DiscountSettings {
    /// Build settings from a tier list, computing `max_discount`.
    #[must_use]
    pub fn from_tiers(quantity_tiers: Vec<DiscountTier>) -> Self {
        let max_discount = quantity_tiers
            .iter()
            .map(|t| t.discount_percentage)
            .fold(0.0_f64, f64::max);
        Self {
            quantity_tiers,
            max_discount,
        }
    }
}

/// A merchant-defined discount funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    pub id: FunnelId,
    pub name: String,
    /// Product set this funnel applies to. Quantities are summed across all
    /// cart lines whose product appears here.
    pub products: Vec<ProductId>,
    pub discount_settings: DiscountSettings,
    /// Storefront banner copy shown on qualifying product pages.
    pub banner_text: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub status: FunnelStatus,
}

impl Funnel {
    /// Whether this funnel participates in checkout matching.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_active() {
        assert_eq!(FunnelStatus::default(), FunnelStatus::Active);
        assert!(FunnelStatus::from_stored(None).is_active());
    }

    #[test]
    fn test_status_from_stored_case_insensitive() {
        assert_eq!(FunnelStatus::from_stored(Some("active")), FunnelStatus::Active);
        assert_eq!(FunnelStatus::from_stored(Some("ACTIVE")), FunnelStatus::Active);
        assert_eq!(
            FunnelStatus::from_stored(Some("Archived")),
            FunnelStatus::Archived
        );
        assert_eq!(
            FunnelStatus::from_stored(Some("INACTIVE")),
            FunnelStatus::Inactive
        );
    }

    #[test]
    fn test_status_unknown_string_deactivates() {
        assert_eq!(
            FunnelStatus::from_stored(Some("PAUSED")),
            FunnelStatus::Inactive
        );
    }

    #[test]
    fn test_status_serde_screaming_snake() {
        let json = serde_json::to_string(&FunnelStatus::Inactive).expect("serialize");
        assert_eq!(json, "\"INACTIVE\"");
    }

    #[test]
    fn test_tier_well_formed() {
        let ok = DiscountTier {
            min_quantity: 2,
            discount_percentage: 10.0,
        };
        assert!(ok.is_well_formed());

        let zero_threshold = DiscountTier {
            min_quantity: 0,
            discount_percentage: 10.0,
        };
        assert!(!zero_threshold.is_well_formed());

        let over_100 = DiscountTier {
            min_quantity: 2,
            discount_percentage: 150.0,
        };
        assert!(!over_100.is_well_formed());

        let nan = DiscountTier {
            min_quantity: 2,
            discount_percentage: f64::NAN,
        };
        assert!(!nan.is_well_formed());
    }

    #[test]
    fn test_settings_max_discount() {
        let settings = DiscountSettings::from_tiers(vec![
            DiscountTier {
                min_quantity: 2,
                discount_percentage: 10.0,
            },
            DiscountTier {
                min_quantity: 5,
                discount_percentage: 20.0,
            },
        ]);
        assert!((settings.max_discount - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_funnel_storage_shape() {
        let funnel = Funnel {
            id: FunnelId::new("funnel_9aa3c1de"),
            name: "Bulk Coffee".to_string(),
            products: vec![ProductId::new("gid://shopify/Product/1")],
            discount_settings: DiscountSettings::from_tiers(vec![DiscountTier {
                min_quantity: 3,
                discount_percentage: 15.0,
            }]),
            banner_text: "Buy 3, save 15%".to_string(),
            created_at: None,
            updated_at: None,
            status: FunnelStatus::Active,
        };

        let value = serde_json::to_value(&funnel).expect("serialize");
        assert_eq!(value["id"], "funnel_9aa3c1de");
        assert_eq!(value["discount_settings"]["quantity_tiers"][0]["min_quantity"], 3);
        assert_eq!(value["status"], "ACTIVE");
    }
}
