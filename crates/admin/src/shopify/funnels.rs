//! Funnel persistence in the shop metafield.
//!
//! The funnel list is stored as one JSON document in the
//! `funnel_discounts/funnels` shop metafield. Every mutation here is
//! snapshot-in, snapshot-out: read the current document, derive a new list,
//! write the whole document back. The metafield API offers no compare-and-set,
//! so two concurrent admin edits can clobber each other; last write wins.

use chrono::Utc;
use funnelkit_core::parse_funnel_list;
use funnelkit_core::types::{DiscountSettings, DiscountTier, Funnel, FunnelId, FunnelStatus, ProductId};
use thiserror::Error;

use super::queries::{
    self, FUNNEL_NAMESPACE, FUNNELS_KEY, GetFunnelsData, SetMetafieldsData,
};
use super::{AdminClient, AdminShopifyError};

/// The funnel list together with the shop it belongs to.
#[derive(Debug)]
pub struct FunnelSnapshot {
    /// Shop GID, needed as `ownerId` for the write-back.
    pub shop_id: String,
    pub funnels: Vec<Funnel>,
}

/// One tier as submitted by the funnel form.
#[derive(Debug, Clone, Copy)]
pub struct TierForm {
    pub min_quantity: u64,
    pub discount_percentage: f64,
}

/// Funnel creation/update input from the admin form.
#[derive(Debug, Clone)]
pub struct FunnelForm {
    pub name: String,
    pub banner_text: String,
    pub products: Vec<String>,
    pub tiers: Vec<TierForm>,
}

/// Form-level validation failures, rendered back to the merchant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FunnelFormError {
    #[error("funnel name must not be empty")]
    EmptyName,

    #[error("select at least one product")]
    NoProducts,

    #[error("define at least one discount tier")]
    NoTiers,

    #[error("tier {index}: minimum quantity must be at least 1")]
    InvalidQuantity { index: usize },

    #[error("tier {index}: discount percentage must be between 0 and 100")]
    InvalidPercentage { index: usize },

    #[error("two tiers share the minimum quantity {min_quantity}")]
    DuplicateThreshold { min_quantity: u64 },
}

impl FunnelForm {
    /// Validate the form into typed products and tiers.
    ///
    /// Duplicate thresholds are rejected here so stored funnels never rely
    /// on the resolver's tie-break.
    ///
    /// # Errors
    ///
    /// Returns the first [`FunnelFormError`] encountered.
    pub fn validate(&self) -> Result<(Vec<ProductId>, Vec<DiscountTier>), FunnelFormError> {
        if self.name.trim().is_empty() {
            return Err(FunnelFormError::EmptyName);
        }

        let products: Vec<ProductId> = self
            .products
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(ProductId::new)
            .collect();
        if products.is_empty() {
            return Err(FunnelFormError::NoProducts);
        }

        if self.tiers.is_empty() {
            return Err(FunnelFormError::NoTiers);
        }

        let mut tiers = Vec::with_capacity(self.tiers.len());
        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.min_quantity < 1 {
                return Err(FunnelFormError::InvalidQuantity { index });
            }
            let candidate = DiscountTier {
                min_quantity: tier.min_quantity,
                discount_percentage: tier.discount_percentage,
            };
            if !candidate.is_well_formed() {
                return Err(FunnelFormError::InvalidPercentage { index });
            }
            tiers.push(candidate);
        }

        let mut thresholds: Vec<u64> = tiers.iter().map(|t| t.min_quantity).collect();
        thresholds.sort_unstable();
        if let Some(dup) = thresholds.windows(2).find(|w| w[0] == w[1]) {
            return Err(FunnelFormError::DuplicateThreshold {
                min_quantity: dup[0],
            });
        }

        Ok((products, tiers))
    }
}

/// Metafield-backed funnel storage.
pub struct FunnelStore<'a> {
    client: &'a AdminClient,
}

impl<'a> FunnelStore<'a> {
    /// Create a store over an authenticated client.
    #[must_use]
    pub const fn new(client: &'a AdminClient) -> Self {
        Self { client }
    }

    /// Read the current funnel snapshot.
    ///
    /// A missing metafield or an unparseable document yields an empty list,
    /// matching what checkout would see.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError` when the shop query itself fails.
    pub async fn load(&self) -> Result<FunnelSnapshot, AdminShopifyError> {
        let data: GetFunnelsData = self
            .client
            .execute(queries::GET_FUNNELS, serde_json::json!({}))
            .await?;

        let funnels = data
            .shop
            .metafield
            .map(|m| parse_funnel_list(&m.value))
            .unwrap_or_default();

        Ok(FunnelSnapshot {
            shop_id: data.shop.id,
            funnels,
        })
    }

    /// Write a funnel list back to the metafield.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when the mutation reports invalid input.
    pub async fn save(&self, shop_id: &str, funnels: &[Funnel]) -> Result<(), AdminShopifyError> {
        let value = serde_json::to_string(funnels)?;
        let variables = serde_json::json!({
            "metafields": [{
                "namespace": FUNNEL_NAMESPACE,
                "key": FUNNELS_KEY,
                "value": value,
                "type": "json",
                "ownerId": shop_id,
            }]
        });

        let data: SetMetafieldsData = self
            .client
            .execute(queries::SET_METAFIELDS, variables)
            .await?;

        if let Some(first) = data.metafields_set.user_errors.first() {
            return Err(AdminShopifyError::UserError(first.describe()));
        }

        Ok(())
    }

    /// Create a funnel from validated form input and persist it.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError` on load/save failure. Form validation is
    /// the caller's responsibility.
    pub async fn create(
        &self,
        products: Vec<ProductId>,
        tiers: Vec<DiscountTier>,
        name: String,
        banner_text: String,
    ) -> Result<Funnel, AdminShopifyError> {
        let snapshot = self.load().await?;
        let now = Utc::now();

        let funnel = Funnel {
            id: FunnelId::new(format!("funnel_{}", uuid::Uuid::new_v4())),
            name,
            products,
            discount_settings: DiscountSettings::from_tiers(tiers),
            banner_text,
            created_at: Some(now),
            updated_at: Some(now),
            status: FunnelStatus::Active,
        };

        let mut funnels = snapshot.funnels;
        funnels.push(funnel.clone());
        self.save(&snapshot.shop_id, &funnels).await?;

        Ok(funnel)
    }

    /// Replace the funnel with the given id, preserving its creation time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no funnel has that id.
    pub async fn update(
        &self,
        id: &str,
        products: Vec<ProductId>,
        tiers: Vec<DiscountTier>,
        name: String,
        banner_text: String,
    ) -> Result<Funnel, AdminShopifyError> {
        let snapshot = self.load().await?;
        let mut funnels = snapshot.funnels;

        let existing = funnels
            .iter_mut()
            .find(|f| f.id.as_str() == id)
            .ok_or_else(|| AdminShopifyError::NotFound(id.to_string()))?;

        existing.name = name;
        existing.products = products;
        existing.discount_settings = DiscountSettings::from_tiers(tiers);
        existing.banner_text = banner_text;
        existing.updated_at = Some(Utc::now());
        let updated = existing.clone();

        self.save(&snapshot.shop_id, &funnels).await?;
        Ok(updated)
    }

    /// Remove a funnel by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no funnel has that id.
    pub async fn delete(&self, id: &str) -> Result<(), AdminShopifyError> {
        let snapshot = self.load().await?;
        let mut funnels = snapshot.funnels;

        let before = funnels.len();
        funnels.retain(|f| f.id.as_str() != id);
        if funnels.len() == before {
            return Err(AdminShopifyError::NotFound(id.to_string()));
        }

        self.save(&snapshot.shop_id, &funnels).await
    }

    /// Flip a funnel between `ACTIVE` and `INACTIVE`.
    ///
    /// Archived funnels reactivate, mirroring a plain toggle control.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no funnel has that id.
    pub async fn toggle_status(&self, id: &str) -> Result<FunnelStatus, AdminShopifyError> {
        let snapshot = self.load().await?;
        let mut funnels = snapshot.funnels;

        let funnel = funnels
            .iter_mut()
            .find(|f| f.id.as_str() == id)
            .ok_or_else(|| AdminShopifyError::NotFound(id.to_string()))?;

        funnel.status = if funnel.status == FunnelStatus::Active {
            FunnelStatus::Inactive
        } else {
            FunnelStatus::Active
        };
        funnel.updated_at = Some(Utc::now());
        let status = funnel.status;

        self.save(&snapshot.shop_id, &funnels).await?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(tiers: Vec<TierForm>) -> FunnelForm {
        FunnelForm {
            name: "Bundle".to_string(),
            banner_text: String::new(),
            products: vec!["gid://shopify/Product/1".to_string()],
            tiers,
        }
    }

    #[test]
    fn test_valid_form() {
        let form = form(vec![
            TierForm {
                min_quantity: 2,
                discount_percentage: 10.0,
            },
            TierForm {
                min_quantity: 5,
                discount_percentage: 20.0,
            },
        ]);

        let (products, tiers) = form.validate().expect("valid");
        assert_eq!(products.len(), 1);
        assert_eq!(tiers.len(), 2);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut invalid = form(vec![TierForm {
            min_quantity: 2,
            discount_percentage: 10.0,
        }]);
        invalid.name = "   ".to_string();
        assert_eq!(invalid.validate(), Err(FunnelFormError::EmptyName));
    }

    #[test]
    fn test_no_products_rejected() {
        let mut invalid = form(vec![TierForm {
            min_quantity: 2,
            discount_percentage: 10.0,
        }]);
        invalid.products = vec![String::new()];
        assert_eq!(invalid.validate(), Err(FunnelFormError::NoProducts));
    }

    #[test]
    fn test_no_tiers_rejected() {
        assert_eq!(form(vec![]).validate(), Err(FunnelFormError::NoTiers));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let invalid = form(vec![TierForm {
            min_quantity: 0,
            discount_percentage: 10.0,
        }]);
        assert_eq!(
            invalid.validate(),
            Err(FunnelFormError::InvalidQuantity { index: 0 })
        );
    }

    #[test]
    fn test_percentage_out_of_range_rejected() {
        let invalid = form(vec![
            TierForm {
                min_quantity: 2,
                discount_percentage: 10.0,
            },
            TierForm {
                min_quantity: 5,
                discount_percentage: 101.0,
            },
        ]);
        assert_eq!(
            invalid.validate(),
            Err(FunnelFormError::InvalidPercentage { index: 1 })
        );
    }

    #[test]
    fn test_duplicate_threshold_rejected() {
        let invalid = form(vec![
            TierForm {
                min_quantity: 3,
                discount_percentage: 10.0,
            },
            TierForm {
                min_quantity: 3,
                discount_percentage: 20.0,
            },
        ]);
        assert_eq!(
            invalid.validate(),
            Err(FunnelFormError::DuplicateThreshold { min_quantity: 3 })
        );
    }
}
