//! Funnel document inspection.

use std::path::Path;

use funnelkit_core::parse_funnel_list;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("Failed to read {0}: {1}")]
    Read(String, std::io::Error),
}

/// Parse a funnel document exactly the way checkout does and report what
/// survives the boundary parse.
///
/// # Errors
///
/// Returns `ValidateError::Read` when the file cannot be read. A document
/// that parses to zero funnels is reported, not an error - that is what
/// checkout would see too.
pub fn validate(path: &Path) -> Result<(), ValidateError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ValidateError::Read(path.display().to_string(), e))?;

    let funnels = parse_funnel_list(&raw);

    if funnels.is_empty() {
        tracing::warn!(
            "{}: no valid funnels - checkout would apply no discount",
            path.display()
        );
        return Ok(());
    }

    tracing::info!("{}: {} valid funnel(s)", path.display(), funnels.len());
    for funnel in &funnels {
        let tiers: Vec<String> = funnel
            .discount_settings
            .quantity_tiers
            .iter()
            .map(|t| format!("{}+ => {}%", t.min_quantity, t.discount_percentage))
            .collect();
        tracing::info!(
            "  {} [{}] {} product(s), tiers: {}",
            funnel.id,
            funnel.status,
            funnel.products.len(),
            if tiers.is_empty() {
                "none".to_string()
            } else {
                tiers.join(", ")
            }
        );
    }

    Ok(())
}
