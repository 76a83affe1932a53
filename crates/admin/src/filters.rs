//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Format a percentage the way checkout messages do: `10%`, `12.5%`.
///
/// Usage in templates: `{{ funnel.max_discount|percent }}`
#[askama::filter_fn]
pub fn percent(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value}%"))
}

/// Format a money amount with two decimal places.
///
/// Usage in templates: `{{ summary.total_sales|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("${value}"))
}
