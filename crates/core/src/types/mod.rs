//! Core types for Funnelkit.
//!
//! This module provides the typed vocabulary shared by the admin panel and
//! the checkout function: funnel definitions as persisted in the shop
//! metafield, and the cart evaluation input as delivered by the platform.

pub mod cart;
pub mod funnel;
pub mod id;

pub use cart::*;
pub use funnel::*;
pub use id::*;
