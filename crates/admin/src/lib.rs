//! Funnelkit Admin library.
//!
//! This crate provides the admin panel functionality as a library, allowing
//! it to be tested and reused.
//!
//! # Security
//!
//! This crate holds HIGH PRIVILEGE access:
//! - Shopify Admin API (metafields, discounts, products)
//! - Shop webhook secret (order payload verification)
//!
//! Only deploy behind the platform proxy; never expose the bind address
//! directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod routes;
pub mod shopify;
pub mod state;
