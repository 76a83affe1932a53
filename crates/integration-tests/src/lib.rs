//! Integration tests for Funnelkit.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full evaluations through the core engine's public API
//! - `webhook_signatures` - Webhook HMAC verification against known vectors
//! - `wire_format` - Operation JSON snapshots the host platform consumes
//!
//! Tests here exercise library code across crate boundaries without a live
//! database or network; database-backed behavior is covered by the admin
//! crate's repository layer running against a provisioned `PostgreSQL` in
//! deployment environments.

#![cfg_attr(not(test), forbid(unsafe_code))]
