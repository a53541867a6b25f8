//! Threadline Core - Shared domain types and state machines.
//!
//! This crate provides the pieces of the storefront that carry real state
//! but do no I/O:
//! - [`cart`] - cart lines, the merge-by-variant reducer, and the
//!   [`cart::CartSync`] capability the storefront implements against Shopify
//! - [`configurator`] - the four-step custom shirt wizard and its pricing
//! - [`notification`] - toast messages surfaced to the shopper
//! - [`types`] - newtype IDs and decimal prices
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no HTTP clients, no
//! sessions, no async runtime. This keeps it lightweight and testable
//! without a rendering environment.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod configurator;
pub mod notification;
pub mod types;

pub use notification::{Notification, NotificationKind};
pub use types::*;
