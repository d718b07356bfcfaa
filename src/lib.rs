//! KeyMint - subscription and account-state service for the KeyMint customer portal
//!
//! This library provides the core functionality for the KeyMint account service,
//! including database operations, payment provider webhook processing, and the
//! portal API handlers.

pub mod config;
pub mod credits;
pub mod db;
pub mod error;
pub mod handlers;
pub mod id;
pub mod license;
pub mod models;
pub mod payments;
pub mod util;
