//! HTTP handlers.

pub mod health;
pub mod marketplace;
pub mod metrics;
pub mod orders;
