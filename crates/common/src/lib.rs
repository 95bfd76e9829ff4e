//! Shared types for the checkout system.
//!
//! - [`OrderId`]: random identifier minted once per placed order
//! - [`RequestContext`]: cancellation and deadline carried from the inbound
//!   request into every downstream call

pub mod context;
pub mod types;

pub use context::{CancelHandle, ContextError, RequestContext};
pub use types::OrderId;
