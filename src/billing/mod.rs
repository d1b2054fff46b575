//! Billing module: usage resolution, gating, and subscription lifecycle.
//!
//! The authoritative copies of usage and subscription data live in the
//! remote store; everything here degrades to local caches when the network
//! is gone and never blocks the user on an unreachable remote.

mod gating;
mod subscription;
mod types;
mod usage;

pub use gating::GatingEngine;
pub use subscription::{CheckoutCompleted, SubscriptionLifecycle};
pub use types::{
    GateAction, GateDecision, SubscriptionState, SubscriptionStatus, UsageCounters, UsageStats,
};
pub use usage::UsageResolver;
