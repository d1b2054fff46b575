//! Gating engine: allow/deny decisions for quota-limited actions.
//!
//! A pure decision function over a resolved tier and resolved usage stats.
//! Nothing here is cached: usage can change between calls, so every check
//! re-evaluates.

use crate::billing::types::{GateAction, GateDecision, UsageStats};
use crate::tiers::{Tier, UNLIMITED_SENTINEL};

/// Tier ids whose manuscript allowance is semantically infinite, independent
/// of the numeric limit field.
const UNLIMITED_MANUSCRIPT_TIERS: &[&str] = &["artisan", "master"];

/// Pure gating decisions over resolved state.
pub struct GatingEngine;

impl GatingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether the next action of this class is allowed. Strict less-than:
    /// being exactly at the limit denies.
    pub fn can_perform_action(&self, action: GateAction, tier: &Tier, stats: &UsageStats) -> bool {
        match action {
            GateAction::Manuscript => {
                if UNLIMITED_MANUSCRIPT_TIERS.contains(&tier.id) {
                    return true;
                }
                // Manuscripts draw from the content allowance.
                Self::within_limit(stats.manuscripts_this_month, tier.limits.content_per_month)
            }
            GateAction::Image => {
                Self::within_limit(stats.images_this_month, tier.limits.images_per_month)
            }
            GateAction::Book => {
                Self::within_limit(stats.content_this_month, tier.limits.content_per_month)
            }
        }
    }

    /// Gating check with an advisory upgrade-prompt reason on denial.
    pub fn check_gating(&self, action: GateAction, tier: &Tier, stats: &UsageStats) -> GateDecision {
        if self.can_perform_action(action, tier, stats) {
            GateDecision::allow()
        } else {
            GateDecision::deny(format!(
                "You have reached the limit for your {} plan. Upgrade to unlock more power.",
                tier.name
            ))
        }
    }

    fn within_limit(usage: u32, limit: u32) -> bool {
        if limit >= UNLIMITED_SENTINEL {
            return true;
        }
        usage < limit
    }
}

impl Default for GatingEngine {
    fn default() -> Self {
        Self::new()
    }
}
