//! Billing data types.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Subscription status as recorded by the payment provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
    PastDue,
    Trial,
}

/// Advisory local usage counters carried on the subscription state.
///
/// Never consulted by gating: the gating engine always recomputes usage from
/// stored records. These exist so the UI can show a rough meter offline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCounters {
    pub content_this_month: u32,
    pub images_this_month: u32,
}

/// Per-user subscription state. The remote copy is authoritative whenever
/// reachable; the local copy is an advisory cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub tier_id: String,
    pub external_subscription_ref: Option<String>,
    pub status: SubscriptionStatus,
    /// Unix timestamp in ms.
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub usage: UsageCounters,
    /// Unix timestamp in ms.
    pub cached_at: i64,
}

impl Default for SubscriptionState {
    fn default() -> Self {
        Self {
            tier_id: "free".to_string(),
            external_subscription_ref: None,
            status: SubscriptionStatus::Active,
            current_period_end: None,
            usage: UsageCounters::default(),
            cached_at: Utc::now().timestamp_millis(),
        }
    }
}

impl SubscriptionState {
    /// Whether the subscription currently grants access. Cancelled plans
    /// stay active until the paid period ends. Informational only; the
    /// gating engine checks usage against limits, not this.
    pub fn is_active_now(&self) -> bool {
        match self.status {
            SubscriptionStatus::Active | SubscriptionStatus::Trial => true,
            SubscriptionStatus::Cancelled => self
                .current_period_end
                .map(|end| end > Utc::now().timestamp_millis())
                .unwrap_or(false),
            SubscriptionStatus::PastDue => false,
        }
    }
}

/// Per-category usage for the current calendar month. Derived, never stored
/// as an authoritative row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub content_this_month: u32,
    pub images_this_month: u32,
    pub manuscripts_this_month: u32,
}

/// Gated action classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateAction {
    Manuscript,
    Image,
    Book,
}

/// Outcome of a gating check. The reason is advisory upgrade-prompt text,
/// not part of the gating contract proper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GateDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}
