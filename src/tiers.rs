//! Static subscription tier catalog.
//!
//! Tiers are a closed set, defined here and never created or destroyed at
//! runtime. Lookup is case-insensitive and total: anything unknown resolves
//! to the free tier.

use serde::{Deserialize, Serialize};

/// Limits at or above this value are treated as unlimited: the category
/// never denies, regardless of usage magnitude.
pub const UNLIMITED_SENTINEL: u32 = 9999;

/// Generation queue priority granted by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Payment-provider price references for a tier, per billing cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingProductRef {
    pub monthly: &'static str,
    pub yearly: Option<&'static str>,
}

/// Monthly resource limits for a tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub content_per_month: u32,
    pub images_per_month: u32,
    pub items_per_content_unit: u32,
    pub priority: Priority,
}

/// A named subscription plan with fixed monthly limits.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub id: &'static str,
    pub name: &'static str,
    pub monthly_price: f64,
    pub yearly_price: Option<f64>,
    pub billing_ref: Option<BillingProductRef>,
    pub limits: TierLimits,
}

/// The full catalog, cheapest first.
pub static TIERS: &[Tier] = &[
    Tier {
        id: "free",
        name: "Novice",
        monthly_price: 0.0,
        yearly_price: None,
        billing_ref: None,
        limits: TierLimits {
            content_per_month: 2,
            images_per_month: 5,
            items_per_content_unit: 10,
            priority: Priority::Low,
        },
    },
    Tier {
        id: "creator",
        name: "Creator",
        monthly_price: 4.99,
        yearly_price: None,
        billing_ref: Some(BillingProductRef {
            monthly: "pri_01kgj1n3qkqj57dxpnt3b0cjxe",
            yearly: None,
        }),
        limits: TierLimits {
            content_per_month: 15,
            images_per_month: 50,
            items_per_content_unit: 20,
            priority: Priority::Normal,
        },
    },
    Tier {
        id: "artisan",
        name: "Artisan",
        monthly_price: 14.99,
        yearly_price: Some(143.99),
        billing_ref: Some(BillingProductRef {
            monthly: "pri_01kgj1pccf8r87ha871a8dyjt2",
            yearly: Some("pri_01kgj1qd2m3xv09e5r7s1a8ykc"),
        }),
        limits: TierLimits {
            content_per_month: UNLIMITED_SENTINEL,
            images_per_month: UNLIMITED_SENTINEL,
            items_per_content_unit: 50,
            priority: Priority::High,
        },
    },
    Tier {
        id: "master",
        name: "PublishLab Master",
        monthly_price: 49.0,
        yearly_price: Some(470.0),
        billing_ref: Some(BillingProductRef {
            monthly: "pri_01kgj1rte6wq33fjm02c9qhxv7",
            yearly: Some("pri_01kgj1sk8p5dn81ga46t2m0zwd"),
        }),
        limits: TierLimits {
            content_per_month: UNLIMITED_SENTINEL,
            images_per_month: UNLIMITED_SENTINEL,
            items_per_content_unit: 100,
            priority: Priority::High,
        },
    },
];

/// Resolve a tier by id, case-insensitively. Unknown or empty ids resolve to
/// the free tier; this function never fails.
pub fn resolve_tier(id: &str) -> &'static Tier {
    TIERS
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(id.trim()))
        .unwrap_or(&TIERS[0])
}

/// The free tier, the default for anonymous users and malformed cache state.
pub fn free_tier() -> &'static Tier {
    &TIERS[0]
}
