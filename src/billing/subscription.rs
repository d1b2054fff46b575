//! Subscription lifecycle.
//!
//! Consumes payment-provider checkout events and durably records tier
//! changes: local cache first (the UI reflects the new tier without waiting
//! on the network), then a best-effort mirror to the authoritative store.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::billing::types::{GateAction, SubscriptionState, SubscriptionStatus};
use crate::cache::{JsonCache, SUBSCRIPTION_KEY};
use crate::error::CoreError;
use crate::identity::IdentityProvider;
use crate::remote::{RemoteProfileRow, RemoteStore};
use crate::tiers::{resolve_tier, Tier};

/// Hook invoked after a lifecycle event persists, so the host can do a full
/// reload of derived state rather than a partial patch.
type RefreshHook = Box<dyn Fn() + Send + Sync>;

/// Parsed `checkout.completed` payload from the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCompleted {
    /// Tier id carried in the checkout's custom metadata.
    pub tier_id: String,
    pub subscription_ref: Option<String>,
    pub next_payment_date: Option<DateTime<Utc>>,
}

/// Reacts to payment-provider events and owns the cached subscription state.
pub struct SubscriptionLifecycle {
    remote: Arc<dyn RemoteStore>,
    identity: Arc<dyn IdentityProvider>,
    cache: Arc<JsonCache>,
    refresh_hook: Mutex<Option<RefreshHook>>,
}

impl SubscriptionLifecycle {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
        cache: Arc<JsonCache>,
    ) -> Self {
        Self {
            remote,
            identity,
            cache,
            refresh_hook: Mutex::new(None),
        }
    }

    /// Register the host's full-refresh callback.
    pub fn set_refresh_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.refresh_hook.lock().unwrap() = Some(Box::new(hook));
    }

    fn trigger_refresh(&self) {
        if let Some(hook) = self.refresh_hook.lock().unwrap().as_ref() {
            hook();
        }
    }

    /// Handle a completed checkout: cache the new state locally, mirror the
    /// profile remotely best-effort, then trigger a full refresh.
    pub async fn on_checkout_completed(
        &self,
        payload: CheckoutCompleted,
    ) -> Result<SubscriptionState, CoreError> {
        let state = SubscriptionState {
            tier_id: resolve_tier(&payload.tier_id).id.to_string(),
            external_subscription_ref: payload.subscription_ref,
            status: SubscriptionStatus::Active,
            current_period_end: payload.next_payment_date.map(|d| d.timestamp_millis()),
            cached_at: Utc::now().timestamp_millis(),
            ..Default::default()
        };

        self.cache.put(SUBSCRIPTION_KEY, &state)?;
        debug!(tier = %state.tier_id, "Cached subscription from checkout");

        self.mirror_profile(&state).await;
        self.trigger_refresh();
        Ok(state)
    }

    /// Mark the subscription cancelled. Usage history is kept; access until
    /// `current_period_end` is the consumer's concern.
    pub async fn on_cancel(&self) -> Result<SubscriptionState, CoreError> {
        let mut state = self.current_state();
        state.status = SubscriptionStatus::Cancelled;
        state.cached_at = Utc::now().timestamp_millis();

        self.cache.put(SUBSCRIPTION_KEY, &state)?;

        if let Some(user) = self.identity.current_user() {
            if let Err(e) = self
                .remote
                .set_profile_status(&user.id, SubscriptionStatus::Cancelled)
                .await
            {
                warn!("Remote cancel mirror failed: {}", e);
            }
        }

        self.trigger_refresh();
        Ok(state)
    }

    async fn mirror_profile(&self, state: &SubscriptionState) {
        let Some(user) = self.identity.current_user() else {
            return;
        };
        let row = RemoteProfileRow {
            user_id: user.id,
            tier_id: state.tier_id.clone(),
            status: state.status,
            subscription_ref: state.external_subscription_ref.clone(),
            current_period_end: state.current_period_end,
        };
        if let Err(e) = self.remote.upsert_profile(row).await {
            warn!("Remote profile mirror failed: {}", e);
        }
    }

    /// The locally cached state; missing or malformed cache reads as the
    /// free-tier default.
    pub fn current_state(&self) -> SubscriptionState {
        self.cache
            .get::<SubscriptionState>(SUBSCRIPTION_KEY)
            .unwrap_or_default()
    }

    /// The tier of the cached state. Never fails; unknown ids resolve free.
    pub fn current_tier(&self) -> &'static Tier {
        resolve_tier(&self.current_state().tier_id)
    }

    /// Bump the advisory local counters after a tracked action. Gating does
    /// not read these; they feed offline UI meters only.
    pub fn track_usage(&self, action: GateAction) -> Result<(), CoreError> {
        let mut state = self.current_state();
        match action {
            GateAction::Book | GateAction::Manuscript => state.usage.content_this_month += 1,
            GateAction::Image => state.usage.images_this_month += 1,
        }
        self.cache.put(SUBSCRIPTION_KEY, &state)
    }

    /// Zero the advisory counters (monthly rollover).
    pub fn reset_usage_counters(&self) -> Result<(), CoreError> {
        let mut state = self.current_state();
        state.usage = Default::default();
        self.cache.put(SUBSCRIPTION_KEY, &state)
    }

    /// Drop the cached state (sign-out).
    pub fn clear_cache(&self) {
        self.cache.remove(SUBSCRIPTION_KEY);
    }
}
