//! Entitlement and durable-content core for the PublishLab studio.
//!
//! This crate owns the logic that classifies a user into a subscription
//! tier, computes monthly usage from stored records, gates quota-limited
//! actions, and persists generated artifacts local-first with a best-effort
//! remote mirror. It is a library layer consumed by UI hosts; the host
//! injects the identity provider and the two store handles.

pub mod billing;
pub mod cache;
pub mod content;
pub mod error;
pub mod identity;
pub mod remote;
pub mod tiers;

use std::sync::Arc;

use billing::{GateAction, GateDecision, GatingEngine, SubscriptionLifecycle, UsageResolver};
use cache::JsonCache;
use content::{ContentReplicator, LocalContentStore};
use error::CoreError;
use identity::IdentityProvider;
use remote::RemoteStore;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with the `RUST_LOG` env filter. Hosts call this once
/// at startup; calling it twice is harmless.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,publishlab_core=info")),
        )
        .try_init();
}

/// Aggregate state for a studio session: the replicated content store, the
/// usage resolver, the gating engine, and the subscription lifecycle, all
/// over one injected (local, remote, identity) triple.
pub struct StudioState {
    pub content: ContentReplicator,
    pub usage: UsageResolver,
    pub gating: GatingEngine,
    pub subscriptions: SubscriptionLifecycle,
}

impl StudioState {
    /// Build with the default on-disk cache location.
    pub fn new(
        local: Arc<LocalContentStore>,
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, CoreError> {
        Ok(Self::with_cache(
            local,
            remote,
            identity,
            Arc::new(JsonCache::new()?),
        ))
    }

    /// Build with an explicit cache, for hosts and tests that scope state.
    pub fn with_cache(
        local: Arc<LocalContentStore>,
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
        json_cache: Arc<JsonCache>,
    ) -> Self {
        Self {
            content: ContentReplicator::new(local, remote.clone(), identity.clone()),
            usage: UsageResolver::new(remote.clone(), identity.clone(), json_cache.clone()),
            gating: GatingEngine::new(),
            subscriptions: SubscriptionLifecycle::new(remote, identity, json_cache),
        }
    }

    /// Resolve current usage and gate an action against the cached tier.
    pub async fn check_gating(&self, action: GateAction) -> GateDecision {
        let tier = self.subscriptions.current_tier();
        let stats = self.usage.get_usage_stats().await;
        self.gating.check_gating(action, tier, &stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use content::{ContentCategory, ContentRecord};
    use identity::StaticIdentity;
    use remote::mock::MockRemoteStore;

    fn studio(
        remote: Arc<MockRemoteStore>,
        identity: StaticIdentity,
    ) -> (tempfile::TempDir, StudioState) {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalContentStore::open_at(dir.path().join("content.db")).unwrap());
        let cache = Arc::new(JsonCache::at_dir(dir.path().join("cache")).unwrap());
        (
            dir,
            StudioState::with_cache(local, remote, Arc::new(identity), cache),
        )
    }

    #[tokio::test]
    async fn test_free_user_at_image_limit_is_denied_with_novice_reason() {
        let remote = Arc::new(MockRemoteStore::new());
        // Five image-category records this month; the Novice plan allows 5.
        for _ in 0..5 {
            let record = ContentRecord::new(ContentCategory::TextToImage, "blob://img");
            remote
                .upsert_content(record.to_remote_row("u1"))
                .await
                .unwrap();
        }

        let (_dir, studio) = studio(remote, StaticIdentity::signed_in("u1"));

        let decision = studio.check_gating(GateAction::Image).await;
        assert!(!decision.allowed);
        assert!(decision.reason.unwrap().contains("Novice"));
    }

    #[tokio::test]
    async fn test_saved_record_survives_outage_and_restart() {
        let remote = Arc::new(MockRemoteStore::new());
        remote.set_unreachable(true);

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("content.db");

        let mut record = ContentRecord::new(ContentCategory::ManuscriptDoctor, "blob://m");
        record.id = "x1".to_string();
        record.created_at = Utc::now();

        {
            let local = Arc::new(LocalContentStore::open_at(&db_path).unwrap());
            let cache = Arc::new(JsonCache::at_dir(dir.path().join("cache")).unwrap());
            let studio = StudioState::with_cache(
                local,
                remote.clone(),
                Arc::new(StaticIdentity::signed_in("u1")),
                cache,
            );
            studio.content.save(&record).await.unwrap();
        }

        // Simulated process restart: re-open the local store.
        let local = Arc::new(LocalContentStore::open_at(&db_path).unwrap());
        let cache = Arc::new(JsonCache::at_dir(dir.path().join("cache")).unwrap());
        let studio = StudioState::with_cache(
            local,
            remote,
            Arc::new(StaticIdentity::signed_in("u1")),
            cache,
        );

        let loaded = studio.content.load_all().await.unwrap();
        assert!(loaded.iter().any(|r| r.id == "x1"));
    }

    #[tokio::test]
    async fn test_upgrade_lifts_the_gate() {
        let remote = Arc::new(MockRemoteStore::new());
        for _ in 0..5 {
            let record = ContentRecord::new(ContentCategory::PodMerch, "blob://img");
            remote
                .upsert_content(record.to_remote_row("u1"))
                .await
                .unwrap();
        }

        let (_dir, studio) = studio(remote, StaticIdentity::signed_in("u1"));
        assert!(!studio.check_gating(GateAction::Image).await.allowed);

        studio
            .subscriptions
            .on_checkout_completed(billing::CheckoutCompleted {
                tier_id: "artisan".to_string(),
                subscription_ref: Some("sub_1".to_string()),
                next_payment_date: None,
            })
            .await
            .unwrap();

        assert!(studio.check_gating(GateAction::Image).await.allowed);
    }
}
