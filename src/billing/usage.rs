//! Usage resolution for the current billing month.
//!
//! Usage is recomputed from the actual content records every call, never
//! maintained as a running counter, so retries, crashes, and concurrent
//! writers cannot drift the numbers. The cost is an O(records-this-month)
//! scan, bounded by the monthly limits themselves.
//!
//! Month boundaries are based on the user's local time, matching the rest of
//! the product's local-midnight resets.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use tracing::{debug, warn};

use crate::billing::types::UsageStats;
use crate::cache::{JsonCache, USAGE_SNAPSHOT_KEY};
use crate::content::{RemoteContentRow, UsageBucket};
use crate::identity::IdentityProvider;
use crate::remote::RemoteStore;

/// Resolves per-category usage counts from the authoritative store, with a
/// locally cached snapshot as the offline fallback.
pub struct UsageResolver {
    remote: Arc<dyn RemoteStore>,
    identity: Arc<dyn IdentityProvider>,
    cache: Arc<JsonCache>,
}

impl UsageResolver {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
        cache: Arc<JsonCache>,
    ) -> Self {
        Self {
            remote,
            identity,
            cache,
        }
    }

    /// First instant of the current calendar month, local time.
    pub fn start_of_current_month() -> DateTime<Utc> {
        let now = Local::now();
        Local
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .earliest()
            .unwrap_or_else(|| now - chrono::Duration::days(31))
            .with_timezone(&Utc)
    }

    /// Resolve usage stats for the signed-in user.
    ///
    /// Anonymous sessions get all-zero stats: guests are never gated on
    /// historical usage. On remote failure the last good snapshot is
    /// returned; with no snapshot, zeros, never an error.
    pub async fn get_usage_stats(&self) -> UsageStats {
        let user = match self.identity.current_user() {
            Some(user) => user,
            None => return UsageStats::default(),
        };

        let start_of_month = Self::start_of_current_month();

        match self.remote.list_content(&user.id, Some(start_of_month)).await {
            Ok(rows) => {
                let stats = Self::classify(&rows, start_of_month);
                // Opportunistic snapshot for the offline fallback path.
                if let Err(e) = self.cache.put(USAGE_SNAPSHOT_KEY, &stats) {
                    warn!("Failed to cache usage snapshot: {}", e);
                }
                debug!(
                    content = stats.content_this_month,
                    images = stats.images_this_month,
                    manuscripts = stats.manuscripts_this_month,
                    "Resolved usage from remote records"
                );
                stats
            }
            Err(e) => {
                warn!("Usage fetch failed, using cached snapshot: {}", e);
                self.cache
                    .get::<UsageStats>(USAGE_SNAPSHOT_KEY)
                    .unwrap_or_default()
            }
        }
    }

    /// Count rows into buckets. Rows older than the month boundary are
    /// excluded even if the remote returned them.
    fn classify(rows: &[RemoteContentRow], start_of_month: DateTime<Utc>) -> UsageStats {
        let mut stats = UsageStats::default();
        for row in rows {
            if row.created_at < start_of_month {
                continue;
            }
            for bucket in row.category.counting_buckets() {
                match bucket {
                    UsageBucket::Content => stats.content_this_month += 1,
                    UsageBucket::Image => stats.images_this_month += 1,
                    UsageBucket::Manuscript => stats.manuscripts_this_month += 1,
                }
            }
        }
        stats
    }
}
