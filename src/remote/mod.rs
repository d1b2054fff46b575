//! Remote authoritative store boundary.
//!
//! The network store is the source of truth for multi-device history whenever
//! it is reachable, but nothing in the core ever depends on it being
//! reachable: every caller catches `RemoteError` and falls back to local
//! state. Two logical tables, `content` and `profiles`, both partitioned by
//! owner user id.

mod http;

pub use http::HttpRemoteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::billing::SubscriptionStatus;
use crate::content::RemoteContentRow;
use crate::error::RemoteError;

/// Row shape of the remote `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProfileRow {
    pub user_id: String,
    pub tier_id: String,
    pub status: SubscriptionStatus,
    pub subscription_ref: Option<String>,
    /// Unix timestamp in ms.
    pub current_period_end: Option<i64>,
}

/// Authoritative remote store operations.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upsert a content row by id.
    async fn upsert_content(&self, row: RemoteContentRow) -> Result<(), RemoteError>;

    /// List content rows for a user, newest first, optionally restricted to
    /// rows created at or after `since`.
    async fn list_content(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteContentRow>, RemoteError>;

    /// Delete a content row by id.
    async fn delete_content(&self, id: &str) -> Result<(), RemoteError>;

    /// Upsert a subscription profile keyed by user id.
    async fn upsert_profile(&self, row: RemoteProfileRow) -> Result<(), RemoteError>;

    /// Update only the status field of a user's profile.
    async fn set_profile_status(
        &self,
        user_id: &str,
        status: SubscriptionStatus,
    ) -> Result<(), RemoteError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory remote store with a reachability switch, for exercising
    /// every fallback path.
    #[derive(Default)]
    pub struct MockRemoteStore {
        pub rows: Mutex<Vec<RemoteContentRow>>,
        pub profiles: Mutex<Vec<RemoteProfileRow>>,
        unreachable: AtomicBool,
    }

    impl MockRemoteStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_unreachable(&self, unreachable: bool) {
            self.unreachable.store(unreachable, Ordering::SeqCst);
        }

        fn check_reachable(&self) -> Result<(), RemoteError> {
            if self.unreachable.load(Ordering::SeqCst) {
                Err(RemoteError::Unreachable("mock remote is offline".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl RemoteStore for MockRemoteStore {
        async fn upsert_content(&self, row: RemoteContentRow) -> Result<(), RemoteError> {
            self.check_reachable()?;
            let mut rows = self.rows.lock().unwrap();
            if let Some(existing) = rows.iter_mut().find(|r| r.id == row.id) {
                *existing = row;
            } else {
                rows.push(row);
            }
            Ok(())
        }

        async fn list_content(
            &self,
            user_id: &str,
            since: Option<DateTime<Utc>>,
        ) -> Result<Vec<RemoteContentRow>, RemoteError> {
            self.check_reachable()?;
            let rows = self.rows.lock().unwrap();
            let mut matching: Vec<_> = rows
                .iter()
                .filter(|r| r.user_id == user_id)
                .filter(|r| since.map_or(true, |s| r.created_at >= s))
                .cloned()
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(matching)
        }

        async fn delete_content(&self, id: &str) -> Result<(), RemoteError> {
            self.check_reachable()?;
            self.rows.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }

        async fn upsert_profile(&self, row: RemoteProfileRow) -> Result<(), RemoteError> {
            self.check_reachable()?;
            let mut profiles = self.profiles.lock().unwrap();
            if let Some(existing) = profiles.iter_mut().find(|p| p.user_id == row.user_id) {
                *existing = row;
            } else {
                profiles.push(row);
            }
            Ok(())
        }

        async fn set_profile_status(
            &self,
            user_id: &str,
            status: SubscriptionStatus,
        ) -> Result<(), RemoteError> {
            self.check_reachable()?;
            let mut profiles = self.profiles.lock().unwrap();
            if let Some(existing) = profiles.iter_mut().find(|p| p.user_id == user_id) {
                existing.status = status;
            }
            Ok(())
        }
    }
}
