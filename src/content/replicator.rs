//! Content replication layer.
//!
//! A two-tier cache with an asymmetric policy: writes land in the local
//! durable store always and mirror to the remote store best-effort; reads
//! prefer the remote store (source of truth for multi-device history) and
//! fall back to local on any remote failure or absent identity.
//!
//! `save` resolves as soon as the local write commits. Callers must not
//! assume the remote mirror has completed when it returns.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::content::local::LocalContentStore;
use crate::content::record::{ContentCategory, ContentRecord};
use crate::error::CoreError;
use crate::identity::IdentityProvider;
use crate::remote::RemoteStore;

/// Local-first, remote-mirrored store of content records.
pub struct ContentReplicator {
    local: Arc<LocalContentStore>,
    remote: Arc<dyn RemoteStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ContentReplicator {
    pub fn new(
        local: Arc<LocalContentStore>,
        remote: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            local,
            remote,
            identity,
        }
    }

    /// Persist a record. The local write is the durability guarantee and its
    /// failure propagates; the remote mirror is best-effort and never fails
    /// the call.
    pub async fn save(&self, record: &ContentRecord) -> Result<(), CoreError> {
        self.local.put(record)?;

        if let Some(user) = self.identity.current_user() {
            let row = record.to_remote_row(&user.id);
            if let Err(e) = self.remote.upsert_content(row).await {
                warn!(id = %record.id, "Remote mirror failed, record kept locally: {}", e);
            }
        }

        Ok(())
    }

    /// Load every record, newest first. Remote-preferred when an identity
    /// resolves; any remote failure falls back to the local store.
    pub async fn load_all(&self) -> Result<Vec<ContentRecord>, CoreError> {
        if let Some(user) = self.identity.current_user() {
            match self.remote.list_content(&user.id, None).await {
                Ok(rows) => {
                    return Ok(rows.into_iter().map(ContentRecord::from).collect());
                }
                Err(e) => {
                    warn!("Remote fetch failed, using local store: {}", e);
                }
            }
        }

        let mut records = self.local.get_all()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Most recent record in a category, with the same remote-preferred,
    /// local-fallback policy as `load_all`.
    pub async fn load_latest(
        &self,
        category: ContentCategory,
    ) -> Result<Option<ContentRecord>, CoreError> {
        let records = self.load_all().await?;
        Ok(records.into_iter().find(|r| r.category == category))
    }

    /// Delete locally unconditionally; attempt the remote delete best-effort.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.local.delete(id)?;

        if self.identity.current_user().is_some() {
            if let Err(e) = self.remote.delete_content(id).await {
                warn!(id = id, "Remote delete failed: {}", e);
            }
        }

        debug!(id = id, "Deleted content record");
        Ok(())
    }

    /// Wipe the local store only (sign-out path). Remote history is kept.
    pub fn clear_local(&self) -> Result<(), CoreError> {
        self.local.clear()
    }
}
