//! Durable content subsystem: record types, the local SQLite store, and the
//! local-first replication layer over the remote authoritative store.

mod local;
mod record;
mod replicator;

pub use local::LocalContentStore;
pub use record::{
    ContentCategory, ContentRecord, RemoteContentData, RemoteContentRow, UsageBucket,
};
pub use replicator::ContentReplicator;
