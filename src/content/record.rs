//! Content record definitions.
//!
//! A `ContentRecord` is one unit of user-generated output, tracked both for
//! durable storage and for monthly quota accounting. Records are created
//! exactly once at generation time and are immutable afterwards except for
//! deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Quota bucket a record can count toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageBucket {
    Content,
    Image,
    Manuscript,
}

/// Category of a generated artifact. Closed set; the wire names match the
/// authoritative store's `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentCategory {
    ColoringPages,
    ManuscriptDoctor,
    TextToImage,
    PodMerch,
    LogoCreator,
    PatternMaker,
    HdUpscaler,
    Project,
    /// Rows written by newer clients with categories this build does not
    /// know. Never fails a read; counts toward no quota.
    #[serde(other)]
    Other,
}

impl ContentCategory {
    /// Total mapping from category to the quota buckets it increments.
    /// Deliberately not 1:1: project states, logos, and unknown categories
    /// count toward nothing.
    pub fn counting_buckets(self) -> &'static [UsageBucket] {
        match self {
            Self::ColoringPages => &[UsageBucket::Content],
            Self::ManuscriptDoctor => &[UsageBucket::Manuscript],
            Self::TextToImage | Self::PodMerch => &[UsageBucket::Image],
            Self::LogoCreator
            | Self::PatternMaker
            | Self::HdUpscaler
            | Self::Project
            | Self::Other => &[],
        }
    }
}

/// One durable user-generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    /// Caller-generated, globally unique.
    pub id: String,
    pub owner_user_id: Option<String>,
    /// URL or blob reference to the generated payload.
    pub payload_ref: String,
    pub category: ContentCategory,
    pub created_at: DateTime<Utc>,
    /// Free-form, category-specific (blueprints, style profiles, SEO, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ContentRecord {
    /// Create a record with a fresh id, stamped now.
    pub fn new(category: ContentCategory, payload_ref: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_user_id: None,
            payload_ref: payload_ref.into(),
            category,
            created_at: Utc::now(),
            metadata: Map::new(),
        }
    }

    /// Reshape into the authoritative store's row schema.
    pub fn to_remote_row(&self, user_id: &str) -> RemoteContentRow {
        RemoteContentRow {
            id: self.id.clone(),
            user_id: user_id.to_string(),
            category: self.category,
            created_at: self.created_at,
            data: RemoteContentData {
                url: self.payload_ref.clone(),
                metadata: self.metadata.clone(),
            },
        }
    }
}

/// Row shape of the remote `content` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteContentRow {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub category: ContentCategory,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data: RemoteContentData,
}

/// Payload column of the remote `content` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteContentData {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl From<RemoteContentRow> for ContentRecord {
    fn from(row: RemoteContentRow) -> Self {
        Self {
            id: row.id,
            owner_user_id: Some(row.user_id),
            payload_ref: row.data.url,
            category: row.category,
            created_at: row.created_at,
            metadata: row.data.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&ContentCategory::ManuscriptDoctor).unwrap();
        assert_eq!(json, "\"MANUSCRIPT_DOCTOR\"");
        let json = serde_json::to_string(&ContentCategory::ColoringPages).unwrap();
        assert_eq!(json, "\"COLORING_PAGES\"");
    }

    #[test]
    fn test_unknown_category_decodes_to_other() {
        let cat: ContentCategory = serde_json::from_str("\"HOLOGRAM_STUDIO\"").unwrap();
        assert_eq!(cat, ContentCategory::Other);
        assert!(cat.counting_buckets().is_empty());
    }

    #[test]
    fn test_bucket_mapping_is_not_one_to_one() {
        assert_eq!(
            ContentCategory::TextToImage.counting_buckets(),
            [UsageBucket::Image].as_slice()
        );
        assert_eq!(
            ContentCategory::PodMerch.counting_buckets(),
            [UsageBucket::Image].as_slice()
        );
        assert!(ContentCategory::Project.counting_buckets().is_empty());
    }

    #[test]
    fn test_remote_row_roundtrip_preserves_record() {
        let mut record = ContentRecord::new(ContentCategory::TextToImage, "blob://abc");
        record
            .metadata
            .insert("prompt".into(), Value::String("a lighthouse".into()));

        let row = record.to_remote_row("user_1");
        let back: ContentRecord = row.into();

        assert_eq!(back.id, record.id);
        assert_eq!(back.owner_user_id.as_deref(), Some("user_1"));
        assert_eq!(back.payload_ref, record.payload_ref);
        assert_eq!(back.category, record.category);
        assert_eq!(back.created_at, record.created_at);
        assert_eq!(back.metadata, record.metadata);
    }
}
