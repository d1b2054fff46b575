//! HTTP implementation of the remote authoritative store.
//!
//! Talks to a PostgREST-style endpoint: upserts are POSTs with
//! `Prefer: resolution=merge-duplicates`, selects are query-string filters.
//! One pooled client is shared across all calls.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use super::{RemoteProfileRow, RemoteStore};
use crate::billing::SubscriptionStatus;
use crate::content::RemoteContentRow;
use crate::error::RemoteError;

/// Shared HTTP client for remote store calls.
///
/// Connection pooling and TLS session reuse matter here: every save mirrors
/// a row, so calls are frequent and small.
static REMOTE_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .expect("Failed to create remote store HTTP client")
});

const ENV_REMOTE_URL: &str = "PUBLISHLAB_REMOTE_URL";
const ENV_REMOTE_KEY: &str = "PUBLISHLAB_REMOTE_KEY";

/// Remote store over HTTP.
pub struct HttpRemoteStore {
    base_url: String,
    api_key: String,
}

impl HttpRemoteStore {
    /// Build against an explicit endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build from `PUBLISHLAB_REMOTE_URL` / `PUBLISHLAB_REMOTE_KEY`,
    /// loading `.env` if present. Returns `None` (with a warning) when the
    /// endpoint is not configured; callers then run local-only.
    pub fn from_env() -> Option<Self> {
        let _ = dotenvy::dotenv();

        let url = std::env::var(ENV_REMOTE_URL).ok();
        let key = std::env::var(ENV_REMOTE_KEY).ok();

        match (url, key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Some(Self::new(url, key))
            }
            _ => {
                warn!("Remote store URL or key missing; running local-only");
                None
            }
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn upsert_content(&self, row: RemoteContentRow) -> Result<(), RemoteError> {
        let response = self
            .authed(REMOTE_CLIENT.post(self.table_url("content")))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[row])
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn list_content(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteContentRow>, RemoteError> {
        let mut query = vec![
            ("user_id".to_string(), format!("eq.{}", user_id)),
            ("order".to_string(), "created_at.desc".to_string()),
        ];
        if let Some(since) = since {
            query.push((
                "created_at".to_string(),
                format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ));
        }

        let response = self
            .authed(REMOTE_CLIENT.get(self.table_url("content")))
            .query(&query)
            .send()
            .await?;
        let response = Self::expect_success(response).await?;

        let rows: Vec<RemoteContentRow> = response.json().await?;
        Ok(rows)
    }

    async fn delete_content(&self, id: &str) -> Result<(), RemoteError> {
        let response = self
            .authed(REMOTE_CLIENT.delete(self.table_url("content")))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn upsert_profile(&self, row: RemoteProfileRow) -> Result<(), RemoteError> {
        let response = self
            .authed(REMOTE_CLIENT.post(self.table_url("profiles")))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[row])
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn set_profile_status(
        &self,
        user_id: &str,
        status: SubscriptionStatus,
    ) -> Result<(), RemoteError> {
        let response = self
            .authed(REMOTE_CLIENT.patch(self.table_url("profiles")))
            .query(&[("user_id", format!("eq.{}", user_id))])
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let store = HttpRemoteStore::new("https://db.example.com/", "key");
        assert_eq!(
            store.table_url("content"),
            "https://db.example.com/rest/v1/content"
        );
    }

    #[test]
    fn test_from_env_without_config_is_none() {
        std::env::remove_var(ENV_REMOTE_URL);
        std::env::remove_var(ENV_REMOTE_KEY);
        assert!(HttpRemoteStore::from_env().is_none());
    }
}
