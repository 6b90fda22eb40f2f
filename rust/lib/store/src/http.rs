use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{EntityId, EntityKind, EntityStore, Link};

/// Connection settings for [`HttpStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Base endpoint, e.g. `http://localhost:8080/api`.
    pub endpoint: String,

    /// Per-request timeout. `None` leaves reqwest's default (no timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl HttpStoreConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: None,
        }
    }
}

/// REST-backed [`EntityStore`].
///
/// Paths are `{endpoint}/{kind}` and `{endpoint}/{kind}/{id}`; relationship
/// sub-resources live under `{endpoint}/{owner}/{id}/{target}`.
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
}

/// What a 404/409 response refers to.
type Addressed = Option<(EntityKind, EntityId)>;

impl HttpStore {
    pub fn new(config: &HttpStoreConfig) -> Result<Self, StoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// `{endpoint}/members`
    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.plural())
    }

    /// `{endpoint}/members/3`
    fn item_url(&self, kind: EntityKind, id: EntityId) -> String {
        format!("{}/{}", self.collection_url(kind), id)
    }

    /// `{endpoint}/members/3/roles`
    fn related_url(&self, link: Link, owner_id: EntityId) -> String {
        format!("{}/{}", self.base_url, link.path(owner_id))
    }

    /// `{endpoint}/members/3/roles/2`
    fn edge_url(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> String {
        format!("{}/{}", self.related_url(link, owner_id), target_id)
    }

    /// Map a non-success response to a `StoreError`.
    async fn check(resp: reqwest::Response, addressed: Addressed) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), addressed, message))
    }

    /// Decode a successful JSON body.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response, addressed: Addressed) -> Result<R, StoreError> {
        let resp = Self::check(resp, addressed).await?;
        resp.json::<R>()
            .await
            .map_err(|e| StoreError::Decode(format!("response body: {}", e)))
    }
}

/// 404/409 name the addressed record; without one (edge writes, where
/// either end may be missing) every status is a plain server error.
fn status_error(status: u16, addressed: Addressed, message: String) -> StoreError {
    match (status, addressed) {
        (404, Some((kind, id))) => StoreError::NotFound { kind, id },
        (409, Some((kind, id))) => StoreError::Conflict { kind, id },
        (status, _) => StoreError::Server { status, message },
    }
}

#[async_trait]
impl EntityStore for HttpStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, StoreError> {
        let url = self.collection_url(kind);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::parse(resp, None).await
    }

    async fn get(&self, kind: EntityKind, id: EntityId) -> Result<Value, StoreError> {
        let url = self.item_url(kind, id);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::parse(resp, Some((kind, id))).await
    }

    async fn insert(&self, kind: EntityKind, record: Value) -> Result<Value, StoreError> {
        let url = self.collection_url(kind);
        debug!("POST {}", url);
        let resp = self.http.post(&url).json(&record).send().await?;
        Self::parse(resp, None).await
    }

    async fn update(&self, kind: EntityKind, id: EntityId, patch: Value) -> Result<Value, StoreError> {
        let url = self.item_url(kind, id);
        debug!("PUT {}", url);
        let resp = self.http.put(&url).json(&patch).send().await?;
        Self::parse(resp, Some((kind, id))).await
    }

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<(), StoreError> {
        let url = self.item_url(kind, id);
        debug!("DELETE {}", url);
        let resp = self.http.delete(&url).send().await?;
        Self::check(resp, Some((kind, id))).await?;
        Ok(())
    }

    async fn related(&self, link: Link, owner_id: EntityId) -> Result<Vec<Value>, StoreError> {
        let url = self.related_url(link, owner_id);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::parse(resp, Some((link.owner(), owner_id))).await
    }

    async fn link(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> Result<(), StoreError> {
        let url = self.edge_url(link, owner_id, target_id);
        debug!("PUT {}", url);
        let resp = self.http.put(&url).send().await?;
        Self::check(resp, None).await?;
        Ok(())
    }

    async fn unlink(&self, link: Link, owner_id: EntityId, target_id: EntityId) -> Result<(), StoreError> {
        let url = self.edge_url(link, owner_id, target_id);
        debug!("DELETE {}", url);
        let resp = self.http.delete(&url).send().await?;
        Self::check(resp, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(endpoint: &str) -> HttpStore {
        HttpStore::new(&HttpStoreConfig::new(endpoint)).unwrap()
    }

    #[test]
    fn urls_follow_rest_layout() {
        let s = store("http://localhost:8080/api/");
        assert_eq!(s.collection_url(EntityKind::Key), "http://localhost:8080/api/keys");
        assert_eq!(s.item_url(EntityKind::Member, 3), "http://localhost:8080/api/members/3");
        assert_eq!(
            s.related_url(Link::DoorRoles, 2),
            "http://localhost:8080/api/doors/2/roles"
        );
        assert_eq!(
            s.edge_url(Link::RoleMembers, 1, 4),
            "http://localhost:8080/api/roles/1/members/4"
        );
    }

    #[test]
    fn statuses_map_to_store_errors() {
        let member = Some((EntityKind::Member, 3));
        let err = status_error(404, member, String::new());
        assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Member, id: 3 }));
        let err = status_error(409, member, String::new());
        assert!(matches!(err, StoreError::Conflict { id: 3, .. }));

        // Edge writes do not say which end is missing.
        let err = status_error(404, None, "no such role".into());
        assert!(matches!(err, StoreError::Server { status: 404, ref message } if message == "no such role"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn config_from_json() {
        let config: HttpStoreConfig =
            serde_json::from_str(r#"{"endpoint": "http://door.local", "timeout_secs": 5}"#).unwrap();
        assert_eq!(config.timeout_secs, Some(5));
        assert!(HttpStore::new(&config).is_ok());
    }
}
