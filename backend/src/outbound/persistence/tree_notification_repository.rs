//! Tree-backed `NotificationRepository` under `notifications/{uid}/{id}`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::ports::{
    NotificationRepository, NotificationRepositoryError, TreeStore, TreeStoreError,
};
use crate::domain::{NewNotification, Notification, NotificationId, UserId};

use super::layout;
use super::store_error_mapping::{decode, encode, map_basic_store_error};

fn map_store_error(error: TreeStoreError) -> NotificationRepositoryError {
    map_basic_store_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

/// Append-only inbox entries keyed by store-allocated ids.
#[derive(Clone)]
pub struct TreeNotificationRepository {
    store: Arc<dyn TreeStore>,
}

impl TreeNotificationRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationRepository for TreeNotificationRepository {
    async fn append(
        &self,
        draft: NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let inbox = layout::notifications(&draft.recipient);
        let key = self.store.push(&inbox).await.map_err(map_store_error)?;
        let path = inbox.child(key.clone());
        let notification = Notification::from_new(NotificationId::new(key), draft);
        let value = encode(&path, &notification).map_err(map_store_error)?;
        self.store.set(&path, value).await.map_err(map_store_error)?;
        Ok(notification)
    }

    async fn list_for(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let inbox = layout::notifications(recipient);
        let entries = self.store.children(&inbox).await.map_err(map_store_error)?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| {
                let path = inbox.child(key);
                decode::<Notification>(&path, value)
                    .inspect_err(|error| warn!(%path, %error, "skipping malformed notification"))
                    .ok()
            })
            .collect())
    }

    async fn mark_read(
        &self,
        recipient: &UserId,
        id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let path = layout::notifications(recipient).child(id.as_ref());
        let exists = self
            .store
            .get(&path)
            .await
            .map_err(map_store_error)?
            .is_some();
        if !exists {
            return Ok(false);
        }
        let mut partial = Map::new();
        partial.insert("read".to_owned(), Value::Bool(true));
        self.store
            .update(&path, partial)
            .await
            .map_err(map_store_error)?;
        Ok(true)
    }
}
