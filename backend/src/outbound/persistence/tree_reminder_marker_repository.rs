//! Tree-backed `ReminderMarkerRepository` under `reminders/{uid}/{key}`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    ReminderMarkerRepository, ReminderMarkerRepositoryError, TreeStore, TreeStoreError,
};
use crate::domain::{ReminderDedupMarker, UserId};

use super::layout;
use super::store_error_mapping::{encode, map_basic_store_error};

fn map_store_error(error: TreeStoreError) -> ReminderMarkerRepositoryError {
    map_basic_store_error(
        error,
        ReminderMarkerRepositoryError::query,
        ReminderMarkerRepositoryError::connection,
    )
}

/// Dedup markers written after each successful reminder send.
#[derive(Clone)]
pub struct TreeReminderMarkerRepository {
    store: Arc<dyn TreeStore>,
}

impl TreeReminderMarkerRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReminderMarkerRepository for TreeReminderMarkerRepository {
    async fn exists(&self, user: &UserId, key: &str) -> Result<bool, ReminderMarkerRepositoryError> {
        let marker = self
            .store
            .get(&layout::reminder_marker(user, key))
            .await
            .map_err(map_store_error)?;
        Ok(marker.is_some())
    }

    async fn record(
        &self,
        marker: &ReminderDedupMarker,
    ) -> Result<(), ReminderMarkerRepositoryError> {
        let path = layout::reminder_marker(&marker.user_id, &marker.key);
        let value = encode(&path, marker).map_err(map_store_error)?;
        self.store.set(&path, value).await.map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{PetId, ReminderKind};
    use crate::outbound::store::MemoryTreeStore;

    #[tokio::test]
    async fn recorded_markers_are_found_per_user() {
        let repo = TreeReminderMarkerRepository::new(Arc::new(MemoryTreeStore::new()));
        let user = UserId::random();
        let marker = ReminderDedupMarker {
            user_id: user.clone(),
            key: "birthday_p1_2026-05-01".to_owned(),
            sent_at: Utc::now(),
            kind: ReminderKind::Birthday,
            pet_id: PetId::random(),
        };

        assert!(!repo.exists(&user, &marker.key).await.expect("exists"));
        repo.record(&marker).await.expect("record");
        assert!(repo.exists(&user, &marker.key).await.expect("exists"));
        assert!(!repo.exists(&UserId::random(), &marker.key).await.expect("exists"));
    }
}
