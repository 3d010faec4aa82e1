//! Tree-backed `MatchRequestRepository`.
//!
//! The request lives once at `requests/{id}`. `sent/{sender}/{id}` and
//! `received/{receiver}/{id}` hold `true` and are resolved against the
//! record on read, so a status change is visible through both indexes at
//! once. The pair claim at `request_pairs/{senderPet}_{receiverPet}` holds
//! the owning request id and when it was claimed. Claims are only ever
//! replaced or released by compare-and-set against the value last read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::ports::{
    MatchRequestRepository, MatchRequestRepositoryError, TreeStore, TreeStoreError,
};
use crate::domain::{
    MatchRequest, PairClaim, RequestDirection, RequestId, RequestPair, RequestStatus, UserId,
};

use super::layout;
use super::store_error_mapping::{decode, encode, map_basic_store_error};

fn map_store_error(error: TreeStoreError) -> MatchRequestRepositoryError {
    map_basic_store_error(
        error,
        MatchRequestRepositoryError::query,
        MatchRequestRepositoryError::connection,
    )
}

/// Request records plus participant indexes and pair claims.
#[derive(Clone)]
pub struct TreeMatchRequestRepository {
    store: Arc<dyn TreeStore>,
}

impl TreeMatchRequestRepository {
    /// Create a repository over `store`.
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MatchRequestRepository for TreeMatchRequestRepository {
    async fn claim_pair(
        &self,
        pair: &RequestPair,
        claim: &PairClaim,
    ) -> Result<bool, MatchRequestRepositoryError> {
        let path = layout::request_pair(pair);
        let value = encode(&path, claim).map_err(map_store_error)?;
        self.store
            .set_if_absent(&path, value)
            .await
            .map_err(map_store_error)
    }

    async fn pair_holder(
        &self,
        pair: &RequestPair,
    ) -> Result<Option<PairClaim>, MatchRequestRepositoryError> {
        let path = layout::request_pair(pair);
        let Some(value) = self.store.get(&path).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        decode(&path, value).map(Some).map_err(map_store_error)
    }

    async fn replace_pair_holder(
        &self,
        pair: &RequestPair,
        stale: &PairClaim,
        claim: &PairClaim,
    ) -> Result<bool, MatchRequestRepositoryError> {
        let path = layout::request_pair(pair);
        let expected = encode(&path, stale).map_err(map_store_error)?;
        let value = encode(&path, claim).map_err(map_store_error)?;
        self.store
            .compare_and_set(&path, &expected, value)
            .await
            .map_err(map_store_error)
    }

    async fn release_pair(
        &self,
        pair: &RequestPair,
        holder: &RequestId,
    ) -> Result<(), MatchRequestRepositoryError> {
        let Some(current) = self.pair_holder(pair).await? else {
            return Ok(());
        };
        if current.request_id != *holder {
            debug!(pair = %pair.key(), %holder, owner = %current.request_id, "claim already moved on");
            return Ok(());
        }
        let path = layout::request_pair(pair);
        let expected = encode(&path, &current).map_err(map_store_error)?;
        let released = self
            .store
            .compare_and_set(&path, &expected, Value::Null)
            .await
            .map_err(map_store_error)?;
        if !released {
            debug!(pair = %pair.key(), %holder, "claim changed while releasing");
        }
        Ok(())
    }

    async fn insert(&self, request: &MatchRequest) -> Result<(), MatchRequestRepositoryError> {
        let path = layout::request(&request.id);
        let value = encode(&path, request).map_err(map_store_error)?;
        self.store.set(&path, value).await.map_err(map_store_error)?;

        let id = request.id.to_string();
        let pointers = [
            layout::request_index(RequestDirection::Sent, &request.sender_id).child(id.clone()),
            layout::request_index(RequestDirection::Received, &request.receiver_id).child(id),
        ];
        for pointer in &pointers {
            self.store
                .set(pointer, Value::Bool(true))
                .await
                .map_err(map_store_error)?;
        }
        Ok(())
    }

    async fn find(
        &self,
        id: &RequestId,
    ) -> Result<Option<MatchRequest>, MatchRequestRepositoryError> {
        let path = layout::request(id);
        let Some(value) = self.store.get(&path).await.map_err(map_store_error)? else {
            return Ok(None);
        };
        decode(&path, value).map(Some).map_err(map_store_error)
    }

    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), MatchRequestRepositoryError> {
        let mut partial = Map::new();
        partial.insert("status".to_owned(), json!(status));
        partial.insert("updatedAt".to_owned(), json!(updated_at));
        self.store
            .update(&layout::request(id), partial)
            .await
            .map_err(map_store_error)
    }

    async fn list_for_user(
        &self,
        user: &UserId,
        direction: RequestDirection,
    ) -> Result<Vec<MatchRequest>, MatchRequestRepositoryError> {
        let pointers = self
            .store
            .children(&layout::request_index(direction, user))
            .await
            .map_err(map_store_error)?;

        let mut requests = Vec::with_capacity(pointers.len());
        for (key, _) in pointers {
            let Ok(id) = key.parse::<RequestId>() else {
                debug!(key, "skipping malformed request pointer");
                continue;
            };
            match self.find(&id).await? {
                Some(request) => requests.push(request),
                None => debug!(request_id = %id, "request pointer has no record"),
            }
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::ports::StorePath;
    use crate::domain::{NewMatchRequest, PetId};
    use crate::outbound::store::MemoryTreeStore;

    fn request() -> MatchRequest {
        let now = Utc
            .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
            .single()
            .expect("valid timestamp");
        MatchRequest::pending(
            RequestId::generate(),
            NewMatchRequest {
                sender_id: UserId::random(),
                sender_pet_id: PetId::random(),
                receiver_id: UserId::random(),
                receiver_pet_id: PetId::random(),
                message: "Hi".to_owned(),
            },
            now,
        )
    }

    #[tokio::test]
    async fn both_indexes_observe_the_same_record() {
        let store = Arc::new(MemoryTreeStore::new());
        let repo = TreeMatchRequestRepository::new(store.clone());
        let request = request();
        repo.insert(&request).await.expect("insert");

        let later = request.created_at + chrono::TimeDelta::minutes(5);
        repo.update_status(&request.id, RequestStatus::Accepted, later)
            .await
            .expect("update");

        let sent = repo
            .list_for_user(&request.sender_id, RequestDirection::Sent)
            .await
            .expect("sent");
        let received = repo
            .list_for_user(&request.receiver_id, RequestDirection::Received)
            .await
            .expect("received");
        assert_eq!(sent, received);
        assert_eq!(sent[0].status, RequestStatus::Accepted);
        assert_eq!(sent[0].updated_at, later);
        assert!(
            repo.list_for_user(&request.sender_id, RequestDirection::Received)
                .await
                .expect("empty")
                .is_empty()
        );

        let pointer = store
            .get(&StorePath::parse(&format!("sent/{}/{}", request.sender_id, request.id)).expect("path"))
            .await
            .expect("get");
        assert_eq!(pointer, Some(Value::Bool(true)));
    }

    fn claim(at_minute: u32) -> PairClaim {
        let at = Utc
            .with_ymd_and_hms(2026, 2, 3, 4, at_minute, 0)
            .single()
            .expect("valid timestamp");
        PairClaim::new(RequestId::generate(), at)
    }

    #[tokio::test]
    async fn pair_claims_are_exclusive_until_released() {
        let repo = TreeMatchRequestRepository::new(Arc::new(MemoryTreeStore::new()));
        let pair = request().pair();
        let (first, second) = (claim(0), claim(1));

        assert!(repo.claim_pair(&pair, &first).await.expect("claim"));
        assert!(!repo.claim_pair(&pair, &second).await.expect("claim"));
        assert_eq!(repo.pair_holder(&pair).await.expect("holder"), Some(first));

        assert!(
            repo.replace_pair_holder(&pair, &first, &second)
                .await
                .expect("replace")
        );
        assert_eq!(repo.pair_holder(&pair).await.expect("holder"), Some(second));

        repo.release_pair(&pair, &second.request_id)
            .await
            .expect("release");
        assert_eq!(repo.pair_holder(&pair).await.expect("holder"), None);
    }

    #[tokio::test]
    async fn replacing_an_outdated_claim_fails() {
        let repo = TreeMatchRequestRepository::new(Arc::new(MemoryTreeStore::new()));
        let pair = request().pair();
        let (stale, winner, loser) = (claim(0), claim(1), claim(2));
        repo.claim_pair(&pair, &stale).await.expect("claim");

        assert!(repo.replace_pair_holder(&pair, &stale, &winner).await.expect("replace"));
        assert!(!repo.replace_pair_holder(&pair, &stale, &loser).await.expect("replace"));
        assert_eq!(repo.pair_holder(&pair).await.expect("holder"), Some(winner));
    }

    #[tokio::test]
    async fn releasing_leaves_another_holders_claim_alone() {
        let repo = TreeMatchRequestRepository::new(Arc::new(MemoryTreeStore::new()));
        let pair = request().pair();
        let (declined, newer) = (claim(0), claim(1));
        repo.claim_pair(&pair, &newer).await.expect("claim");

        repo.release_pair(&pair, &declined.request_id)
            .await
            .expect("release");

        assert_eq!(repo.pair_holder(&pair).await.expect("holder"), Some(newer));
    }

    #[tokio::test]
    async fn dangling_pointers_are_skipped() {
        let store = Arc::new(MemoryTreeStore::new());
        let repo = TreeMatchRequestRepository::new(store.clone());
        let user = UserId::random();
        let orphan = RequestId::generate();
        store
            .set(
                &layout::request_index(RequestDirection::Sent, &user).child(orphan.to_string()),
                Value::Bool(true),
            )
            .await
            .expect("set");

        let listed = repo
            .list_for_user(&user, RequestDirection::Sent)
            .await
            .expect("list");
        assert!(listed.is_empty());
    }
}
