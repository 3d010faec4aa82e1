//! Match request service implementing the request driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    MatchRequestCommand, MatchRequestQuery, MatchRequestRepository, MatchRequestRepositoryError,
};
use crate::domain::{Error, NotificationDispatcher, NotificationKind, UserId};

use super::{
    MatchRequest, MatchRequestView, NewMatchRequest, PairClaim, RequestDirection, RequestId,
    RequestPair, RequestStatus, TransitionOutcome,
};

fn map_repository_error(error: MatchRequestRepositoryError) -> Error {
    match error {
        MatchRequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("match request repository unavailable: {message}"))
        }
        MatchRequestRepositoryError::Query { message } => {
            Error::internal(format!("match request repository error: {message}"))
        }
    }
}

/// Claim attempts before a contended pair is reported as a conflict.
const CLAIM_ATTEMPTS: usize = 3;

fn pair_conflict(pair: &RequestPair, holder: Option<&RequestId>) -> Error {
    let mut details = json!({
        "senderPetId": pair.sender_pet.to_string(),
        "receiverPetId": pair.receiver_pet.to_string(),
        "code": "duplicate_request",
    });
    if let Some(holder) = holder {
        details["requestId"] = json!(holder.to_string());
    }
    Error::conflict("an open request already exists for this pet pair").with_details(details)
}

/// Request lifecycle service.
#[derive(Clone)]
pub struct MatchRequestService<R> {
    requests: Arc<R>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

impl<R> MatchRequestService<R> {
    /// Create a service over the request repository.
    pub fn new(requests: Arc<R>, dispatcher: NotificationDispatcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests,
            dispatcher,
            clock,
        }
    }
}

impl<R> MatchRequestService<R>
where
    R: MatchRequestRepository,
{
    /// Take the pair claim for `id`.
    ///
    /// An existing claim blocks while its request holds the pair, or while it
    /// has no record yet but is younger than [`CLAIM_GRACE_SECS`]. Anything
    /// else is stale and is swapped out by compare-and-set, so two creates
    /// racing for one stale claim cannot both win.
    ///
    /// [`CLAIM_GRACE_SECS`]: super::CLAIM_GRACE_SECS
    async fn claim(&self, pair: &RequestPair, id: &RequestId) -> Result<(), Error> {
        let now = self.clock.utc();
        let claim = PairClaim::new(*id, now);

        for _ in 0..CLAIM_ATTEMPTS {
            if self
                .requests
                .claim_pair(pair, &claim)
                .await
                .map_err(map_repository_error)?
            {
                return Ok(());
            }

            let Some(holder) = self
                .requests
                .pair_holder(pair)
                .await
                .map_err(map_repository_error)?
            else {
                continue;
            };
            let existing = self
                .requests
                .find(&holder.request_id)
                .await
                .map_err(map_repository_error)?;
            let live = match existing {
                Some(request) => request.status.holds_pair(),
                None => holder.in_flight_at(now),
            };
            if live {
                return Err(pair_conflict(pair, Some(&holder.request_id)));
            }

            warn!(pair = %pair.key(), stale_holder = %holder.request_id, "replacing stale pair claim");
            if self
                .requests
                .replace_pair_holder(pair, &holder, &claim)
                .await
                .map_err(map_repository_error)?
            {
                return Ok(());
            }
        }
        Err(pair_conflict(pair, None))
    }

    async fn release(&self, pair: &RequestPair, holder: &RequestId) {
        if let Err(error) = self.requests.release_pair(pair, holder).await {
            warn!(pair = %pair.key(), %error, "failed to release pair claim");
        }
    }

    async fn announce(&self, recipient: &UserId, kind: NotificationKind, request: &MatchRequest) {
        let payload = json!({
            "requestId": request.id.to_string(),
            "senderId": request.sender_id.to_string(),
            "senderPetId": request.sender_pet_id.to_string(),
            "receiverId": request.receiver_id.to_string(),
            "receiverPetId": request.receiver_pet_id.to_string(),
            "message": request.message,
            "status": request.status.as_str(),
        });
        if let Err(error) = self.dispatcher.deliver_to(recipient, kind, payload).await {
            warn!(
                request_id = %request.id,
                user_id = %recipient,
                %kind,
                %error,
                "failed to record request notification"
            );
        }
    }
}

#[async_trait]
impl<R> MatchRequestCommand for MatchRequestService<R>
where
    R: MatchRequestRepository,
{
    async fn create_request(&self, draft: NewMatchRequest) -> Result<RequestId, Error> {
        draft
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let id = RequestId::generate();
        let pair = draft.pair();
        self.claim(&pair, &id).await?;

        let request = MatchRequest::pending(id, draft, self.clock.utc());
        if let Err(error) = self.requests.insert(&request).await {
            self.release(&pair, &id).await;
            return Err(map_repository_error(error));
        }
        info!(
            request_id = %id,
            sender_id = %request.sender_id,
            receiver_id = %request.receiver_id,
            "match request created"
        );

        self.announce(&request.receiver_id, NotificationKind::MatingRequest, &request)
            .await;
        Ok(id)
    }

    async fn transition(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<MatchRequest, Error> {
        let mut request = self
            .requests
            .find(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("match request {id} not found")))?;

        let outcome = request
            .status
            .transition(status)
            .map_err(|err| Error::conflict(err.to_string()))?;
        if outcome == TransitionOutcome::Unchanged {
            return Ok(request);
        }

        let now = self.clock.utc();
        self.requests
            .update_status(&id, status, now)
            .await
            .map_err(map_repository_error)?;
        request.status = status;
        request.updated_at = now;
        info!(request_id = %id, %status, "match request transitioned");

        match status {
            RequestStatus::Accepted => {
                self.announce(&request.sender_id, NotificationKind::RequestAccepted, &request)
                    .await;
            }
            RequestStatus::Declined => self.release(&request.pair(), &id).await,
            RequestStatus::Pending => {}
        }
        Ok(request)
    }
}

#[async_trait]
impl<R> MatchRequestQuery for MatchRequestService<R>
where
    R: MatchRequestRepository,
{
    async fn list_requests(
        &self,
        user: UserId,
        direction: RequestDirection,
    ) -> Result<Vec<MatchRequestView>, Error> {
        let mut requests = self
            .requests
            .list_for_user(&user, direction)
            .await
            .map_err(map_repository_error)?;
        requests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(requests
            .into_iter()
            .map(|request| request.viewed_as(direction))
            .collect())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
