//! Driving ports for creating, transitioning and listing match requests.

use async_trait::async_trait;

use crate::domain::{
    Error, MatchRequest, MatchRequestView, NewMatchRequest, RequestDirection, RequestId,
    RequestStatus, UserId,
};

/// Driving port for request writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRequestCommand: Send + Sync {
    /// Open a pending request and notify the receiver.
    ///
    /// Fails with `Conflict` while the same ordered pet pair already has a
    /// pending or accepted request.
    async fn create_request(&self, request: NewMatchRequest) -> Result<RequestId, Error>;

    /// Move a request to `status` and return the stored record.
    ///
    /// Repeating the transition that already happened succeeds without side
    /// effects; any other change out of a terminal state is a `Conflict`.
    async fn transition(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<MatchRequest, Error>;
}

/// Driving port for request reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRequestQuery: Send + Sync {
    /// Requests in `user`'s `direction` index, newest first.
    async fn list_requests(
        &self,
        user: UserId,
        direction: RequestDirection,
    ) -> Result<Vec<MatchRequestView>, Error>;
}
