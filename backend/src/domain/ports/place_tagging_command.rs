//! Driving port for tagging places.

use async_trait::async_trait;

use crate::domain::{Error, FanOutReport, NewPlaceTag, TaggedPlace};

/// Outcome of a tag operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TagPlaceResponse {
    pub place: TaggedPlace,
    pub fan_out: FanOutReport,
}

/// Driving port for recording a place and notifying nearby users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceTaggingCommand: Send + Sync {
    /// Write the place, then fan out best effort. Succeeds once the place is
    /// stored regardless of fan-out failures.
    async fn tag_place(&self, tag: NewPlaceTag) -> Result<TagPlaceResponse, Error>;
}
