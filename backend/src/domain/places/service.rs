//! Place tagging service with nearby-user fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::domain::geo::{
    DEFAULT_GEOHASH_PRECISION, FANOUT_CELL_PRECISION, covering_cells, geohash_encode,
    haversine_distance_km, round_km,
};
use crate::domain::ports::{
    PlaceRepository, PlaceRepositoryError, PlaceTaggingCommand, TagPlaceResponse, UserRepository,
    UserRepositoryError,
};
use crate::domain::{Error, NotificationDispatcher, NotificationKind, UserProfile};

use super::{FAN_OUT_RADIUS_KM, FanOutReport, NewPlaceTag, PlaceId, TaggedPlace};

fn map_place_error(error: PlaceRepositoryError) -> Error {
    match error {
        PlaceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("place repository unavailable: {message}"))
        }
        PlaceRepositoryError::Query { message } => {
            Error::internal(format!("place repository error: {message}"))
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be empty"))
            .with_details(json!({ "field": field, "code": "empty" })));
    }
    Ok(trimmed.to_owned())
}

/// Records pet-friendly places and notifies users within
/// [`FAN_OUT_RADIUS_KM`] of them.
#[derive(Clone)]
pub struct PlaceTaggingService {
    places: Arc<dyn PlaceRepository>,
    users: Arc<dyn UserRepository>,
    dispatcher: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

impl PlaceTaggingService {
    /// Create the service.
    pub fn new(
        places: Arc<dyn PlaceRepository>,
        users: Arc<dyn UserRepository>,
        dispatcher: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            places,
            users,
            dispatcher,
            clock,
        }
    }

    /// Candidate recipients from the bucket index, falling back to a full
    /// scan when the radius cannot be covered by one cell block.
    async fn candidates(
        &self,
        place: &TaggedPlace,
    ) -> Result<Vec<UserProfile>, UserRepositoryError> {
        match covering_cells(place.location, FAN_OUT_RADIUS_KM, FANOUT_CELL_PRECISION) {
            Some(cells) => self.users.list_in_cells(&cells).await,
            None => {
                warn!(place_id = %place.id, "no cell cover for fan-out radius; scanning all users");
                self.users.list_all().await
            }
        }
    }

    #[instrument(skip(self, place), fields(place_id = %place.id))]
    async fn fan_out(&self, place: &TaggedPlace) -> FanOutReport {
        let mut report = FanOutReport::default();
        let candidates = match self.candidates(place).await {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(%error, "fan-out candidate scan failed");
                return report;
            }
        };

        for user in candidates {
            if user.id == place.tagger_user_id {
                continue;
            }
            let Some(location) = user.location else {
                continue;
            };
            let distance = haversine_distance_km(place.location, location);
            if distance.is_nan() || distance > FAN_OUT_RADIUS_KM {
                continue;
            }
            let payload = json!({
                "placeId": place.id.to_string(),
                "placeName": place.place_name,
                "isPetFriendly": place.is_pet_friendly,
                "comment": place.comment,
                "taggerUserId": place.tagger_user_id.to_string(),
                "location": place.location,
                "distanceKm": round_km(distance),
            });
            match self
                .dispatcher
                .deliver(&user, NotificationKind::PetFriendlyPlace, payload)
                .await
            {
                Ok(_) => report.notified += 1,
                Err(error) => {
                    report.failed += 1;
                    warn!(user_id = %user.id, %error, "fan-out notification failed");
                }
            }
        }
        info!(notified = report.notified, failed = report.failed, "fan-out complete");
        report
    }
}

#[async_trait]
impl PlaceTaggingCommand for PlaceTaggingService {
    async fn tag_place(&self, tag: NewPlaceTag) -> Result<TagPlaceResponse, Error> {
        let place_name = required("placeName", &tag.place_name)?;
        let comment = required("comment", &tag.comment)?;

        let place = TaggedPlace {
            id: PlaceId::generate(),
            place_name,
            location: tag.location,
            geohash: geohash_encode(tag.location, DEFAULT_GEOHASH_PRECISION),
            is_pet_friendly: tag.is_pet_friendly,
            comment,
            tagger_user_id: tag.tagger,
            created_at: self.clock.utc(),
        };
        self.places.insert(&place).await.map_err(map_place_error)?;
        info!(place_id = %place.id, geohash = %place.geohash, "place tagged");

        let fan_out = self.fan_out(&place).await;
        Ok(TagPlaceResponse { place, fan_out })
    }
}
