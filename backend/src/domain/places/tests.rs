//! Tests for place tagging and the nearby-user fan-out.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::geo::{Coordinate, destination_point};
use crate::domain::ports::{
    MockNotificationRepository, MockPlaceRepository, MockUserRepository, NotificationRepositoryError,
    PlaceRepositoryError, PlaceTaggingCommand, UserRepositoryError,
};
use crate::domain::{
    DisplayName, ErrorCode, Notification, NotificationDispatcher, NotificationId, NotificationKind,
    UserProfile,
};
use crate::test_support::{MutableClock, RecordingNotifier, point_at_distance};

#[fixture]
fn park() -> Coordinate {
    Coordinate::new(51.5074, -0.1278).expect("valid coordinate")
}

fn user_at(location: Option<Coordinate>) -> UserProfile {
    let profile = UserProfile::new(UserId::random(), DisplayName::new("Neighbour").expect("valid"));
    match location {
        Some(location) => profile.with_location(location),
        None => profile,
    }
}

fn tag(tagger: UserId, location: Coordinate) -> NewPlaceTag {
    NewPlaceTag {
        tagger,
        location,
        place_name: "  Riverside Park ".to_owned(),
        is_pet_friendly: true,
        comment: " Water bowls at the gate ".to_owned(),
    }
}

fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    ))
}

fn inserting_places() -> MockPlaceRepository {
    let mut places = MockPlaceRepository::new();
    places.expect_insert().times(1).return_once(|_| Ok(()));
    places
}

fn dispatcher_with(
    notifications: MockNotificationRepository,
    notifier: Arc<RecordingNotifier>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(notifications),
        Arc::new(MockUserRepository::new()),
        notifier,
        clock(),
    )
}

fn appending() -> MockNotificationRepository {
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_append()
        .returning(|draft| Ok(Notification::from_new(NotificationId::new("n"), draft)));
    notifications
}

fn service(
    places: MockPlaceRepository,
    users: MockUserRepository,
    dispatcher: NotificationDispatcher,
) -> PlaceTaggingService {
    PlaceTaggingService::new(Arc::new(places), Arc::new(users), dispatcher, clock())
}

#[rstest]
#[case(0.5, true)]
#[case(1.0, true)]
#[case(1.5, false)]
#[tokio::test]
async fn fan_out_radius_is_inclusive(park: Coordinate, #[case] km: f64, #[case] notified: bool) {
    let neighbour = user_at(Some(point_at_distance(park, km)));
    let neighbour_id = neighbour.id.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_list_in_cells()
        .times(1)
        .return_once(move |_| Ok(vec![neighbour]));
    let notifier = RecordingNotifier::new();

    let response = service(
        inserting_places(),
        users,
        dispatcher_with(appending(), notifier.clone()),
    )
    .tag_place(tag(UserId::random(), park))
    .await
    .expect("tagged");

    assert_eq!(response.fan_out.notified, usize::from(notified));
    assert_eq!(
        notifier.count_for(&neighbour_id, NotificationKind::PetFriendlyPlace),
        usize::from(notified)
    );
}

#[rstest]
#[tokio::test]
async fn tagger_and_unlocated_users_are_skipped(park: Coordinate) {
    let tagger = user_at(Some(park));
    let tagger_id = tagger.id.clone();
    let near = user_at(Some(destination_point(park, 0.25, 90.0)));
    let unlocated = user_at(None);
    let mut users = MockUserRepository::new();
    users
        .expect_list_in_cells()
        .times(1)
        .return_once(move |_| Ok(vec![tagger, near, unlocated]));
    let notifier = RecordingNotifier::new();

    let response = service(
        inserting_places(),
        users,
        dispatcher_with(appending(), notifier.clone()),
    )
    .tag_place(tag(tagger_id, park))
    .await
    .expect("tagged");

    assert_eq!(response.fan_out, FanOutReport { notified: 1, failed: 0 });
    let deliveries = notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].payload["distanceKm"], 0.25);
    assert_eq!(deliveries[0].payload["placeName"], "Riverside Park");
}

#[rstest]
#[tokio::test]
async fn stored_place_is_trimmed_and_hashed(park: Coordinate) {
    let mut places = MockPlaceRepository::new();
    places
        .expect_insert()
        .withf(|place| {
            place.place_name == "Riverside Park"
                && place.comment == "Water bowls at the gate"
                && place.geohash.len() == 9
                && place.geohash.starts_with("gcpvj")
        })
        .times(1)
        .return_once(|_| Ok(()));
    let mut users = MockUserRepository::new();
    users.expect_list_in_cells().return_once(|_| Ok(Vec::new()));

    let response = service(places, users, dispatcher_with(appending(), RecordingNotifier::new()))
        .tag_place(tag(UserId::random(), park))
        .await
        .expect("tagged");
    assert_eq!(response.fan_out, FanOutReport::default());
}

#[rstest]
#[case::blank_name("   ", "comment")]
#[case::blank_comment("Park", "\t")]
#[tokio::test]
async fn blank_fields_are_rejected_before_writing(
    park: Coordinate,
    #[case] place_name: &str,
    #[case] comment: &str,
) {
    let mut places = MockPlaceRepository::new();
    places.expect_insert().times(0);
    let mut request = tag(UserId::random(), park);
    request.place_name = place_name.to_owned();
    request.comment = comment.to_owned();

    let err = service(
        places,
        MockUserRepository::new(),
        dispatcher_with(MockNotificationRepository::new(), RecordingNotifier::new()),
    )
    .tag_place(request)
    .await
    .expect_err("blank field");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn place_write_failures_surface(park: Coordinate) {
    let mut places = MockPlaceRepository::new();
    places
        .expect_insert()
        .times(1)
        .return_once(|_| Err(PlaceRepositoryError::connection("offline")));
    let mut users = MockUserRepository::new();
    users.expect_list_in_cells().times(0);

    let err = service(
        places,
        users,
        dispatcher_with(MockNotificationRepository::new(), RecordingNotifier::new()),
    )
    .tag_place(tag(UserId::random(), park))
    .await
    .expect_err("write failed");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn scan_failures_still_report_the_place(park: Coordinate) {
    let mut users = MockUserRepository::new();
    users
        .expect_list_in_cells()
        .times(1)
        .return_once(|_| Err(UserRepositoryError::query("index corrupt")));

    let response = service(
        inserting_places(),
        users,
        dispatcher_with(MockNotificationRepository::new(), RecordingNotifier::new()),
    )
    .tag_place(tag(UserId::random(), park))
    .await
    .expect("place stored");
    assert_eq!(response.fan_out, FanOutReport::default());
}

#[rstest]
#[tokio::test]
async fn per_user_failures_are_counted_and_skipped(park: Coordinate) {
    let first = user_at(Some(destination_point(park, 0.1, 0.0)));
    let second = user_at(Some(destination_point(park, 0.2, 0.0)));
    let first_id = first.id.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_list_in_cells()
        .times(1)
        .return_once(move |_| Ok(vec![first, second]));
    let mut notifications = MockNotificationRepository::new();
    notifications.expect_append().times(2).returning(move |draft| {
        if draft.recipient == first_id {
            Err(NotificationRepositoryError::query("write rejected"))
        } else {
            Ok(Notification::from_new(NotificationId::new("n"), draft))
        }
    });

    let response = service(
        inserting_places(),
        users,
        dispatcher_with(notifications, RecordingNotifier::new()),
    )
    .tag_place(tag(UserId::random(), park))
    .await
    .expect("tagged");
    assert_eq!(response.fan_out, FanOutReport { notified: 1, failed: 1 });
}

#[tokio::test]
async fn polar_places_fall_back_to_a_full_scan() {
    let pole = Coordinate::new(89.999, 10.0).expect("valid coordinate");
    let near = user_at(Some(destination_point(pole, 0.5, 45.0)));
    let mut users = MockUserRepository::new();
    users.expect_list_in_cells().times(0);
    users
        .expect_list_all()
        .times(1)
        .return_once(move || Ok(vec![near]));

    let response = service(
        inserting_places(),
        users,
        dispatcher_with(appending(), RecordingNotifier::new()),
    )
    .tag_place(tag(UserId::random(), pole))
    .await
    .expect("tagged");
    assert_eq!(response.fan_out.notified, 1);
}
