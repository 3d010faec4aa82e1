//! Behavioural tests for place tagging and the proximity fan-out.

mod support;

use chrono::NaiveDate;
use pawmate::domain::geo::Coordinate;
use pawmate::domain::ports::{NotificationInbox, PlaceTaggingCommand, TagPlaceResponse};
use pawmate::domain::{NewPlaceTag, NotificationKind};
use pawmate::test_support::point_at_distance;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use support::Harness;

const ORIGIN: Coordinate = Coordinate::unchecked(0.0, 0.0);

#[derive(Default, ScenarioState)]
struct FanOutWorld {
    harness: Slot<Harness>,
    tagged: Slot<TagPlaceResponse>,
}

impl FanOutWorld {
    fn harness(&self) -> Harness {
        self.harness.get().expect("harness should be set")
    }

    fn place_deliveries(&self, name: &str) -> usize {
        let harness = self.harness();
        harness
            .notifier
            .count_for(&harness.user(name), NotificationKind::PetFriendlyPlace)
    }
}

#[fixture]
fn world() -> FanOutWorld {
    let world = FanOutWorld::default();
    let day = NaiveDate::from_ymd_opt(2026, 5, 1).expect("date");
    world.harness.set(Harness::on_day(day));
    world
}

#[given("{name} tags places from the origin")]
fn the_tagger_is_at_the_origin(world: &FanOutWorld, name: String) {
    world.harness().add_user(&name, Some(ORIGIN));
}

#[given("{name} lives {km} km from the origin")]
fn a_neighbour_lives_nearby(world: &FanOutWorld, name: String, km: f64) {
    world
        .harness()
        .add_user(&name, Some(point_at_distance(ORIGIN, km)));
}

#[given("pushes to {name} fail")]
fn pushes_fail(world: &FanOutWorld, name: String) {
    let harness = world.harness();
    harness.notifier.fail_for(&harness.user(&name));
}

#[when("{name} tags {place} at the origin")]
fn the_tagger_tags_a_place(world: &FanOutWorld, name: String, place: String) {
    let harness = world.harness();
    let response = harness
        .block_on(harness.engine.places.tag_place(NewPlaceTag {
            tagger: harness.user(&name),
            location: ORIGIN,
            place_name: place.trim_matches('"').to_owned(),
            is_pet_friendly: true,
            comment: "Shaded benches and a water bowl".to_owned(),
        }))
        .expect("tagging should succeed");
    world.tagged.set(response);
}

#[then("{count} neighbours are notified")]
fn neighbours_are_notified(world: &FanOutWorld, count: usize) {
    let tagged = world.tagged.get().expect("place should be tagged");
    assert_eq!(tagged.fan_out.notified, count);
    assert_eq!(tagged.fan_out.failed, 0);
}

#[then("{first} and {second} receive a pet friendly place notification")]
fn both_receive_a_notification(world: &FanOutWorld, first: String, second: String) {
    assert_eq!(world.place_deliveries(&first), 1);
    assert_eq!(world.place_deliveries(&second), 1);
}

#[then("{name} receives a pet friendly place notification")]
fn one_receives_a_notification(world: &FanOutWorld, name: String) {
    assert_eq!(world.place_deliveries(&name), 1);
}

#[then("{name} receives no notification")]
fn receives_nothing(world: &FanOutWorld, name: String) {
    let harness = world.harness();
    let user = harness.user(&name);
    assert_eq!(world.place_deliveries(&name), 0);
    let inbox = harness
        .block_on(harness.engine.inbox.list(user, false))
        .expect("inbox should load");
    assert!(inbox.is_empty());
}

#[then("{name} has {count} unread notification naming {place}")]
fn inbox_names_the_place(world: &FanOutWorld, name: String, count: usize, place: String) {
    let harness = world.harness();
    let inbox = harness
        .block_on(harness.engine.inbox.list(harness.user(&name), true))
        .expect("inbox should load");
    assert_eq!(inbox.len(), count);
    assert_eq!(world.place_deliveries(&name), 0);
    let notification = inbox.first().expect("notification");
    assert_eq!(notification.kind, NotificationKind::PetFriendlyPlace);
    assert_eq!(notification.payload["placeName"], place.trim_matches('"'));
}

#[scenario(
    path = "tests/features/place_fan_out.feature",
    name = "Only users within one kilometre are notified"
)]
fn only_users_within_one_kilometre_are_notified(world: FanOutWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/place_fan_out.feature",
    name = "A failed push still leaves the notification in the inbox"
)]
fn failed_pushes_keep_the_inbox_entry(world: FanOutWorld) {
    drop(world);
}
