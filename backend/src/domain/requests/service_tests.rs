//! Tests for the match request service.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockMatchRequestRepository, MockNotificationRepository, MockUserRepository};
use crate::domain::{DisplayName, ErrorCode, Notification, NotificationId, PetId, UserProfile};
use crate::outbound::persistence::TreeMatchRequestRepository;
use crate::outbound::store::MemoryTreeStore;
use crate::test_support::{MutableClock, RecordingNotifier};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 2, 14, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn draft() -> NewMatchRequest {
    NewMatchRequest {
        sender_id: UserId::random(),
        sender_pet_id: PetId::random(),
        receiver_id: UserId::random(),
        receiver_pet_id: PetId::random(),
        message: "Playdate?".to_owned(),
    }
}

struct Harness {
    notifier: Arc<RecordingNotifier>,
    dispatcher: NotificationDispatcher,
}

/// Dispatcher expecting exactly `appends` inbox writes.
fn harness(appends: usize) -> Harness {
    let mut notifications = MockNotificationRepository::new();
    notifications
        .expect_append()
        .times(appends)
        .returning(|draft| Ok(Notification::from_new(NotificationId::new("n"), draft)));
    let mut users = MockUserRepository::new();
    users.expect_find().returning(|id| {
        Ok(Some(UserProfile::new(
            id.clone(),
            DisplayName::new("Owner").expect("valid name"),
        )))
    });
    let notifier = RecordingNotifier::new();
    let dispatcher = NotificationDispatcher::new(
        Arc::new(notifications),
        Arc::new(users),
        notifier.clone(),
        Arc::new(MutableClock::new(now())),
    );
    Harness {
        notifier,
        dispatcher,
    }
}

fn service(
    repo: MockMatchRequestRepository,
    dispatcher: NotificationDispatcher,
) -> MatchRequestService<MockMatchRequestRepository> {
    MatchRequestService::new(
        Arc::new(repo),
        dispatcher,
        Arc::new(MutableClock::new(now())),
    )
}

fn stored(status: RequestStatus) -> MatchRequest {
    let mut request = MatchRequest::pending(RequestId::generate(), draft(), now());
    request.status = status;
    request
}

#[tokio::test]
async fn create_request_claims_inserts_and_notifies_receiver() {
    let request = draft();
    let receiver = request.receiver_id.clone();
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(1).return_once(|_, _| Ok(true));
    repo.expect_insert()
        .withf(|record| record.status == RequestStatus::Pending && record.created_at == now())
        .times(1)
        .return_once(|_| Ok(()));
    let Harness {
        notifier,
        dispatcher,
    } = harness(1);

    let id = service(repo, dispatcher)
        .create_request(request)
        .await
        .expect("request created");

    let deliveries = notifier.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].user_id, receiver);
    assert_eq!(deliveries[0].kind, NotificationKind::MatingRequest);
    assert_eq!(deliveries[0].payload["requestId"], id.to_string());
}

#[rstest]
#[case::self_request(|d: &mut NewMatchRequest| d.receiver_id = d.sender_id.clone())]
#[case::same_pet(|d: &mut NewMatchRequest| d.receiver_pet_id = d.sender_pet_id)]
#[case::long_message(|d: &mut NewMatchRequest| d.message = "x".repeat(501))]
#[tokio::test]
async fn invalid_drafts_touch_nothing(#[case] corrupt: fn(&mut NewMatchRequest)) {
    let mut request = draft();
    corrupt(&mut request);
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(0);
    repo.expect_insert().times(0);

    let err = service(repo, harness(0).dispatcher)
        .create_request(request)
        .await
        .expect_err("invalid draft");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

fn claimed(id: RequestId, ago: TimeDelta) -> PairClaim {
    PairClaim::new(id, now() - ago)
}

#[tokio::test]
async fn live_pair_claim_is_a_conflict() {
    let holder = stored(RequestStatus::Pending);
    let holder_id = holder.id;
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(1).return_once(|_, _| Ok(false));
    repo.expect_pair_holder()
        .times(1)
        .return_once(move |_| Ok(Some(claimed(holder_id, TimeDelta::hours(2)))));
    repo.expect_find()
        .times(1)
        .return_once(move |_| Ok(Some(holder)));
    repo.expect_replace_pair_holder().times(0);
    repo.expect_insert().times(0);

    let err = service(repo, harness(0).dispatcher)
        .create_request(draft())
        .await
        .expect_err("duplicate request");
    assert_eq!(err.code(), ErrorCode::Conflict);
    let details = err.details().expect("conflict details");
    assert_eq!(details["requestId"], holder_id.to_string());
}

#[tokio::test]
async fn fresh_claim_without_a_record_is_still_in_flight() {
    let holder_id = RequestId::generate();
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(1).return_once(|_, _| Ok(false));
    repo.expect_pair_holder()
        .times(1)
        .return_once(move |_| Ok(Some(claimed(holder_id, TimeDelta::seconds(1)))));
    repo.expect_find().times(1).return_once(|_| Ok(None));
    repo.expect_replace_pair_holder().times(0);
    repo.expect_insert().times(0);

    let err = service(repo, harness(0).dispatcher)
        .create_request(draft())
        .await
        .expect_err("claim in flight");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case::declined_holder(Some(RequestStatus::Declined))]
#[case::abandoned_claim(None)]
#[tokio::test]
async fn stale_pair_claims_are_replaced(#[case] holder_status: Option<RequestStatus>) {
    let holder = holder_status.map(stored);
    let stale = claimed(RequestId::generate(), TimeDelta::minutes(5));
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(1).return_once(|_, _| Ok(false));
    repo.expect_pair_holder()
        .times(1)
        .return_once(move |_| Ok(Some(stale)));
    repo.expect_find().times(1).return_once(move |_| Ok(holder));
    repo.expect_replace_pair_holder()
        .withf(move |_, expected, claim| *expected == stale && claim.claimed_at == now())
        .times(1)
        .return_once(|_, _, _| Ok(true));
    repo.expect_insert().times(1).return_once(|_| Ok(()));

    service(repo, harness(1).dispatcher)
        .create_request(draft())
        .await
        .expect("stale claim replaced");
}

#[tokio::test]
async fn losing_a_stale_claim_race_is_a_conflict() {
    let stale = claimed(RequestId::generate(), TimeDelta::minutes(5));
    let winner = claimed(RequestId::generate(), TimeDelta::zero());
    let mut holders = vec![winner, stale];
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(2).returning(|_, _| Ok(false));
    repo.expect_pair_holder()
        .times(2)
        .returning(move |_| Ok(holders.pop()));
    repo.expect_find().times(2).returning(|_| Ok(None));
    repo.expect_replace_pair_holder()
        .times(1)
        .return_once(|_, _, _| Ok(false));
    repo.expect_insert().times(0);

    let err = service(repo, harness(0).dispatcher)
        .create_request(draft())
        .await
        .expect_err("another create won");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.details().expect("details")["requestId"],
        winner.request_id.to_string()
    );
}

#[tokio::test]
async fn a_create_between_claim_and_insert_cannot_take_the_pair() {
    let repo = Arc::new(TreeMatchRequestRepository::new(Arc::new(MemoryTreeStore::new())));
    let service = MatchRequestService::new(
        repo.clone(),
        harness(0).dispatcher,
        Arc::new(MutableClock::new(now())),
    );
    let first = draft();
    let first_id = RequestId::generate();
    repo.claim_pair(&first.pair(), &PairClaim::new(first_id, now()))
        .await
        .expect("claim");

    let err = service
        .create_request(first.clone())
        .await
        .expect_err("pair is mid-create");
    assert_eq!(err.code(), ErrorCode::Conflict);

    repo.insert(&MatchRequest::pending(first_id, first.clone(), now()))
        .await
        .expect("insert");
    let sent = service
        .list_requests(first.sender_id.clone(), RequestDirection::Sent)
        .await
        .expect("listed");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].request.id, first_id);
}

#[tokio::test]
async fn failed_insert_releases_the_claim() {
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_claim_pair().times(1).return_once(|_, _| Ok(true));
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(MatchRequestRepositoryError::connection("store offline")));
    repo.expect_release_pair().times(1).return_once(|_, _| Ok(()));

    let err = service(repo, harness(0).dispatcher)
        .create_request(draft())
        .await
        .expect_err("insert failed");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn accepting_updates_the_record_and_notifies_sender() {
    let pending = stored(RequestStatus::Pending);
    let id = pending.id;
    let sender = pending.sender_id.clone();
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_find().times(1).return_once(move |_| Ok(Some(pending)));
    repo.expect_update_status()
        .withf(|_, status, _| *status == RequestStatus::Accepted)
        .times(1)
        .return_once(|_, _, _| Ok(()));
    repo.expect_release_pair().times(0);
    let Harness {
        notifier,
        dispatcher,
    } = harness(1);

    let updated = service(repo, dispatcher)
        .transition(id, RequestStatus::Accepted)
        .await
        .expect("accepted");

    assert_eq!(updated.status, RequestStatus::Accepted);
    assert_eq!(notifier.count_for(&sender, NotificationKind::RequestAccepted), 1);
}

#[tokio::test]
async fn declining_releases_the_pair_without_notifying() {
    let pending = stored(RequestStatus::Pending);
    let id = pending.id;
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_find().times(1).return_once(move |_| Ok(Some(pending)));
    repo.expect_update_status()
        .times(1)
        .return_once(|_, _, _| Ok(()));
    repo.expect_release_pair()
        .withf(move |_, holder| *holder == id)
        .times(1)
        .return_once(|_, _| Ok(()));

    let updated = service(repo, harness(0).dispatcher)
        .transition(id, RequestStatus::Declined)
        .await
        .expect("declined");
    assert_eq!(updated.status, RequestStatus::Declined);
}

#[rstest]
#[case(RequestStatus::Accepted)]
#[case(RequestStatus::Declined)]
#[tokio::test]
async fn repeating_a_terminal_transition_is_a_no_op(#[case] status: RequestStatus) {
    let done = stored(status);
    let id = done.id;
    let expected = done.clone();
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_find().times(1).return_once(move |_| Ok(Some(done)));
    repo.expect_update_status().times(0);
    repo.expect_release_pair().times(0);

    let unchanged = service(repo, harness(0).dispatcher)
        .transition(id, status)
        .await
        .expect("idempotent");
    assert_eq!(unchanged, expected);
}

#[tokio::test]
async fn leaving_a_terminal_state_is_a_conflict() {
    let accepted = stored(RequestStatus::Accepted);
    let id = accepted.id;
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_find().times(1).return_once(move |_| Ok(Some(accepted)));
    repo.expect_update_status().times(0);

    let err = service(repo, harness(0).dispatcher)
        .transition(id, RequestStatus::Declined)
        .await
        .expect_err("terminal");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn transitioning_an_unknown_request_is_not_found() {
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_find().times(1).return_once(|_| Ok(None));

    let err = service(repo, harness(0).dispatcher)
        .transition(RequestId::generate(), RequestStatus::Accepted)
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn listing_is_newest_first_and_tagged_with_direction() {
    let mut older = stored(RequestStatus::Pending);
    older.created_at = now() - chrono::TimeDelta::hours(1);
    let newer = stored(RequestStatus::Accepted);
    let expected = vec![newer.id, older.id];
    let mut repo = MockMatchRequestRepository::new();
    repo.expect_list_for_user()
        .withf(|_, direction| *direction == RequestDirection::Sent)
        .times(1)
        .return_once(move |_, _| Ok(vec![older, newer]));

    let listed = service(repo, harness(0).dispatcher)
        .list_requests(UserId::random(), RequestDirection::Sent)
        .await
        .expect("listed");

    let ids: Vec<_> = listed.iter().map(|view| view.request.id).collect();
    assert_eq!(ids, expected);
    assert!(listed.iter().all(|view| view.direction == RequestDirection::Sent));
}
