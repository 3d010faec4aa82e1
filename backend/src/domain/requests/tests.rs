//! Tests for request validation and the status state machine.

use chrono::{TimeZone, Utc};
use rstest::rstest;

use super::*;

fn draft() -> NewMatchRequest {
    NewMatchRequest {
        sender_id: UserId::random(),
        sender_pet_id: PetId::random(),
        receiver_id: UserId::random(),
        receiver_pet_id: PetId::random(),
        message: "Hello!".to_owned(),
    }
}

#[rstest]
#[case(RequestStatus::Pending, RequestStatus::Accepted, Ok(TransitionOutcome::Applied))]
#[case(RequestStatus::Pending, RequestStatus::Declined, Ok(TransitionOutcome::Applied))]
#[case(RequestStatus::Accepted, RequestStatus::Accepted, Ok(TransitionOutcome::Unchanged))]
#[case(RequestStatus::Declined, RequestStatus::Declined, Ok(TransitionOutcome::Unchanged))]
#[case(
    RequestStatus::Accepted,
    RequestStatus::Declined,
    Err(InvalidTransition { from: RequestStatus::Accepted, to: RequestStatus::Declined })
)]
#[case(
    RequestStatus::Declined,
    RequestStatus::Pending,
    Err(InvalidTransition { from: RequestStatus::Declined, to: RequestStatus::Pending })
)]
#[case(
    RequestStatus::Pending,
    RequestStatus::Pending,
    Err(InvalidTransition { from: RequestStatus::Pending, to: RequestStatus::Pending })
)]
fn status_transitions(
    #[case] from: RequestStatus,
    #[case] to: RequestStatus,
    #[case] expected: Result<TransitionOutcome, InvalidTransition>,
) {
    assert_eq!(from.transition(to), expected);
}

#[rstest]
#[case(RequestStatus::Pending, true)]
#[case(RequestStatus::Accepted, true)]
#[case(RequestStatus::Declined, false)]
fn declined_requests_release_their_pair(#[case] status: RequestStatus, #[case] holds: bool) {
    assert_eq!(status.holds_pair(), holds);
}

#[test]
fn validation_rejects_self_requests() {
    let mut request = draft();
    request.receiver_id = request.sender_id.clone();
    assert_eq!(request.validate(), Err(RequestValidationError::SelfRequest));
}

#[test]
fn validation_rejects_same_pet() {
    let mut request = draft();
    request.receiver_pet_id = request.sender_pet_id;
    assert_eq!(request.validate(), Err(RequestValidationError::SamePet));
}

#[rstest]
#[case(MESSAGE_MAX_CHARS, true)]
#[case(MESSAGE_MAX_CHARS + 1, false)]
fn message_length_is_counted_in_characters(#[case] chars: usize, #[case] ok: bool) {
    let mut request = draft();
    request.message = "é".repeat(chars);
    assert_eq!(request.validate().is_ok(), ok);
}

#[test]
fn pair_key_is_ordered() {
    let request = draft();
    let pair = request.pair();
    assert_eq!(
        pair.key(),
        format!("{}_{}", request.sender_pet_id, request.receiver_pet_id)
    );
    let reversed = RequestPair {
        sender_pet: pair.receiver_pet,
        receiver_pet: pair.sender_pet,
    };
    assert_ne!(pair.key(), reversed.key());
}

#[test]
fn views_flatten_the_record_and_carry_direction() {
    let now = Utc
        .with_ymd_and_hms(2026, 3, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    let request = MatchRequest::pending(RequestId::generate(), draft(), now);
    let view = serde_json::to_value(request.clone().viewed_as(RequestDirection::Received))
        .expect("serialise");

    assert_eq!(view["direction"], "received");
    assert_eq!(view["status"], "pending");
    assert_eq!(view["id"], request.id.to_string());
    assert_eq!(view["senderPetId"], request.sender_pet_id.to_string());
}

#[rstest]
#[case("accepted", Ok(RequestStatus::Accepted))]
#[case("Accepted", Err("unknown request status: Accepted".to_owned()))]
fn status_parsing_is_exact(#[case] raw: &str, #[case] expected: Result<RequestStatus, String>) {
    assert_eq!(raw.parse::<RequestStatus>(), expected);
}
