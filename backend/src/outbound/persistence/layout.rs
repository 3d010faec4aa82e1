//! Store paths used by the tree-backed repositories.
//!
//! ```text
//! users/{uid}                          profile record
//! user_cells/{geohash5}/{uid}          fan-out bucket index
//! pets/{uid}/{petId}                   pet record
//! requests/{id}                        request record
//! sent/{uid}/{id}, received/{uid}/{id} index pointers
//! request_pairs/{senderPet}_{receiverPet}
//! places/{id}
//! notifications/{uid}/{id}
//! reminders/{uid}/{key}
//! ```

use crate::domain::ports::StorePath;
use crate::domain::{PetId, PlaceId, RequestDirection, RequestId, RequestPair, UserId};

pub(crate) fn users() -> StorePath {
    StorePath::from_segments(["users"])
}

pub(crate) fn user(id: &UserId) -> StorePath {
    users().child(id.to_string())
}

pub(crate) fn user_cells() -> StorePath {
    StorePath::from_segments(["user_cells"])
}

pub(crate) fn user_cell(cell: &str) -> StorePath {
    user_cells().child(cell)
}

pub(crate) fn pets() -> StorePath {
    StorePath::from_segments(["pets"])
}

pub(crate) fn owner_pets(owner: &UserId) -> StorePath {
    pets().child(owner.to_string())
}

pub(crate) fn pet(owner: &UserId, pet: &PetId) -> StorePath {
    owner_pets(owner).child(pet.to_string())
}

pub(crate) fn request(id: &RequestId) -> StorePath {
    StorePath::from_segments(["requests".to_owned(), id.to_string()])
}

pub(crate) fn request_index(direction: RequestDirection, user: &UserId) -> StorePath {
    StorePath::from_segments([direction.as_str().to_owned(), user.to_string()])
}

pub(crate) fn request_pair(pair: &RequestPair) -> StorePath {
    StorePath::from_segments(["request_pairs".to_owned(), pair.key()])
}

pub(crate) fn place(id: &PlaceId) -> StorePath {
    StorePath::from_segments(["places".to_owned(), id.to_string()])
}

pub(crate) fn notifications(recipient: &UserId) -> StorePath {
    StorePath::from_segments(["notifications".to_owned(), recipient.to_string()])
}

pub(crate) fn reminder_marker(user: &UserId, key: &str) -> StorePath {
    StorePath::from_segments(["reminders".to_owned(), user.to_string(), key.to_owned()])
}
