//! Test utilities for the pawmate crate.
//!
//! Shared by unit tests in `src/` and the behaviour suites in `tests/`.
//! Compiled for tests and when the `test-support` feature is enabled.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::domain::geo::{Coordinate, destination_point, haversine_distance_km};
use crate::domain::ports::{DeliveryReceipt, Notifier, NotifierError};
use crate::domain::{NotificationKind, UserId, UserProfile};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Point due north of `origin` whose computed great-circle distance from it
/// is at most `km` and within a few nanometres of it.
///
/// Projecting then re-measuring can overshoot by an ulp, which matters for
/// inclusive radius checks; the distance is nudged down until it fits.
pub fn point_at_distance(origin: Coordinate, km: f64) -> Coordinate {
    let mut target = km;
    let mut point = destination_point(origin, target, 0.0);
    for _ in 0..16 {
        if haversine_distance_km(origin, point) <= km {
            break;
        }
        target -= km * 1e-13;
        point = destination_point(origin, target, 0.0);
    }
    point
}

/// Clock whose current instant is set by the test.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock pinned to 09:00 UTC on `day`.
    pub fn on_day(day: NaiveDate) -> Self {
        let morning = day
            .and_hms_opt(9, 0, 0)
            .unwrap_or_else(|| panic!("09:00 is valid on {day}"));
        Self::new(morning.and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.0) = now;
    }

    pub fn advance_days(&self, days: i64) {
        *lock(&self.0) += TimeDelta::days(days);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// One delivery observed by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDelivery {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub payload: Value,
}

/// Notifier that records deliveries and can be told to fail for chosen
/// users.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<RecordedDelivery>>,
    failing: Mutex<Vec<UserId>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every delivery to `user` fail.
    pub fn fail_for(&self, user: &UserId) {
        lock(&self.failing).push(user.clone());
    }

    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        lock(&self.deliveries).clone()
    }

    /// Deliveries of `kind` addressed to `user`.
    pub fn count_for(&self, user: &UserId, kind: NotificationKind) -> usize {
        lock(&self.deliveries)
            .iter()
            .filter(|delivery| &delivery.user_id == user && delivery.kind == kind)
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        user: &UserProfile,
        kind: NotificationKind,
        payload: &Value,
    ) -> Result<DeliveryReceipt, NotifierError> {
        if lock(&self.failing).contains(&user.id) {
            return Err(NotifierError::unavailable(format!(
                "recording notifier told to fail for {}",
                user.id
            )));
        }
        lock(&self.deliveries).push(RecordedDelivery {
            user_id: user.id.clone(),
            kind,
            payload: payload.clone(),
        });
        Ok(DeliveryReceipt::default())
    }
}
