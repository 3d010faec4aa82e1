//! Shared engine harness for the behaviour suites.
//!
//! Each suite builds a [`Harness`] in its first `given` step and keeps it in
//! a scenario slot. The harness owns a Tokio runtime so synchronous step
//! functions can drive the async services.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use pawmate::domain::geo::{Coordinate, NoJitter};
use pawmate::domain::ports::{PetRepository, UserRepository};
use pawmate::domain::{DisplayName, Pet, UserId, UserProfile};
use pawmate::engine::{Engine, EngineDeps};
use pawmate::outbound::persistence::{TreePetRepository, TreeUserRepository};
use pawmate::outbound::store::MemoryTreeStore;
use pawmate::test_support::{MutableClock, RecordingNotifier};
use tokio::runtime::Runtime;

/// One engine over an in-memory store, plus handles for assertions.
#[derive(Clone)]
pub struct Harness {
    runtime: Arc<Runtime>,
    pub engine: Engine,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<MutableClock>,
    users: Arc<TreeUserRepository>,
    pets: Arc<TreePetRepository>,
    named: Arc<Mutex<BTreeMap<String, UserId>>>,
}

impl Harness {
    /// Harness whose clock reads 09:00 UTC on `day`. Locations are not
    /// jittered.
    pub fn on_day(day: NaiveDate) -> Self {
        let runtime = Runtime::new().expect("create runtime");
        let store = Arc::new(MemoryTreeStore::new());
        let notifier = RecordingNotifier::new();
        let clock = Arc::new(MutableClock::on_day(day));
        let engine = Engine::assemble(EngineDeps {
            store: store.clone(),
            notifier: notifier.clone(),
            clock: clock.clone(),
            jitter: Arc::new(NoJitter),
        });
        Self {
            runtime: Arc::new(runtime),
            engine,
            notifier,
            clock,
            users: Arc::new(TreeUserRepository::new(store.clone())),
            pets: Arc::new(TreePetRepository::new(store)),
            named: Arc::default(),
        }
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Store a profile for `name`, reachable by email, and remember its id.
    pub fn add_user(&self, name: &str, location: Option<Coordinate>) -> UserId {
        let id = UserId::random();
        let mut profile = UserProfile::new(id.clone(), DisplayName::new(name).expect("name"))
            .with_email(format!("{}@example.test", name.to_lowercase()));
        profile.location = location;
        self.block_on(self.users.save(&profile)).expect("save user");
        self.named
            .lock()
            .expect("names lock")
            .insert(name.to_owned(), id.clone());
        id
    }

    /// Id recorded for `name` by [`Self::add_user`].
    pub fn user(&self, name: &str) -> UserId {
        self.named
            .lock()
            .expect("names lock")
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no user named {name}"))
    }

    pub fn add_pet(&self, pet: &Pet) {
        self.block_on(self.pets.save(pet)).expect("save pet");
    }
}
