//! Behavioural tests for the daily reminder job.

mod support;

use chrono::{NaiveDate, TimeDelta};
use pawmate::domain::ports::ReminderJobTrigger;
use pawmate::domain::{Gender, JobResponse, NotificationKind, Pet, PetKind, Vaccination};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use support::Harness;

#[derive(Default, ScenarioState)]
struct ReminderWorld {
    harness: Slot<Harness>,
    today: Slot<NaiveDate>,
    pet: Slot<Pet>,
    last_run: Slot<JobResponse>,
    // Pets are saved lazily so `given` steps can keep amending them.
    saved: Slot<bool>,
}

impl ReminderWorld {
    fn harness(&self) -> Harness {
        self.harness.get().expect("harness should be set")
    }

    fn today(&self) -> NaiveDate {
        self.today.get().expect("today should be set")
    }

    fn amend_pet(&self, change: impl FnOnce(&mut Pet)) {
        let mut pet = self.pet.get().expect("pet should be set");
        change(&mut pet);
        self.pet.set(pet);
        self.saved.set(false);
    }

    fn save_pet(&self) {
        if !self.saved.get().unwrap_or(false) {
            self.saved.set(true);
            let pet = self.pet.get().expect("pet should be set");
            self.harness().add_pet(&pet);
        }
    }

    fn received(&self, name: &str, kind: NotificationKind) -> usize {
        let harness = self.harness();
        harness.notifier.count_for(&harness.user(name), kind)
    }
}

#[fixture]
fn world() -> ReminderWorld {
    ReminderWorld::default()
}

#[given("today is {day}")]
fn today_is(world: &ReminderWorld, day: NaiveDate) {
    world.harness.set(Harness::on_day(day));
    world.today.set(day);
}

#[given("{owner} owns a cat named {pet}")]
fn owner_owns_a_cat(world: &ReminderWorld, owner: String, pet: String) {
    let owner_id = world.harness().add_user(&owner, None);
    world
        .pet
        .set(Pet::new(owner_id, pet, PetKind::Cat, Gender::Female));
    world.saved.set(false);
}

#[given("{pet} had a checkup {days} days ago")]
fn had_a_checkup(world: &ReminderWorld, pet: String, days: i64) {
    let checked = world.today() - TimeDelta::days(days);
    world.amend_pet(|stored| {
        assert_eq!(stored.name, pet);
        stored.last_checkup = Some(checked);
    });
}

#[given("{pet} has no recorded checkup")]
fn has_no_checkup(world: &ReminderWorld, pet: String) {
    world.amend_pet(|stored| {
        assert_eq!(stored.name, pet);
        stored.last_checkup = None;
    });
}

#[given("the {vaccine} vaccination for {pet} is due in {days} days")]
fn vaccination_is_due(world: &ReminderWorld, vaccine: String, pet: String, days: i64) {
    let next_due = world.today() + TimeDelta::days(days);
    world.amend_pet(|stored| {
        assert_eq!(stored.name, pet);
        stored.vaccinations.push(Vaccination {
            name: vaccine,
            next_due: Some(next_due),
        });
    });
}

#[given("{pet} was born on {born}")]
fn was_born_on(world: &ReminderWorld, pet: String, born: NaiveDate) {
    world.amend_pet(|stored| {
        assert_eq!(stored.name, pet);
        stored.date_of_birth = Some(born);
    });
}

#[when("the reminder job runs")]
fn the_reminder_job_runs(world: &ReminderWorld) {
    world.save_pet();
    let harness = world.harness();
    let response = harness.block_on(harness.engine.reminder_job.invoke());
    assert!(response.is_success(), "run should succeed: {response:?}");
    world.last_run.set(response);
}

#[when("a day passes")]
fn a_day_passes(world: &ReminderWorld) {
    world.harness().clock.advance_days(1);
}

#[then("the job reports {count} reminders sent")]
fn the_job_reports(world: &ReminderWorld, count: usize) {
    let response = world.last_run.get().expect("job should have run");
    assert_eq!(response.emails_sent, count);
}

#[then("{owner} has received {count} vaccination reminders")]
fn vaccination_reminders_received(world: &ReminderWorld, owner: String, count: usize) {
    assert_eq!(
        world.received(&owner, NotificationKind::VaccinationReminder),
        count
    );
}

#[then("{owner} has received {count} birthday reminders")]
fn birthday_reminders_received(world: &ReminderWorld, owner: String, count: usize) {
    assert_eq!(
        world.received(&owner, NotificationKind::BirthdayReminder),
        count
    );
}

#[then("{owner} has received {count} checkup reminders")]
fn checkup_reminders_received(world: &ReminderWorld, owner: String, count: usize) {
    assert_eq!(
        world.received(&owner, NotificationKind::HealthCheckupReminder),
        count
    );
}

#[scenario(
    path = "tests/features/reminders.feature",
    name = "A vaccination due in exactly seven days is reminded"
)]
fn vaccination_due_in_seven_days(world: ReminderWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reminders.feature",
    name = "A vaccination due in eight days is not reminded yet"
)]
fn vaccination_due_in_eight_days(world: ReminderWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reminders.feature",
    name = "A vaccination due in six days was already past its reminder day"
)]
fn vaccination_due_in_six_days(world: ReminderWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reminders.feature",
    name = "A birthday three days away is reminded"
)]
fn birthday_three_days_away(world: ReminderWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reminders.feature",
    name = "A second run on the same day sends nothing new"
)]
fn second_run_on_the_same_day(world: ReminderWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reminders.feature",
    name = "An overdue checkup is reminded again the next day"
)]
fn overdue_checkup_next_day(world: ReminderWorld) {
    drop(world);
}
