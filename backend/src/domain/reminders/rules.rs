//! Pure due-date rules for the reminder batch.

use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use serde_json::{Value, json};

use crate::domain::{Pet, PetId};

use super::{ReminderKind, reminder_key};

/// Vaccinations are reminded this many days before they fall due.
pub const VACCINATION_LEAD_DAYS: i64 = 7;

/// Birthdays are reminded this many days ahead.
pub const BIRTHDAY_LEAD_DAYS: i64 = 3;

/// A checkup older than this many calendar months is overdue.
pub const CHECKUP_INTERVAL_MONTHS: u32 = 6;

/// True when `next_due` is exactly [`VACCINATION_LEAD_DAYS`] after `today`.
pub fn is_vaccination_due(next_due: NaiveDate, today: NaiveDate) -> bool {
    today
        .checked_add_signed(TimeDelta::days(VACCINATION_LEAD_DAYS))
        .is_some_and(|target| target == next_due)
}

/// The anniversary of `date_of_birth` in `year`.
///
/// A 29 February birthday falls on 28 February in common years.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use pawmate::domain::reminders::birthday_in_year;
///
/// let born = NaiveDate::from_ymd_opt(2020, 2, 29).expect("date");
/// assert_eq!(birthday_in_year(born, 2026), NaiveDate::from_ymd_opt(2026, 2, 28));
/// assert_eq!(birthday_in_year(born, 2028), NaiveDate::from_ymd_opt(2028, 2, 29));
/// ```
pub fn birthday_in_year(date_of_birth: NaiveDate, year: i32) -> Option<NaiveDate> {
    date_of_birth
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
}

/// True when this year's birthday is exactly [`BIRTHDAY_LEAD_DAYS`] after
/// `today`.
///
/// Only the birthday in `today`'s calendar year is considered, so a birthday
/// in the first days of January is never reminded from late December.
pub fn is_birthday_due(date_of_birth: NaiveDate, today: NaiveDate) -> bool {
    birthday_in_year(date_of_birth, today.year())
        .and_then(|birthday| birthday.checked_sub_signed(TimeDelta::days(BIRTHDAY_LEAD_DAYS)))
        .is_some_and(|remind_on| remind_on == today)
}

/// True when no checkup is recorded or the last one is more than
/// [`CHECKUP_INTERVAL_MONTHS`] calendar months before `today`.
pub fn is_checkup_due(last_checkup: Option<NaiveDate>, today: NaiveDate) -> bool {
    let Some(last) = last_checkup else {
        return true;
    };
    today
        .checked_sub_months(Months::new(CHECKUP_INTERVAL_MONTHS))
        .is_some_and(|threshold| last < threshold)
}

/// One reminder that qualifies today.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub kind: ReminderKind,
    pub pet_id: PetId,
    pub pet_name: String,
    /// Vaccine name for vaccination reminders.
    pub vaccine: Option<String>,
    /// The date being reminded about: due date, birthday or last checkup.
    pub reference_date: Option<NaiveDate>,
    /// Date-qualified dedup key.
    pub key: String,
}

impl DueReminder {
    /// Notification payload for this reminder.
    pub fn payload(&self) -> Value {
        json!({
            "reminder": self.kind,
            "petId": self.pet_id.to_string(),
            "petName": self.pet_name,
            "vaccine": self.vaccine,
            "date": self.reference_date.map(|date| date.format("%Y-%m-%d").to_string()),
        })
    }
}

/// Every reminder `pet` qualifies for on `today`, in a fixed order:
/// vaccinations in list order, then birthday, then checkup.
pub fn due_reminders(pet: &Pet, today: NaiveDate) -> Vec<DueReminder> {
    let mut due = Vec::new();

    for vaccination in &pet.vaccinations {
        let Some(next_due) = vaccination.next_due else {
            continue;
        };
        if is_vaccination_due(next_due, today) {
            let slug = vaccination.slug();
            due.push(DueReminder {
                kind: ReminderKind::Vaccination,
                pet_id: pet.id,
                pet_name: pet.name.clone(),
                vaccine: Some(vaccination.name.clone()),
                reference_date: Some(next_due),
                key: reminder_key(ReminderKind::Vaccination, &pet.id, Some(&slug), today),
            });
        }
    }

    if let Some(born) = pet.date_of_birth.filter(|born| is_birthday_due(*born, today)) {
        due.push(DueReminder {
            kind: ReminderKind::Birthday,
            pet_id: pet.id,
            pet_name: pet.name.clone(),
            vaccine: None,
            reference_date: birthday_in_year(born, today.year()),
            key: reminder_key(ReminderKind::Birthday, &pet.id, None, today),
        });
    }

    if is_checkup_due(pet.last_checkup, today) {
        due.push(DueReminder {
            kind: ReminderKind::HealthCheckup,
            pet_id: pet.id,
            pet_name: pet.name.clone(),
            vaccine: None,
            reference_date: pet.last_checkup,
            key: reminder_key(ReminderKind::HealthCheckup, &pet.id, None, today),
        });
    }

    due
}
