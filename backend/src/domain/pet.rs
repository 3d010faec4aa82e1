//! Pet profile entity and its attribute enums.
//!
//! Pets are owned by a single user and never deleted by the engine. The
//! stored `location` is the owner's true fix; anything shown to other users
//! passes through a [`super::geo::LocationJitter`] first.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::Coordinate;
use super::user::UserId;

/// Stable pet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(Uuid);

impl PetId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Parse failure for the string-backed pet enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value: {value}")]
pub struct ParsePetAttributeError {
    field: &'static str,
    value: String,
}

/// Species of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetKind {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

impl PetKind {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Rabbit => "rabbit",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PetKind {
    type Err = ParsePetAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dog" => Ok(Self::Dog),
            "cat" => Ok(Self::Cat),
            "bird" => Ok(Self::Bird),
            "rabbit" => Ok(Self::Rabbit),
            "other" => Ok(Self::Other),
            _ => Err(ParsePetAttributeError {
                field: "kind",
                value: s.to_owned(),
            }),
        }
    }
}

/// Biological sex recorded on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParsePetAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(ParsePetAttributeError {
                field: "gender",
                value: s.to_owned(),
            }),
        }
    }
}

/// One scheduled vaccination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vaccination {
    pub name: String,
    pub next_due: Option<NaiveDate>,
}

impl Vaccination {
    /// Lowercase, underscore-joined form of the name used in dedup keys.
    ///
    /// # Examples
    /// ```
    /// use pawmate::domain::Vaccination;
    ///
    /// let shot = Vaccination { name: "Kennel Cough / Bordetella".into(), next_due: None };
    /// assert_eq!(shot.slug(), "kennel_cough_bordetella");
    /// ```
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for ch in self.name.trim().chars() {
            if ch.is_alphanumeric() {
                slug.extend(ch.to_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        }
        while slug.ends_with('_') {
            slug.pop();
        }
        slug
    }
}

/// Pet profile as stored under `pets/{ownerId}/{petId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub owner_id: UserId,
    pub name: String,
    pub kind: PetKind,
    pub gender: Gender,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub available_for_mating: bool,
    #[serde(default)]
    pub available_for_adoption: bool,
    #[serde(default)]
    pub last_checkup: Option<NaiveDate>,
    #[serde(default)]
    pub vaccinations: Vec<Vaccination>,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

impl Pet {
    /// Build a pet with the mandatory attributes; everything else defaults to
    /// absent or `false`.
    ///
    /// # Examples
    /// ```
    /// use pawmate::domain::{Gender, Pet, PetKind, UserId};
    ///
    /// let pet = Pet::new(UserId::random(), "Biscuit", PetKind::Dog, Gender::Female);
    /// assert!(!pet.available_for_mating);
    /// assert!(pet.vaccinations.is_empty());
    /// ```
    pub fn new(owner_id: UserId, name: impl Into<String>, kind: PetKind, gender: Gender) -> Self {
        Self {
            id: PetId::random(),
            owner_id,
            name: name.into(),
            kind,
            gender,
            breed: None,
            description: None,
            date_of_birth: None,
            available_for_mating: false,
            available_for_adoption: false,
            last_checkup: None,
            vaccinations: Vec::new(),
            location: None,
        }
    }

    /// Replace the generated identifier.
    pub fn with_id(mut self, id: PetId) -> Self {
        self.id = id;
        self
    }

    /// Attach a breed.
    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    /// Attach a stored location.
    pub fn with_location(mut self, location: Coordinate) -> Self {
        self.location = Some(location);
        self
    }

    /// Mark the pet as available for mating.
    pub fn available_for_mating(mut self) -> Self {
        self.available_for_mating = true;
        self
    }

    /// Mark the pet as available for adoption.
    pub fn available_for_adoption(mut self) -> Self {
        self.available_for_adoption = true;
        self
    }
}
