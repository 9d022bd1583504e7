//! Core domain types for famgraph.
//!
//! Persons, parent/child relationships, unions and events, plus the write
//! payloads the store accepts. Tag enums serialize to the lowercase strings
//! stored in the database.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::FamGraphError;

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    /// Parse from a loose string (case-insensitive, surrounding whitespace ignored).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            "other" | "o" => Some(Self::Other),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RelationshipType
// ---------------------------------------------------------------------------

/// Nature of a parent→child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    #[default]
    Biological,
    Adoptive,
    Legal,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biological => "biological",
            Self::Adoptive => "adoptive",
            Self::Legal => "legal",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "biological" => Some(Self::Biological),
            "adoptive" | "adopted" => Some(Self::Adoptive),
            "legal" => Some(Self::Legal),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// UnionType / UnionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnionType {
    #[default]
    Marriage,
    Pacs,
    Partnership,
}

impl UnionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Marriage => "marriage",
            Self::Pacs => "pacs",
            Self::Partnership => "partnership",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "marriage" => Some(Self::Marriage),
            "pacs" => Some(Self::Pacs),
            "partnership" => Some(Self::Partnership),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnionStatus {
    #[default]
    Active,
    Divorced,
    Separated,
    Ended,
}

impl UnionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Divorced => "divorced",
            Self::Separated => "separated",
            Self::Ended => "ended",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "divorced" => Some(Self::Divorced),
            "separated" => Some(Self::Separated),
            "ended" => Some(Self::Ended),
            _ => None,
        }
    }
}

// Display + FromStr for the tag enums, so clap and format! can use them.
macro_rules! tag_traits {
    ($($ty:ident => $label:literal),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = FamGraphError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::from_str_loose(s).ok_or_else(|| {
                        FamGraphError::invalid(format!("unknown {}: {s:?}", $label))
                    })
                }
            }
        )*
    };
}

tag_traits! {
    Gender => "gender",
    RelationshipType => "relationship type",
    UnionType => "union type",
    UnionStatus => "union status",
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A person record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub given_name: String,
    pub family_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_place: Option<String>,
    pub is_alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Person {
    /// Materialize a creation payload with its already-validated gender.
    /// `is_alive` defaults to true unless a death date is given.
    pub fn from_new(id: String, gender: Gender, new: NewPerson, now: NaiveDateTime) -> Self {
        let is_alive = new.is_alive.unwrap_or(new.death_date.is_none());
        Self {
            id,
            given_name: new.given_name,
            family_name: new.family_name,
            maiden_name: new.maiden_name,
            gender,
            birth_date: new.birth_date,
            birth_place: new.birth_place,
            death_date: new.death_date,
            death_place: new.death_place,
            is_alive,
            profile_photo: new.profile_photo,
            biography: new.biography,
            profession: new.profession,
            email: new.email,
            phone: new.phone,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update into this record.
    pub fn apply(&mut self, update: PersonUpdate, now: NaiveDateTime) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = update.$field {
                    self.$field = value;
                })*
            };
        }
        macro_rules! merge_opt {
            ($($field:ident),*) => {
                $(if let Some(value) = update.$field {
                    self.$field = Some(value);
                })*
            };
        }
        merge!(given_name, family_name, gender, is_alive);
        merge_opt!(
            maiden_name,
            birth_date,
            birth_place,
            death_date,
            death_place,
            profile_photo,
            biography,
            profession,
            email,
            phone
        );
        self.updated_at = now;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// Living means flagged alive and no recorded death date.
    pub fn is_living(&self) -> bool {
        self.is_alive && self.death_date.is_none()
    }
}

/// Payload for creating a person. `id` is generated when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
    #[serde(default)]
    pub id: Option<String>,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub maiden_name: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_place: Option<String>,
    #[serde(default)]
    pub is_alive: Option<bool>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewPerson {
    /// Minimal payload: names and gender.
    pub fn named(given_name: &str, family_name: &str, gender: Gender) -> Self {
        Self {
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            gender: Some(gender),
            ..Self::default()
        }
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn died(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self.is_alive = Some(false);
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// Partial update of a person. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonUpdate {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub maiden_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub death_date: Option<NaiveDate>,
    pub death_place: Option<String>,
    pub is_alive: Option<bool>,
    pub profile_photo: Option<String>,
    pub biography: Option<String>,
    pub profession: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Check the date invariant shared by create and update.
pub(crate) fn check_life_dates(
    birth: Option<NaiveDate>,
    death: Option<NaiveDate>,
) -> crate::error::Result<()> {
    if let (Some(birth), Some(death)) = (birth, death) {
        if death < birth {
            return Err(FamGraphError::invalid(format!(
                "death date {death} precedes birth date {birth}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// A directed parent→child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub parent_id: String,
    pub child_id: String,
    pub relationship_type: RelationshipType,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelationship {
    pub parent_id: String,
    pub child_id: String,
    #[serde(default)]
    pub relationship_type: Option<RelationshipType>,
}

impl NewRelationship {
    pub fn new(parent_id: &str, child_id: &str) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            child_id: child_id.to_string(),
            relationship_type: None,
        }
    }

    pub fn of_type(mut self, kind: RelationshipType) -> Self {
        self.relationship_type = Some(kind);
        self
    }
}

/// One hop of the lineage graph as seen from a person: the id on the other
/// end of an active edge, and the edge's type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEdge {
    pub person_id: String,
    pub relationship_type: RelationshipType,
}

// ---------------------------------------------------------------------------
// Union
// ---------------------------------------------------------------------------

/// Partnership between two persons. Not part of lineage traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Union {
    pub id: String,
    pub person1_id: String,
    pub person2_id: String,
    pub union_type: UnionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: UnionStatus,
    pub created_at: NaiveDateTime,
}

impl Union {
    /// The other participant, if `person_id` is one of the two.
    pub fn partner_of(&self, person_id: &str) -> Option<&str> {
        if self.person1_id == person_id {
            Some(&self.person2_id)
        } else if self.person2_id == person_id {
            Some(&self.person1_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUnion {
    pub person1_id: String,
    pub person2_id: String,
    #[serde(default)]
    pub union_type: Option<UnionType>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<UnionStatus>,
}

impl NewUnion {
    pub fn between(person1_id: &str, person2_id: &str) -> Self {
        Self {
            person1_id: person1_id.to_string(),
            person2_id: person2_id.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnionUpdate {
    pub union_type: Option<UnionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<UnionStatus>,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A dated life event attached to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub person_id: String,
    pub title: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub person_id: String,
    pub title: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Search and pagination for person listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl PersonQuery {
    /// Page starts at 1; limit defaults to 25 and is clamped to 1..=200.
    pub fn pagination(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(25).clamp(1, 200);
        (page, limit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub page: u32,
    pub limit: u32,
    pub total: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh record id of the form `<kind>_<16 hex chars>`.
pub fn new_record_id(kind: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(nanos.to_le_bytes());
    hasher.update(seq.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{kind}_{}", &digest[..16])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
