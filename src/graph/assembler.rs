//! Presentation shaping for lineage results.
//!
//! Pure functions over engine output: generation buckets, age-annotated
//! flat lists, and whole-family layouts keyed by generation depth.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::graph::age::age_of;
use crate::graph::traversal::{Direction, LineageEntry};
use crate::types::Person;

/// Persons sharing one generation number, in entry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationBucket {
    pub generation: u32,
    pub persons: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgedLineageEntry {
    pub person: Person,
    pub generation: u32,
    pub age: Option<i32>,
}

/// A person with computed age, for list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgedPerson {
    #[serde(flatten)]
    pub person: Person,
    pub age: Option<i32>,
}

/// A complete answer to an ancestors/descendants request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageReport {
    pub root_id: String,
    pub direction: Direction,
    pub max_generations: u32,
    pub entries: Vec<AgedLineageEntry>,
    pub generations: Vec<GenerationBucket>,
}

impl LineageReport {
    pub fn new(
        root_id: &str,
        direction: Direction,
        max_generations: u32,
        entries: Vec<LineageEntry>,
        reference: NaiveDate,
    ) -> Self {
        let generations = group_by_generation(&entries);
        Self {
            root_id: root_id.to_string(),
            direction,
            max_generations,
            entries: with_ages(entries, reference),
            generations,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bucket entries by generation. Buckets appear in the order their
/// generation is first seen, which for engine output is already sorted.
pub fn group_by_generation(entries: &[LineageEntry]) -> Vec<GenerationBucket> {
    let mut buckets: Vec<GenerationBucket> = Vec::new();
    let mut slot: HashMap<u32, usize> = HashMap::new();
    for entry in entries {
        let idx = *slot.entry(entry.generation).or_insert_with(|| {
            buckets.push(GenerationBucket {
                generation: entry.generation,
                persons: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[idx].persons.push(entry.person.clone());
    }
    buckets
}

pub fn with_ages(entries: Vec<LineageEntry>, reference: NaiveDate) -> Vec<AgedLineageEntry> {
    entries
        .into_iter()
        .map(|e| AgedLineageEntry {
            age: age_of(&e.person, reference),
            person: e.person,
            generation: e.generation,
        })
        .collect()
}

pub fn annotate_ages(persons: Vec<Person>, reference: NaiveDate) -> Vec<AgedPerson> {
    persons
        .into_iter()
        .map(|person| AgedPerson {
            age: age_of(&person, reference),
            person,
        })
        .collect()
}

/// Bucket a whole family by generation depth, persons kept in input order.
/// Persons without a depth (absent from `depths`) are left out.
pub fn generation_layout(
    depths: &HashMap<String, u32>,
    persons: impl IntoIterator<Item = Person>,
) -> BTreeMap<u32, Vec<Person>> {
    let mut layout: BTreeMap<u32, Vec<Person>> = BTreeMap::new();
    for person in persons {
        if let Some(&depth) = depths.get(&person.id) {
            layout.entry(depth).or_default().push(person);
        }
    }
    layout
}
