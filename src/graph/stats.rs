//! Family-wide aggregates for dashboards and reports.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::Result;
use crate::graph::age::age_of;
use crate::graph::source::MemorySource;
use crate::graph::traversal::LineageTraversal;
use crate::types::{Gender, Person};

/// How many entries the place and profession rankings keep.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
    pub other: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecadeCount {
    pub decade: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyStatistics {
    pub reference_date: NaiveDate,
    pub total: usize,
    pub living: usize,
    pub deceased: usize,
    /// Mean age of living persons with a birth date, rounded.
    pub average_living_age: Option<i32>,
    pub genders: GenderCounts,
    pub top_birth_places: Vec<NamedCount>,
    pub top_professions: Vec<NamedCount>,
    pub births_by_decade: Vec<DecadeCount>,
    pub birthdays_this_month: usize,
    pub with_photos: usize,
    /// Distinct generation depths present in the family.
    pub generations: usize,
}

impl FamilyStatistics {
    /// Aggregate over every non-deleted person in `source`.
    pub fn compute(source: &MemorySource, reference: NaiveDate) -> Result<Self> {
        let persons: Vec<&Person> = source.persons().collect();

        let mut genders = GenderCounts::default();
        let mut living = 0;
        let mut living_ages: Vec<i32> = Vec::new();
        let mut places: HashMap<&str, usize> = HashMap::new();
        let mut professions: HashMap<&str, usize> = HashMap::new();
        let mut decades: BTreeMap<i32, usize> = BTreeMap::new();
        let mut birthdays = 0;
        let mut with_photos = 0;

        for person in &persons {
            match person.gender {
                Gender::Male => genders.male += 1,
                Gender::Female => genders.female += 1,
                Gender::Other => genders.other += 1,
            }
            if person.is_living() {
                living += 1;
                if let Some(age) = age_of(person, reference) {
                    living_ages.push(age);
                }
            }
            if let Some(place) = non_blank(person.birth_place.as_deref()) {
                *places.entry(place).or_default() += 1;
            }
            if let Some(job) = non_blank(person.profession.as_deref()) {
                *professions.entry(job).or_default() += 1;
            }
            if let Some(birth) = person.birth_date {
                *decades.entry(birth.year().div_euclid(10) * 10).or_default() += 1;
                if birth.month() == reference.month() {
                    birthdays += 1;
                }
            }
            if non_blank(person.profile_photo.as_deref()).is_some() {
                with_photos += 1;
            }
        }

        let average_living_age = if living_ages.is_empty() {
            None
        } else {
            let sum: i64 = living_ages.iter().map(|&a| i64::from(a)).sum();
            Some((sum as f64 / living_ages.len() as f64).round() as i32)
        };

        let depths = LineageTraversal::new(source)
            .generation_depths(persons.iter().map(|p| p.id.as_str()))?;
        let generations = depths.values().collect::<HashSet<_>>().len();

        Ok(Self {
            reference_date: reference,
            total: persons.len(),
            living,
            deceased: persons.len() - living,
            average_living_age,
            genders,
            top_birth_places: top_n(places),
            top_professions: top_n(professions),
            births_by_decade: decades
                .into_iter()
                .map(|(decade, count)| DecadeCount { decade, count })
                .collect(),
            birthdays_this_month: birthdays,
            with_photos,
            generations,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Count descending, then name ascending, truncated to [`TOP_N`].
fn top_n(counts: HashMap<&str, usize>) -> Vec<NamedCount> {
    let mut ranked: Vec<NamedCount> = counts
        .into_iter()
        .map(|(name, count)| NamedCount {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_N);
    ranked
}
