//! The read-only view the lineage engine consumes.
//!
//! [`LineageSource`] is implemented by the SQLite-backed
//! [`FamilyStore`](crate::graph::store::FamilyStore) and by [`MemorySource`],
//! an in-memory snapshot used for whole-family computations and tests.

use std::collections::HashMap;

use crate::error::Result;
use crate::types::{LineageEdge, Person, RelationshipType};

/// Person and edge lookups needed by traversal.
///
/// Implementations hide soft-deleted persons (`person` returns `None`) and
/// inactive edges. Edge lists come back in a stable order; traversal output
/// order depends on it.
pub trait LineageSource {
    fn person(&self, id: &str) -> Result<Option<Person>>;

    /// Active edges whose child is `child_id`; each entry names a parent.
    fn parent_edges(&self, child_id: &str) -> Result<Vec<LineageEdge>>;

    /// Active edges whose parent is `parent_id`; each entry names a child.
    fn child_edges(&self, parent_id: &str) -> Result<Vec<LineageEdge>>;
}

impl<S: LineageSource + ?Sized> LineageSource for &S {
    fn person(&self, id: &str) -> Result<Option<Person>> {
        (**self).person(id)
    }

    fn parent_edges(&self, child_id: &str) -> Result<Vec<LineageEdge>> {
        (**self).parent_edges(child_id)
    }

    fn child_edges(&self, parent_id: &str) -> Result<Vec<LineageEdge>> {
        (**self).child_edges(parent_id)
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// In-memory lineage graph.
///
/// Edges are not validated: self-loops, cycles and edges to unknown ids are
/// all representable, which is what the cycle guards are tested against.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    persons: HashMap<String, Person>,
    order: Vec<String>,
    parents: HashMap<String, Vec<LineageEdge>>,
    children: HashMap<String, Vec<LineageEdge>>,
    edge_count: usize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a person. Insertion order is preserved for
    /// [`MemorySource::persons`].
    pub fn insert_person(&mut self, person: Person) {
        if !self.persons.contains_key(&person.id) {
            self.order.push(person.id.clone());
        }
        self.persons.insert(person.id.clone(), person);
    }

    /// Add an active parent→child edge.
    pub fn add_edge(&mut self, parent_id: &str, child_id: &str, kind: RelationshipType) {
        self.parents
            .entry(child_id.to_string())
            .or_default()
            .push(LineageEdge {
                person_id: parent_id.to_string(),
                relationship_type: kind,
            });
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(LineageEdge {
                person_id: child_id.to_string(),
                relationship_type: kind,
            });
        self.edge_count += 1;
    }

    /// Non-deleted persons in insertion order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.order
            .iter()
            .filter_map(|id| self.persons.get(id))
            .filter(|p| !p.is_deleted)
    }

    pub fn person_count(&self) -> usize {
        self.persons().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Every edge as `(parent_id, child_id)`, grouped by parent in person
    /// insertion order, then any parents not registered as persons.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::with_capacity(self.edge_count);
        let registered = self.order.iter().map(String::as_str);
        let mut unregistered: Vec<&str> = self
            .children
            .keys()
            .map(String::as_str)
            .filter(|id| !self.persons.contains_key(*id))
            .collect();
        unregistered.sort_unstable();
        for parent in registered.chain(unregistered) {
            if let Some(kids) = self.children.get(parent) {
                out.extend(kids.iter().map(|e| (parent, e.person_id.as_str())));
            }
        }
        out
    }
}

impl LineageSource for MemorySource {
    fn person(&self, id: &str) -> Result<Option<Person>> {
        Ok(self.persons.get(id).filter(|p| !p.is_deleted).cloned())
    }

    fn parent_edges(&self, child_id: &str) -> Result<Vec<LineageEdge>> {
        Ok(self.parents.get(child_id).cloned().unwrap_or_default())
    }

    fn child_edges(&self, parent_id: &str) -> Result<Vec<LineageEdge>> {
        Ok(self.children.get(parent_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

/// Build a person with just an id and names, for tests and benches.
#[doc(hidden)]
pub fn fixture_person(id: &str) -> Person {
    use crate::types::{Gender, NewPerson};
    let epoch = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    Person::from_new(
        id.to_string(),
        Gender::Other,
        NewPerson::named(id, "Fixture", Gender::Other),
        epoch,
    )
}
