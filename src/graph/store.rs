//! SQLite CRUD layer for famgraph.
//!
//! `FamilyStore` owns the connection and enforces the write-time rules of the
//! family graph (existence checks, date sanity, duplicate edges, optional
//! acyclicity and parent cardinality). Every query goes through
//! [`Connection::prepare_cached`].

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::schema::{DeletePolicy, IntegrityConfig};
use crate::db::converters::{
    row_to_event, row_to_lineage_edge, row_to_person, row_to_relationship, row_to_union,
};
use crate::db::schema::initialize_database;
use crate::error::{FamGraphError, Result};
use crate::graph::age::compute_age;
use crate::graph::source::{LineageSource, MemorySource};
use crate::graph::traversal::is_ancestor;
use crate::types::{
    check_life_dates, new_record_id, Event, LineageEdge, NewEvent, NewPerson, NewRelationship,
    NewUnion, Paged, Person, PersonQuery, PersonUpdate, Relationship, RelationshipType, Union,
    UnionUpdate,
};

// ---------------------------------------------------------------------------
// Aggregates returned by the store
// ---------------------------------------------------------------------------

/// Row counts across the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub persons: usize,
    pub deleted_persons: usize,
    pub relationships: usize,
    pub unions: usize,
    pub events: usize,
}

/// A relative reached over one active edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kin {
    pub relationship_id: String,
    pub relationship_type: RelationshipType,
    pub person: Person,
}

/// A union seen from one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partnership {
    #[serde(rename = "union")]
    pub union: Union,
    pub partner: Person,
}

/// A person with immediate family and computed age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetail {
    pub person: Person,
    pub age: Option<i32>,
    pub parents: Vec<Kin>,
    pub children: Vec<Kin>,
    pub unions: Vec<Partnership>,
}

/// Active edges touching a person, split by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonRelationships {
    pub as_parent: Vec<Relationship>,
    pub as_child: Vec<Relationship>,
}

// ---------------------------------------------------------------------------
// FamilyStore
// ---------------------------------------------------------------------------

/// Typed CRUD wrapper around the famgraph SQLite database.
pub struct FamilyStore {
    pub conn: Connection,
    policy: IntegrityConfig,
}

impl std::fmt::Debug for FamilyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FamilyStore")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// SQL constants
// ---------------------------------------------------------------------------

const INSERT_PERSON_SQL: &str = "\
INSERT INTO persons (id, given_name, family_name, maiden_name, gender, birth_date, birth_place,
                     death_date, death_place, is_alive, profile_photo, biography, profession,
                     email, phone, is_deleted, created_at, updated_at, given_name_key,
                     family_name_key)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19,
        ?20)";

const UPDATE_PERSON_SQL: &str = "\
UPDATE persons SET
  given_name = ?2, family_name = ?3, maiden_name = ?4, gender = ?5,
  birth_date = ?6, birth_place = ?7, death_date = ?8, death_place = ?9,
  is_alive = ?10, profile_photo = ?11, biography = ?12, profession = ?13,
  email = ?14, phone = ?15, updated_at = ?16, given_name_key = ?17, family_name_key = ?18
WHERE id = ?1";

const LIST_PERSONS_SQL: &str = "\
SELECT * FROM persons
WHERE is_deleted = 0
  AND (?1 IS NULL
       OR given_name_key LIKE ?1 ESCAPE '\\'
       OR family_name_key LIKE ?1 ESCAPE '\\')
ORDER BY family_name_key ASC, given_name_key ASC, rowid ASC
LIMIT ?2 OFFSET ?3";

const COUNT_PERSONS_SQL: &str = "\
SELECT count(*) FROM persons
WHERE is_deleted = 0
  AND (?1 IS NULL
       OR given_name_key LIKE ?1 ESCAPE '\\'
       OR family_name_key LIKE ?1 ESCAPE '\\')";

const INSERT_RELATIONSHIP_SQL: &str = "\
INSERT INTO relationships (id, parent_id, child_id, relationship_type, is_active, created_at)
VALUES (?1, ?2, ?3, ?4, 1, ?5)";

const PARENT_EDGES_SQL: &str = "\
SELECT parent_id AS person_id, relationship_type FROM relationships
WHERE child_id = ?1 AND is_active = 1
ORDER BY rowid";

const CHILD_EDGES_SQL: &str = "\
SELECT child_id AS person_id, relationship_type FROM relationships
WHERE parent_id = ?1 AND is_active = 1
ORDER BY rowid";

const INSERT_UNION_SQL: &str = "\
INSERT INTO unions (id, person1_id, person2_id, union_type, start_date, end_date, location,
                    status, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const UPDATE_UNION_SQL: &str = "\
UPDATE unions SET union_type = ?2, start_date = ?3, end_date = ?4, location = ?5, status = ?6
WHERE id = ?1";

const INSERT_EVENT_SQL: &str = "\
INSERT INTO events (id, person_id, title, event_type, event_date, description)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const SNAPSHOT_EDGES_SQL: &str = "\
SELECT r.* FROM relationships r
JOIN persons p ON p.id = r.parent_id AND p.is_deleted = 0
JOIN persons c ON c.id = r.child_id AND c.is_deleted = 0
WHERE r.is_active = 1
ORDER BY r.rowid";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Trimmed, non-empty text or an `InvalidInput` naming the field.
fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FamGraphError::invalid(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Folded form of a name for the `*_name_key` columns. SQLite's `lower()`
/// and `NOCASE` only fold ASCII, so folding happens here on both sides.
fn search_key(name: &str) -> String {
    name.to_lowercase()
}

/// `%term%` LIKE pattern over the folded search string, with LIKE
/// metacharacters escaped.
fn like_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in search_key(term).chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Some(escaped)
}

fn check_union_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(FamGraphError::invalid(format!(
                "union end date {end} precedes start date {start}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Implementation
// ---------------------------------------------------------------------------

impl FamilyStore {
    /// Open (or create) the database at `db_path`, apply the schema, and
    /// return a store with the default integrity policy.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = initialize_database(db_path)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-initialized connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            policy: IntegrityConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: IntegrityConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &IntegrityConfig {
        &self.policy
    }

    // -------------------------------------------------------------------
    // Persons
    // -------------------------------------------------------------------

    pub fn create_person(&self, new: NewPerson) -> Result<Person> {
        let mut new = new;
        new.given_name = required(&new.given_name, "given name")?;
        new.family_name = required(&new.family_name, "family name")?;
        let gender = new
            .gender
            .ok_or_else(|| FamGraphError::invalid("gender is required"))?;
        check_life_dates(new.birth_date, new.death_date)?;

        let id = match new.id.take() {
            Some(id) => required(&id, "id")?,
            None => new_record_id("person"),
        };
        if self.find_person_row(&id)?.is_some() {
            return Err(FamGraphError::integrity(format!(
                "person id already exists: {id}"
            )));
        }

        let person = Person::from_new(id, gender, new, now());
        let mut stmt = self.conn.prepare_cached(INSERT_PERSON_SQL)?;
        stmt.execute(params![
            person.id,
            person.given_name,
            person.family_name,
            person.maiden_name,
            person.gender.as_str(),
            person.birth_date,
            person.birth_place,
            person.death_date,
            person.death_place,
            person.is_alive,
            person.profile_photo,
            person.biography,
            person.profession,
            person.email,
            person.phone,
            person.is_deleted,
            person.created_at,
            person.updated_at,
            search_key(&person.given_name),
            search_key(&person.family_name),
        ])?;
        info!(id = %person.id, name = %person.full_name(), "person created");
        Ok(person)
    }

    /// Row lookup that includes soft-deleted persons.
    fn find_person_row(&self, id: &str) -> Result<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM persons WHERE id = ?1")?;
        let mut rows = stmt.query_and_then(params![id], row_to_person)?;
        match rows.next() {
            Some(Ok(person)) => Ok(Some(person)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// A non-deleted person, or `None`.
    pub fn get_person(&self, id: &str) -> Result<Option<Person>> {
        Ok(self.find_person_row(id)?.filter(|p| !p.is_deleted))
    }

    /// A non-deleted person, or `NotFound`.
    pub fn require_person(&self, id: &str) -> Result<Person> {
        self.get_person(id)?
            .ok_or_else(|| FamGraphError::not_found("person", id))
    }

    /// The person with parents, children, unions and age at `reference`.
    pub fn person_detail(&self, id: &str, reference: NaiveDate) -> Result<PersonDetail> {
        let person = self.require_person(id)?;
        let links = self.relationships_of(id)?;

        let mut parents = Vec::with_capacity(links.as_child.len());
        for rel in links.as_child {
            if let Some(parent) = self.get_person(&rel.parent_id)? {
                parents.push(Kin {
                    relationship_id: rel.id,
                    relationship_type: rel.relationship_type,
                    person: parent,
                });
            }
        }
        let mut children = Vec::with_capacity(links.as_parent.len());
        for rel in links.as_parent {
            if let Some(child) = self.get_person(&rel.child_id)? {
                children.push(Kin {
                    relationship_id: rel.id,
                    relationship_type: rel.relationship_type,
                    person: child,
                });
            }
        }

        let age = compute_age(person.birth_date, person.death_date, reference);
        Ok(PersonDetail {
            unions: self.partners_of(id)?,
            person,
            age,
            parents,
            children,
        })
    }

    /// Partial update. The date invariant is checked on the merged record.
    pub fn update_person(&self, id: &str, update: PersonUpdate) -> Result<Person> {
        let mut person = self.require_person(id)?;
        let mut update = update;
        if let Some(name) = update.given_name.take() {
            update.given_name = Some(required(&name, "given name")?);
        }
        if let Some(name) = update.family_name.take() {
            update.family_name = Some(required(&name, "family name")?);
        }
        person.apply(update, now());
        check_life_dates(person.birth_date, person.death_date)?;

        let mut stmt = self.conn.prepare_cached(UPDATE_PERSON_SQL)?;
        stmt.execute(params![
            person.id,
            person.given_name,
            person.family_name,
            person.maiden_name,
            person.gender.as_str(),
            person.birth_date,
            person.birth_place,
            person.death_date,
            person.death_place,
            person.is_alive,
            person.profile_photo,
            person.biography,
            person.profession,
            person.email,
            person.phone,
            person.updated_at,
            search_key(&person.given_name),
            search_key(&person.family_name),
        ])?;
        info!(id = %person.id, "person updated");
        Ok(person)
    }

    /// Soft-delete a person according to the configured [`DeletePolicy`].
    ///
    /// Deleting an already-deleted person is a no-op; an id that never
    /// existed is `NotFound`.
    pub fn delete_person(&self, id: &str) -> Result<()> {
        let person = self
            .find_person_row(id)?
            .ok_or_else(|| FamGraphError::not_found("person", id))?;
        if person.is_deleted {
            debug!(id, "person already deleted");
            return Ok(());
        }

        let active_edges: i64 = self
            .conn
            .prepare_cached(
                "SELECT count(*) FROM relationships
                 WHERE is_active = 1 AND (parent_id = ?1 OR child_id = ?1)",
            )?
            .query_row(params![id], |row| row.get(0))?;

        match self.policy.delete_policy {
            DeletePolicy::Reject if active_edges > 0 => Err(FamGraphError::integrity(format!(
                "person {id} still has {active_edges} active relationship(s)"
            ))),
            _ => {
                let tx = self.conn.unchecked_transaction()?;
                tx.execute(
                    "UPDATE relationships SET is_active = 0
                     WHERE is_active = 1 AND (parent_id = ?1 OR child_id = ?1)",
                    params![id],
                )?;
                tx.execute(
                    "UPDATE persons SET is_deleted = 1, updated_at = ?2 WHERE id = ?1",
                    params![id, now()],
                )?;
                tx.commit()?;
                info!(
                    id,
                    policy = %self.policy.delete_policy,
                    deactivated_edges = active_edges,
                    "person deleted"
                );
                Ok(())
            }
        }
    }

    /// Paginated listing of non-deleted persons, ordered by family name then
    /// given name. `search` matches a case-insensitive substring of either.
    pub fn list_persons(&self, query: &PersonQuery) -> Result<Paged<Person>> {
        let (page, limit) = query.pagination();
        let pattern = like_pattern(query.search.as_deref());

        let total: i64 = self
            .conn
            .prepare_cached(COUNT_PERSONS_SQL)?
            .query_row(params![pattern], |row| row.get(0))?;
        let offset = i64::from(page - 1) * i64::from(limit);

        let mut stmt = self.conn.prepare_cached(LIST_PERSONS_SQL)?;
        let rows = stmt.query_and_then(params![pattern, limit, offset], row_to_person)?;
        let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let total = total as usize;
        Ok(Paged {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit as usize),
            items,
        })
    }

    /// Every non-deleted person in creation order.
    pub fn all_persons(&self) -> Result<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM persons WHERE is_deleted = 0 ORDER BY rowid")?;
        let rows = stmt.query_and_then([], row_to_person)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    // -------------------------------------------------------------------
    // Relationships
    // -------------------------------------------------------------------

    pub fn create_relationship(&self, new: NewRelationship) -> Result<Relationship> {
        let parent_id = required(&new.parent_id, "parent id")?;
        let child_id = required(&new.child_id, "child id")?;
        if parent_id == child_id {
            return Err(FamGraphError::invalid("a person cannot be their own parent"));
        }

        let parent = self.require_person(&parent_id)?;
        let child = self.require_person(&child_id)?;
        if let (Some(pb), Some(cb)) = (parent.birth_date, child.birth_date) {
            if pb > cb {
                return Err(FamGraphError::invalid(format!(
                    "parent {parent_id} (born {pb}) is born after child {child_id} (born {cb})"
                )));
            }
        }

        let existing = self.parent_edges(&child_id)?;
        if existing.iter().any(|e| e.person_id == parent_id) {
            return Err(FamGraphError::integrity(format!(
                "{parent_id} is already a parent of {child_id}"
            )));
        }
        if let Some(max) = self.policy.max_parents {
            if existing.len() >= max {
                return Err(FamGraphError::integrity(format!(
                    "{child_id} already has {} parent(s); limit is {max}",
                    existing.len()
                )));
            }
        }
        if self.policy.reject_cycles && is_ancestor(self, &child_id, &parent_id)? {
            return Err(FamGraphError::integrity(format!(
                "{child_id} is an ancestor of {parent_id}; the edge would create a cycle"
            )));
        }

        let rel = Relationship {
            id: new_record_id("rel"),
            parent_id,
            child_id,
            relationship_type: new.relationship_type.unwrap_or_default(),
            is_active: true,
            created_at: now(),
        };
        let mut stmt = self.conn.prepare_cached(INSERT_RELATIONSHIP_SQL)?;
        stmt.execute(params![
            rel.id,
            rel.parent_id,
            rel.child_id,
            rel.relationship_type.as_str(),
            rel.created_at,
        ])?;
        info!(
            id = %rel.id,
            parent = %rel.parent_id,
            child = %rel.child_id,
            kind = %rel.relationship_type,
            "relationship created"
        );
        Ok(rel)
    }

    pub fn get_relationship(&self, id: &str) -> Result<Option<Relationship>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM relationships WHERE id = ?1")?;
        stmt.query_row(params![id], row_to_relationship)
            .optional()
            .map_err(Into::into)
    }

    /// Soft-delete an edge. Deactivating an inactive edge is a no-op.
    pub fn deactivate_relationship(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .prepare_cached("UPDATE relationships SET is_active = 0 WHERE id = ?1")?
            .execute(params![id])?;
        if changed == 0 {
            return Err(FamGraphError::not_found("relationship", id));
        }
        info!(id, "relationship deactivated");
        Ok(())
    }

    /// Active edges where `person_id` is the parent or the child.
    pub fn relationships_of(&self, person_id: &str) -> Result<PersonRelationships> {
        let query = |sql: &str| -> Result<Vec<Relationship>> {
            let mut stmt = self.conn.prepare_cached(sql)?;
            let rows = stmt.query_and_then(params![person_id], row_to_relationship)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
                .map_err(Into::into)
        };
        Ok(PersonRelationships {
            as_parent: query(
                "SELECT * FROM relationships WHERE parent_id = ?1 AND is_active = 1 ORDER BY rowid",
            )?,
            as_child: query(
                "SELECT * FROM relationships WHERE child_id = ?1 AND is_active = 1 ORDER BY rowid",
            )?,
        })
    }

    // -------------------------------------------------------------------
    // Unions
    // -------------------------------------------------------------------

    pub fn create_union(&self, new: NewUnion) -> Result<Union> {
        let person1_id = required(&new.person1_id, "person1 id")?;
        let person2_id = required(&new.person2_id, "person2 id")?;
        if person1_id == person2_id {
            return Err(FamGraphError::invalid(
                "a union needs two different persons",
            ));
        }
        self.require_person(&person1_id)?;
        self.require_person(&person2_id)?;
        check_union_dates(new.start_date, new.end_date)?;

        let union = Union {
            id: new_record_id("union"),
            person1_id,
            person2_id,
            union_type: new.union_type.unwrap_or_default(),
            start_date: new.start_date,
            end_date: new.end_date,
            location: new.location,
            status: new.status.unwrap_or_default(),
            created_at: now(),
        };
        let mut stmt = self.conn.prepare_cached(INSERT_UNION_SQL)?;
        stmt.execute(params![
            union.id,
            union.person1_id,
            union.person2_id,
            union.union_type.as_str(),
            union.start_date,
            union.end_date,
            union.location,
            union.status.as_str(),
            union.created_at,
        ])?;
        info!(id = %union.id, "union created");
        Ok(union)
    }

    pub fn get_union(&self, id: &str) -> Result<Option<Union>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM unions WHERE id = ?1")?;
        stmt.query_row(params![id], row_to_union)
            .optional()
            .map_err(Into::into)
    }

    pub fn update_union(&self, id: &str, update: UnionUpdate) -> Result<Union> {
        let mut union = self
            .get_union(id)?
            .ok_or_else(|| FamGraphError::not_found("union", id))?;
        if let Some(kind) = update.union_type {
            union.union_type = kind;
        }
        if let Some(status) = update.status {
            union.status = status;
        }
        if update.start_date.is_some() {
            union.start_date = update.start_date;
        }
        if update.end_date.is_some() {
            union.end_date = update.end_date;
        }
        if update.location.is_some() {
            union.location = update.location;
        }
        check_union_dates(union.start_date, union.end_date)?;

        let mut stmt = self.conn.prepare_cached(UPDATE_UNION_SQL)?;
        stmt.execute(params![
            union.id,
            union.union_type.as_str(),
            union.start_date,
            union.end_date,
            union.location,
            union.status.as_str(),
        ])?;
        info!(id, "union updated");
        Ok(union)
    }

    pub fn delete_union(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .prepare_cached("DELETE FROM unions WHERE id = ?1")?
            .execute(params![id])?;
        if changed == 0 {
            return Err(FamGraphError::not_found("union", id));
        }
        info!(id, "union deleted");
        Ok(())
    }

    /// All unions, newest first.
    pub fn list_unions(&self) -> Result<Vec<Union>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT * FROM unions ORDER BY created_at DESC, rowid DESC")?;
        let rows = stmt.query_and_then([], row_to_union)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Unions involving `person_id`, with the partner resolved. Unions whose
    /// partner is deleted are skipped.
    pub fn partners_of(&self, person_id: &str) -> Result<Vec<Partnership>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM unions WHERE person1_id = ?1 OR person2_id = ?1 ORDER BY rowid",
        )?;
        let unions = stmt
            .query_and_then(params![person_id], row_to_union)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(unions.len());
        for union in unions {
            let Some(partner_id) = union.partner_of(person_id) else {
                continue;
            };
            if let Some(partner) = self.get_person(partner_id)? {
                out.push(Partnership { union, partner });
            }
        }
        Ok(out)
    }

    // -------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------

    pub fn create_event(&self, new: NewEvent) -> Result<Event> {
        self.require_person(&new.person_id)?;
        let event = Event {
            id: new_record_id("event"),
            person_id: new.person_id,
            title: required(&new.title, "event title")?,
            event_type: required(&new.event_type, "event type")?.to_lowercase(),
            event_date: new.event_date,
            description: new.description,
        };
        let mut stmt = self.conn.prepare_cached(INSERT_EVENT_SQL)?;
        stmt.execute(params![
            event.id,
            event.person_id,
            event.title,
            event.event_type,
            event.event_date,
            event.description,
        ])?;
        info!(id = %event.id, person = %event.person_id, "event created");
        Ok(event)
    }

    /// A person's events, oldest first.
    pub fn events_for(&self, person_id: &str) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT * FROM events WHERE person_id = ?1 ORDER BY event_date ASC, rowid ASC",
        )?;
        let rows = stmt.query_and_then(params![person_id], row_to_event)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Every event of non-deleted persons, newest first.
    pub fn timeline(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT e.* FROM events e
             JOIN persons p ON p.id = e.person_id AND p.is_deleted = 0
             ORDER BY e.event_date DESC, e.rowid DESC",
        )?;
        let rows = stmt.query_and_then([], row_to_event)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn delete_event(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .prepare_cached("DELETE FROM events WHERE id = ?1")?
            .execute(params![id])?;
        if changed == 0 {
            return Err(FamGraphError::not_found("event", id));
        }
        info!(id, "event deleted");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Whole-graph reads
    // -------------------------------------------------------------------

    /// Copy every non-deleted person and every active edge between them
    /// into a [`MemorySource`].
    pub fn snapshot(&self) -> Result<MemorySource> {
        let mut source = MemorySource::new();
        for person in self.all_persons()? {
            source.insert_person(person);
        }
        let mut stmt = self.conn.prepare_cached(SNAPSHOT_EDGES_SQL)?;
        let rows = stmt.query_and_then([], row_to_relationship)?;
        for rel in rows {
            let rel = rel?;
            source.add_edge(&rel.parent_id, &rel.child_id, rel.relationship_type);
        }
        debug!(
            persons = source.person_count(),
            edges = source.edge_count(),
            "snapshot loaded"
        );
        Ok(source)
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn get_stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            persons: self.count("SELECT count(*) FROM persons WHERE is_deleted = 0")?,
            deleted_persons: self.count("SELECT count(*) FROM persons WHERE is_deleted = 1")?,
            relationships: self.count("SELECT count(*) FROM relationships WHERE is_active = 1")?,
            unions: self.count("SELECT count(*) FROM unions")?,
            events: self.count("SELECT count(*) FROM events")?,
        })
    }
}

// ---------------------------------------------------------------------------
// LineageSource
// ---------------------------------------------------------------------------

impl LineageSource for FamilyStore {
    fn person(&self, id: &str) -> Result<Option<Person>> {
        self.get_person(id)
    }

    fn parent_edges(&self, child_id: &str) -> Result<Vec<LineageEdge>> {
        let mut stmt = self.conn.prepare_cached(PARENT_EDGES_SQL)?;
        let rows = stmt.query_and_then(params![child_id], row_to_lineage_edge)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn child_edges(&self, parent_id: &str) -> Result<Vec<LineageEdge>> {
        let mut stmt = self.conn.prepare_cached(CHILD_EDGES_SQL)?;
        let rows = stmt.query_and_then(params![parent_id], row_to_lineage_edge)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
