//! Row → domain-type converters used with `query_and_then`.
//!
//! Columns are read by name, so every `SELECT` feeding these helpers must
//! project the full table row (`SELECT *` or an aliased equivalent).

use rusqlite::types::Type;
use rusqlite::Row;

use crate::types::{
    Event, Gender, LineageEdge, Person, Relationship, RelationshipType, Union, UnionStatus,
    UnionType,
};

/// Decode a lowercase tag column through the enum's `from_str_loose`.
fn tag<T>(row: &Row<'_>, column: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    parse(&raw).ok_or_else(|| {
        let idx = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognised {column} value {raw:?}").into(),
        )
    })
}

pub fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        given_name: row.get("given_name")?,
        family_name: row.get("family_name")?,
        maiden_name: row.get("maiden_name")?,
        gender: tag(row, "gender", Gender::from_str_loose)?,
        birth_date: row.get("birth_date")?,
        birth_place: row.get("birth_place")?,
        death_date: row.get("death_date")?,
        death_place: row.get("death_place")?,
        is_alive: row.get("is_alive")?,
        profile_photo: row.get("profile_photo")?,
        biography: row.get("biography")?,
        profession: row.get("profession")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        is_deleted: row.get("is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn row_to_relationship(row: &Row<'_>) -> rusqlite::Result<Relationship> {
    Ok(Relationship {
        id: row.get("id")?,
        parent_id: row.get("parent_id")?,
        child_id: row.get("child_id")?,
        relationship_type: tag(row, "relationship_type", RelationshipType::from_str_loose)?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

/// Expects the projection `(person_id, relationship_type)`.
pub fn row_to_lineage_edge(row: &Row<'_>) -> rusqlite::Result<LineageEdge> {
    Ok(LineageEdge {
        person_id: row.get("person_id")?,
        relationship_type: tag(row, "relationship_type", RelationshipType::from_str_loose)?,
    })
}

pub fn row_to_union(row: &Row<'_>) -> rusqlite::Result<Union> {
    Ok(Union {
        id: row.get("id")?,
        person1_id: row.get("person1_id")?,
        person2_id: row.get("person2_id")?,
        union_type: tag(row, "union_type", UnionType::from_str_loose)?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        location: row.get("location")?,
        status: tag(row, "status", UnionStatus::from_str_loose)?,
        created_at: row.get("created_at")?,
    })
}

pub fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        title: row.get("title")?,
        event_type: row.get("event_type")?,
        event_date: row.get("event_date")?,
        description: row.get("description")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::initialize_database;

    #[test]
    fn person_row_decodes_dates_and_flags() {
        let conn = initialize_database(":memory:").unwrap();
        conn.execute(
            "INSERT INTO persons (id, given_name, family_name, gender, birth_date, death_date,
                                  is_alive, created_at, updated_at)
             VALUES ('p1', 'Ada', 'Lovelace', 'female', '1815-12-10', '1852-11-27',
                     0, '2024-01-01T00:00:00', '2024-01-02T00:00:00')",
            [],
        )
        .unwrap();

        let person = conn
            .query_row("SELECT * FROM persons WHERE id = 'p1'", [], row_to_person)
            .unwrap();
        assert_eq!(person.gender, Gender::Female);
        assert_eq!(
            person.birth_date,
            chrono::NaiveDate::from_ymd_opt(1815, 12, 10)
        );
        assert!(!person.is_alive);
        assert!(!person.is_deleted);
        assert!(person.maiden_name.is_none());
    }

    #[test]
    fn unknown_tag_is_a_conversion_error() {
        let conn = initialize_database(":memory:").unwrap();
        conn.execute(
            "INSERT INTO persons (id, given_name, family_name, gender, created_at, updated_at)
             VALUES ('p1', 'X', 'Y', 'robot', '2024-01-01T00:00:00', '2024-01-01T00:00:00')",
            [],
        )
        .unwrap();
        let result = conn.query_row("SELECT * FROM persons WHERE id = 'p1'", [], row_to_person);
        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(..))
        ));
    }
}
