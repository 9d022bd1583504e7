//! SQLite schema initialization for famgraph.
//!
//! Four tables: `persons`, `relationships` (directed parent→child edges),
//! `unions` and `events`. Dates are stored as ISO-8601 `TEXT` so they sort
//! lexicographically in SQL. `*_name_key` columns hold the Unicode-lowercased
//! names, written by the store, for search and ordering.

use rusqlite::Connection;

// ---------------------------------------------------------------------------
// DDL constants
// ---------------------------------------------------------------------------

const CREATE_PERSONS: &str = "\
CREATE TABLE IF NOT EXISTS persons (
  id TEXT PRIMARY KEY,
  given_name TEXT NOT NULL,
  family_name TEXT NOT NULL,
  given_name_key TEXT NOT NULL DEFAULT '',
  family_name_key TEXT NOT NULL DEFAULT '',
  maiden_name TEXT,
  gender TEXT NOT NULL,
  birth_date TEXT,
  birth_place TEXT,
  death_date TEXT,
  death_place TEXT,
  is_alive INTEGER NOT NULL DEFAULT 1,
  profile_photo TEXT,
  biography TEXT,
  profession TEXT,
  email TEXT,
  phone TEXT,
  is_deleted INTEGER NOT NULL DEFAULT 0,
  created_at TEXT NOT NULL,
  updated_at TEXT NOT NULL
)";

const CREATE_RELATIONSHIPS: &str = "\
CREATE TABLE IF NOT EXISTS relationships (
  id TEXT PRIMARY KEY,
  parent_id TEXT NOT NULL,
  child_id TEXT NOT NULL,
  relationship_type TEXT NOT NULL DEFAULT 'biological',
  is_active INTEGER NOT NULL DEFAULT 1,
  created_at TEXT NOT NULL,
  CHECK (parent_id <> child_id),
  FOREIGN KEY (parent_id) REFERENCES persons(id) ON DELETE CASCADE,
  FOREIGN KEY (child_id) REFERENCES persons(id) ON DELETE CASCADE
)";

const CREATE_UNIONS: &str = "\
CREATE TABLE IF NOT EXISTS unions (
  id TEXT PRIMARY KEY,
  person1_id TEXT NOT NULL,
  person2_id TEXT NOT NULL,
  union_type TEXT NOT NULL DEFAULT 'marriage',
  start_date TEXT,
  end_date TEXT,
  location TEXT,
  status TEXT NOT NULL DEFAULT 'active',
  created_at TEXT NOT NULL,
  CHECK (person1_id <> person2_id),
  FOREIGN KEY (person1_id) REFERENCES persons(id) ON DELETE CASCADE,
  FOREIGN KEY (person2_id) REFERENCES persons(id) ON DELETE CASCADE
)";

const CREATE_EVENTS: &str = "\
CREATE TABLE IF NOT EXISTS events (
  id TEXT PRIMARY KEY,
  person_id TEXT NOT NULL,
  title TEXT NOT NULL,
  event_type TEXT NOT NULL,
  event_date TEXT NOT NULL,
  description TEXT,
  FOREIGN KEY (person_id) REFERENCES persons(id) ON DELETE CASCADE
)";

// Indexes ----------------------------------------------------------------

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_persons_family ON persons(family_name_key, given_name_key)",
    "CREATE INDEX IF NOT EXISTS idx_rel_parent ON relationships(parent_id)",
    "CREATE INDEX IF NOT EXISTS idx_rel_child ON relationships(child_id)",
    "CREATE INDEX IF NOT EXISTS idx_unions_p1 ON unions(person1_id)",
    "CREATE INDEX IF NOT EXISTS idx_unions_p2 ON unions(person2_id)",
    "CREATE INDEX IF NOT EXISTS idx_events_person ON events(person_id)",
    "CREATE INDEX IF NOT EXISTS idx_events_date ON events(event_date)",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Open (or create) the SQLite database at `db_path` and apply the famgraph
/// schema.
///
/// The returned connection has WAL mode, foreign keys, and synchronous
/// NORMAL already configured.
///
/// # Errors
///
/// Returns a `rusqlite::Error` if the database cannot be opened or any DDL
/// statement fails.
pub fn initialize_database(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;

    // -- Pragmas ----------------------------------------------------------
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;

    // -- Tables -----------------------------------------------------------
    conn.execute_batch(CREATE_PERSONS)?;
    conn.execute_batch(CREATE_RELATIONSHIPS)?;
    conn.execute_batch(CREATE_UNIONS)?;
    conn.execute_batch(CREATE_EVENTS)?;

    // -- Indexes ----------------------------------------------------------
    for ddl in CREATE_INDEXES {
        conn.execute_batch(ddl)?;
    }

    Ok(conn)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        initialize_database(":memory:").expect("schema creation should succeed on :memory:")
    }

    fn object_exists(conn: &Connection, obj_type: &str, obj_name: &str) -> bool {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
                rusqlite::params![obj_type, obj_name],
                |row| row.get(0),
            )
            .unwrap();
        count > 0
    }

    fn columns_of(conn: &Connection, table: &str) -> Vec<String> {
        conn.prepare(&format!("PRAGMA table_info({table})"))
            .unwrap()
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    fn insert_person(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO persons (id, given_name, family_name, gender, created_at, updated_at)
             VALUES (?1, 'Given', 'Family', 'other', '2024-01-01T00:00:00', '2024-01-01T00:00:00')",
            [id],
        )
        .unwrap();
    }

    #[test]
    fn tables_exist() {
        let conn = setup();
        for table in &["persons", "relationships", "unions", "events"] {
            assert!(
                object_exists(&conn, "table", table),
                "table '{table}' should exist"
            );
        }
    }

    #[test]
    fn indexes_exist() {
        let conn = setup();
        for idx in &[
            "idx_persons_family",
            "idx_rel_parent",
            "idx_rel_child",
            "idx_unions_p1",
            "idx_unions_p2",
            "idx_events_person",
            "idx_events_date",
        ] {
            assert!(
                object_exists(&conn, "index", idx),
                "index '{idx}' should exist"
            );
        }
    }

    #[test]
    fn pragmas_are_set() {
        let conn = setup();

        let journal_mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        // In-memory databases report "memory".
        assert!(
            journal_mode == "wal" || journal_mode == "memory",
            "journal_mode should be 'wal' or 'memory', got '{journal_mode}'"
        );

        let fk: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1, "foreign_keys should be ON");

        let sync: i64 = conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        assert_eq!(sync, 1, "synchronous should be NORMAL (1)");
    }

    #[test]
    fn persons_table_has_expected_columns() {
        let conn = setup();
        let columns = columns_of(&conn, "persons");
        for col in &[
            "id",
            "given_name",
            "family_name",
            "given_name_key",
            "family_name_key",
            "maiden_name",
            "gender",
            "birth_date",
            "death_date",
            "is_alive",
            "profile_photo",
            "profession",
            "is_deleted",
            "created_at",
            "updated_at",
        ] {
            assert!(
                columns.contains(&col.to_string()),
                "persons table should have column '{col}', found: {columns:?}"
            );
        }
    }

    #[test]
    fn relationship_defaults_apply() {
        let conn = setup();
        insert_person(&conn, "p1");
        insert_person(&conn, "p2");
        conn.execute(
            "INSERT INTO relationships (id, parent_id, child_id, created_at)
             VALUES ('r1', 'p1', 'p2', '2024-01-01T00:00:00')",
            [],
        )
        .unwrap();

        let (kind, active): (String, i64) = conn
            .query_row(
                "SELECT relationship_type, is_active FROM relationships WHERE id = 'r1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(kind, "biological");
        assert_eq!(active, 1);
    }

    #[test]
    fn self_parenting_edge_is_rejected_by_check() {
        let conn = setup();
        insert_person(&conn, "p1");
        let result = conn.execute(
            "INSERT INTO relationships (id, parent_id, child_id, created_at)
             VALUES ('r1', 'p1', 'p1', '2024-01-01T00:00:00')",
            [],
        );
        assert!(result.is_err(), "parent_id = child_id should fail the CHECK");
    }

    #[test]
    fn foreign_keys_reject_dangling_edge() {
        let conn = setup();
        insert_person(&conn, "p1");
        let result = conn.execute(
            "INSERT INTO relationships (id, parent_id, child_id, created_at)
             VALUES ('r1', 'p1', 'ghost', '2024-01-01T00:00:00')",
            [],
        );
        assert!(result.is_err(), "edge to a missing person should fail");
    }

    #[test]
    fn union_defaults_apply() {
        let conn = setup();
        insert_person(&conn, "p1");
        insert_person(&conn, "p2");
        conn.execute(
            "INSERT INTO unions (id, person1_id, person2_id, created_at)
             VALUES ('u1', 'p1', 'p2', '2024-01-01T00:00:00')",
            [],
        )
        .unwrap();
        let (kind, status): (String, String) = conn
            .query_row(
                "SELECT union_type, status FROM unions WHERE id = 'u1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(kind, "marriage");
        assert_eq!(status, "active");
    }

    #[test]
    fn initialization_is_idempotent_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("family.db");
        let path = path.to_str().unwrap();
        {
            let conn = initialize_database(path).unwrap();
            insert_person(&conn, "p1");
        }
        let conn = initialize_database(path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM persons", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
