use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use super::StorageError;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS calendars (
    calendar_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS companies (
    company_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    pay_rate REAL NOT NULL,
    color TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    calendar_id INTEGER NOT NULL REFERENCES calendars (calendar_id) ON DELETE CASCADE,
    date_start TEXT NOT NULL,
    date_end TEXT NOT NULL,
    title TEXT NOT NULL,
    all_day INTEGER NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
    company_id INTEGER REFERENCES companies (company_id) ON DELETE SET NULL,
    description TEXT
);

CREATE INDEX IF NOT EXISTS events_calendar_id ON events (calendar_id);

CREATE TABLE IF NOT EXISTS series (
    series_id INTEGER PRIMARY KEY AUTOINCREMENT,
    calendar_id INTEGER NOT NULL REFERENCES calendars (calendar_id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    start_recur TEXT NOT NULL,
    end_recur TEXT,
    days_of_week TEXT NOT NULL,
    user_id INTEGER NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
    company_id INTEGER REFERENCES companies (company_id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS series_calendar_id ON series (calendar_id);

CREATE TABLE IF NOT EXISTS cancellations (
    cancellation_id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL UNIQUE REFERENCES events (event_id) ON DELETE CASCADE,
    reason TEXT NOT NULL,
    amount REAL,
    excluded_dates TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS payment_overrides (
    payment_override_id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES events (event_id) ON DELETE CASCADE,
    amount REAL NOT NULL
);
";

/// Handle to the SQLite file. Cheap to clone; holds no open connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let database = Self { path };
        database.initialize()?;
        tracing::info!("Database ready at {}", database.path.display());
        Ok(database)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }

    fn initialize(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool, StorageError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use crate::calendar::User;
    use crate::storage::Repository;
    use rusqlite::Connection;
    use tempfile::TempDir;

    /// The `TempDir` must outlive the database handle.
    pub fn temp_database() -> (TempDir, Database) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db = Database::open(dir.path().join("calendar.db")).expect("failed to open database");
        (dir, db)
    }

    /// Inserts the owner that event and series rows point at.
    pub fn seed_user(conn: &Connection) -> i64 {
        let user = User {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        };
        Repository::insert(conn, &user).expect("failed to seed user")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::temp_database;
    use super::*;

    #[test]
    fn creates_database_schema() {
        let (_dir, db) = temp_database();

        for table in [
            "calendars",
            "users",
            "companies",
            "events",
            "series",
            "cancellations",
            "payment_overrides",
        ] {
            assert!(db.table_exists(table).unwrap(), "missing table {table}");
        }
    }

    #[test]
    fn reopening_an_existing_database_is_idempotent() {
        let (dir, db) = temp_database();

        let reopened = Database::open(db.path().to_path_buf()).unwrap();

        assert!(reopened.table_exists("events").unwrap());
        drop(dir);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("calendar.db");

        Database::open(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn connections_enforce_foreign_keys() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();

        let result = conn.execute(
            "INSERT INTO payment_overrides (event_id, amount) VALUES (?1, ?2)",
            rusqlite::params![12345, 10.0],
        );

        assert!(result.is_err());
    }

    #[test]
    fn events_must_point_at_a_stored_user() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        conn.execute("INSERT INTO calendars (name) VALUES ('Work')", []).unwrap();

        let result = conn.execute(
            "INSERT INTO events (calendar_id, date_start, date_end, title, all_day, user_id)
             VALUES (1, '2021-07-29 14:30:00', '2021-07-29 15:30:00', 'Standup', 0, 99)",
            [],
        );

        assert!(result.is_err());
    }

    #[test]
    fn cancellations_are_unique_per_event() {
        let (_dir, db) = temp_database();
        let conn = db.connect().unwrap();
        conn.execute("INSERT INTO calendars (name) VALUES ('Work')", []).unwrap();
        test_support::seed_user(&conn);
        conn.execute(
            "INSERT INTO events (calendar_id, date_start, date_end, title, all_day, user_id)
             VALUES (1, '2021-07-29 14:30:00', '2021-07-29 15:30:00', 'Standup', 0, 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO cancellations (event_id, reason) VALUES (1, 'sick')",
            [],
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO cancellations (event_id, reason) VALUES (1, 'again')", [])
            .map_err(StorageError::from)
            .unwrap_err();

        assert!(err.is_unique_violation());
    }
}
