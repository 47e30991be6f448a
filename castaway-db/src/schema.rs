//! SQLite storage handle and schema creation.

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to set up tables: {}", .0.join(", "))]
    TableSetup(Vec<&'static str>),
}

/// Table definitions in foreign-key dependency order.
const TABLES: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER UNIQUE NOT NULL,
            label TEXT
        )",
    ),
    (
        "seasons",
        "CREATE TABLE IF NOT EXISTS seasons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            server_id INTEGER UNIQUE NOT NULL,
            name TEXT NOT NULL,
            episode INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'inactive' CHECK (status IN ('active', 'inactive'))
        )",
    ),
    (
        "tribes",
        "CREATE TABLE IF NOT EXISTS tribes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            iteration INTEGER NOT NULL DEFAULT 1 CHECK (iteration >= 1),
            season INTEGER NOT NULL REFERENCES seasons(id),
            color TEXT NOT NULL DEFAULT 'd3d3d3',
            precedence INTEGER NOT NULL DEFAULT 1,
            UNIQUE (name, iteration, season)
        )",
    ),
    (
        "players",
        "CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            display_name TEXT NOT NULL,
            user INTEGER NOT NULL REFERENCES users(id),
            season INTEGER NOT NULL REFERENCES seasons(id),
            tribe INTEGER DEFAULT NULL REFERENCES tribes(id),
            UNIQUE (user, season),
            UNIQUE (display_name, season)
        )",
    ),
];

/// Names of every table `setup` manages, in creation order.
pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}

/// Outcome of a `setup` pass.
#[derive(Debug, Default)]
pub struct SetupReport {
    pub ready: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

impl SetupReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create all tables if they don't exist.
///
/// Idempotent. Each table is created on its own so that a failure in one
/// is logged and does not stop the others.
pub fn setup(conn: &Connection) -> SetupReport {
    let mut report = SetupReport::default();
    for &(name, ddl) in TABLES {
        match conn.execute_batch(ddl) {
            Ok(()) => {
                log::debug!("{name} table setup completed");
                report.ready.push(name);
            }
            Err(e) => {
                log::error!("Error setting up {name} table: {e}");
                report.failed.push(name);
            }
        }
    }
    report
}

/// Run `setup` and fail if any table could not be created.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    let report = setup(conn);
    if report.is_complete() {
        Ok(())
    } else {
        Err(SchemaError::TableSetup(report.failed))
    }
}

/// Open or create a castaway database at the given path.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    log::debug!("Opened database at {}", path.display());
    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}
