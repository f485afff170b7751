// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Opening and configuring `SQLite` connections.

use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Booking schema, compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a writer waits on a locked file database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Where the database lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// A shared-cache in-memory database, gone when the last connection closes.
    Memory,
    /// A database file on disk.
    File,
}

#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Opens `database_url`, applies the connection pragmas for `mode`, runs
/// pending migrations and checks that foreign keys are enforced.
///
/// # Errors
///
/// Returns an error if the connection cannot be established, a pragma or
/// migration fails, or foreign keys end up disabled.
pub fn open(database_url: &str, mode: StorageMode) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, ?mode, "Opening booking database");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)?;
    configure(&mut conn, mode)?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    info!(count = applied.len(), "Booking schema is current");

    verify_foreign_key_enforcement(&mut conn)?;
    Ok(conn)
}

fn configure(conn: &mut SqliteConnection, mode: StorageMode) -> Result<(), PersistenceError> {
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(conn)?;
    if mode == StorageMode::File {
        diesel::sql_query("PRAGMA journal_mode = WAL").execute(conn)?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}")).execute(conn)?;
    }
    Ok(())
}

/// Checks that `SQLite` is enforcing the history-to-booking foreign key.
///
/// # Errors
///
/// Returns `ForeignKeyEnforcementNotEnabled` if enforcement is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let pragma: ForeignKeysPragma = diesel::sql_query("PRAGMA foreign_keys").get_result(conn)?;
    if pragma.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    debug!("Foreign key enforcement confirmed");
    Ok(())
}
