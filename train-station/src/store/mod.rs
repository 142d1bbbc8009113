//! Persistent storage on SQLite via `sqlx`.
//!
//! The database is the arbiter of every cross-request invariant: unique
//! indexes on `routes (source_id, destination_id)` and
//! `tickets (trip_id, cargo, seat)` decide races, and multi-row writes run
//! in a single transaction. Application checks only produce friendlier
//! errors earlier.
//!
//! Public methods acquire one pooled connection and pass it down to the
//! helpers, so an operation never holds two connections at once.

mod catalog;
mod error;
mod orders;
mod routes;
mod rows;
mod trips;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::domain::ValidationError;

pub use error::StoreError;

/// Schema applied by [`Store::migrate`]. Every statement is idempotent.
const SCHEMA: &str = include_str!("../../schema.sql");

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the booking database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database at `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!(url, max_connections, "connected to database");
        Ok(Self { pool })
    }

    /// A private in-memory database with the schema applied.
    ///
    /// Uses a single connection that is never recycled, since each SQLite
    /// in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the schema.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("database schema is up to date");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Tables that can be checked with [`exists`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum Table {
    Stations,
    TrainTypes,
    Trains,
    Routes,
    Trips,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Stations => "stations",
            Table::TrainTypes => "train_types",
            Table::Trains => "trains",
            Table::Routes => "routes",
            Table::Trips => "trips",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Table::Stations => "station",
            Table::TrainTypes => "train type",
            Table::Trains => "train",
            Table::Routes => "route",
            Table::Trips => "trip",
        }
    }
}

/// Whether a row with the given id exists.
pub(crate) async fn exists(
    conn: &mut SqliteConnection,
    table: Table,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = ?)", table.name());
    let found: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(conn).await?;
    Ok(found != 0)
}

/// Fail with a field error if a referenced row is missing.
pub(crate) async fn require(
    conn: &mut SqliteConnection,
    table: Table,
    field: &str,
    id: i64,
) -> Result<(), StoreError> {
    if exists(conn, table, id).await? {
        Ok(())
    } else {
        Err(ValidationError::field(field, format!("{} {id} does not exist", table.entity())).into())
    }
}

#[cfg(test)]
pub(crate) mod fixtures;
