//! Routes and their automatic reverse pairs.

use sqlx::{Connection, SqliteConnection};
use tracing::info;

use crate::domain::{NewRoute, Route};

use super::error::conflict_on_unique;
use super::rows::{ROUTE_COLUMNS, RouteRow};
use super::{Store, StoreError, Table, require};

impl Store {
    /// Create a route and, if missing, its reverse.
    ///
    /// Both writes share one transaction. The reverse side is
    /// insert-if-absent against the `(source_id, destination_id)` unique
    /// index: an existing reverse route keeps its own distance, and two
    /// racing callers cannot produce two reverse rows. Creating a forward
    /// route that already exists is a [`StoreError::Conflict`].
    pub async fn create_route(&self, new: &NewRoute) -> Result<Route, StoreError> {
        new.validate()?;

        let mut conn = self.pool.acquire().await?;
        require(&mut conn, Table::Stations, "source", new.source).await?;
        require(&mut conn, Table::Stations, "destination", new.destination).await?;

        let mut tx = Connection::begin(&mut *conn).await?;
        let id = sqlx::query(
            "INSERT INTO routes (source_id, destination_id, distance) VALUES (?, ?, ?)",
        )
        .bind(new.source)
        .bind(new.destination)
        .bind(new.distance)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            conflict_on_unique(e, || {
                format!(
                    "route from station {} to station {} already exists",
                    new.source, new.destination
                )
            })
        })?
        .last_insert_rowid();

        let reverse = new.reversed();
        let reverse_created = sqlx::query(
            "INSERT INTO routes (source_id, destination_id, distance) VALUES (?, ?, ?)
             ON CONFLICT (source_id, destination_id) DO NOTHING",
        )
        .bind(reverse.source)
        .bind(reverse.destination)
        .bind(reverse.distance)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;
        tx.commit().await?;

        info!(
            route_id = id,
            source = new.source,
            destination = new.destination,
            distance = new.distance,
            reverse_created,
            "route created"
        );
        fetch_route(&mut conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("route", id))
    }

    /// All routes with both stations, by id.
    pub async fn list_routes(&self) -> Result<Vec<Route>, StoreError> {
        let sql = format!("{} ORDER BY r.id", route_select());
        let rows = sqlx::query_as::<_, RouteRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Route::from).collect())
    }

    /// One route with both stations.
    pub async fn get_route(&self, id: i64) -> Result<Route, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_route(&mut conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("route", id))
    }
}

fn route_select() -> String {
    format!(
        "SELECT {ROUTE_COLUMNS}
         FROM routes r
         JOIN stations s ON s.id = r.source_id
         JOIN stations d ON d.id = r.destination_id"
    )
}

async fn fetch_route(conn: &mut SqliteConnection, id: i64) -> Result<Option<Route>, sqlx::Error> {
    let sql = format!("{} WHERE r.id = ?", route_select());
    let row = sqlx::query_as::<_, RouteRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Route::from))
}
