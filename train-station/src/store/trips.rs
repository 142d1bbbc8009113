//! Trips and seat availability.
//!
//! `tickets_available` is always an SQL aggregate: train capacity minus
//! `COUNT` of the trip's tickets, grouped per trip. Tickets are never
//! loaded to compute it.

use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};
use tracing::info;

use crate::domain::time::DATE_FORMAT;
use crate::domain::{NewTrip, Trip, TripFilter, ValidationError, fold_case};

use super::error::is_foreign_key_violation;
use super::orders::OrderScope;
use super::rows::{ROUTE_COLUMNS, TRAIN_COLUMNS, TripRow};
use super::{Store, StoreError, Table, require};

impl Store {
    /// Trips matching every predicate of `filter`, by departure time.
    pub async fn list_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_trips(&mut conn, filter, TripScope::All).await?)
    }

    /// One trip with route, train and availability.
    pub async fn get_trip(&self, id: i64) -> Result<Trip, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_trip(&mut conn, id).await
    }

    /// Schedule a trip.
    pub async fn create_trip(&self, new: &NewTrip) -> Result<Trip, StoreError> {
        new.validate()?;

        let mut conn = self.pool.acquire().await?;
        require(&mut conn, Table::Routes, "route", new.route).await?;
        require(&mut conn, Table::Trains, "train", new.train).await?;

        let id = sqlx::query(
            "INSERT INTO trips (route_id, train_id, departure_time, arrival_time)
             VALUES (?, ?, ?, ?)",
        )
        .bind(new.route)
        .bind(new.train)
        .bind(new.departure_time)
        .bind(new.arrival_time)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        info!(trip_id = id, route_id = new.route, train_id = new.train, "trip created");
        fetch_trip(&mut conn, id).await
    }

    /// Replace a trip's route, train and times.
    ///
    /// Switching to a smaller train is refused while issued tickets would
    /// fall outside its seating layout.
    pub async fn update_trip(&self, id: i64, new: &NewTrip) -> Result<Trip, StoreError> {
        new.validate()?;

        let mut conn = self.pool.acquire().await?;
        require(&mut conn, Table::Routes, "route", new.route).await?;
        require(&mut conn, Table::Trains, "train", new.train).await?;

        let mut tx = Connection::begin(&mut *conn).await?;
        let updated = sqlx::query(
            "UPDATE trips
             SET route_id = ?, train_id = ?, departure_time = ?, arrival_time = ?
             WHERE id = ?",
        )
        .bind(new.route)
        .bind(new.train)
        .bind(new.departure_time)
        .bind(new.arrival_time)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(StoreError::not_found("trip", id));
        }

        let stranded: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)
             FROM tickets tk
             JOIN trips t ON t.id = tk.trip_id
             JOIN trains tr ON tr.id = t.train_id
             WHERE tk.trip_id = ?
               AND (tk.cargo > tr.cargo_num OR tk.seat > tr.places_in_cargo)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if stranded > 0 {
            return Err(ValidationError::field(
                "train",
                format!("{stranded} issued ticket(s) do not fit train {}", new.train),
            )
            .into());
        }
        tx.commit().await?;

        info!(trip_id = id, "trip updated");
        fetch_trip(&mut conn, id).await
    }

    /// Remove a trip that has no tickets.
    pub async fn delete_trip(&self, id: i64) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM trips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::Conflict(format!("trip {id} has tickets and cannot be deleted"))
                } else {
                    StoreError::Database(e)
                }
            })?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::not_found("trip", id));
        }
        info!(trip_id = id, "trip deleted");
        Ok(())
    }
}

/// Load one trip or fail with `NotFound`.
pub(crate) async fn fetch_trip(conn: &mut SqliteConnection, id: i64) -> Result<Trip, StoreError> {
    fetch_trips(conn, &TripFilter::default(), TripScope::Id(id))
        .await?
        .pop()
        .ok_or_else(|| StoreError::not_found("trip", id))
}

/// Which trips [`fetch_trips`] may return.
///
/// Restrictions are subqueries, so the bind count stays fixed however many
/// crews or orders are involved.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TripScope {
    All,
    Id(i64),
    /// Trips assigned to one crew member, or to any.
    Crews(Option<i64>),
    /// Trips booked by the tickets of the scoped orders.
    Orders(OrderScope),
}

/// Load trips matching `filter` within `scope`.
///
/// Each present filter field adds one `AND` predicate. Grouping by trip id
/// both computes the ticket count and guarantees each trip appears once.
pub(crate) async fn fetch_trips(
    conn: &mut SqliteConnection,
    filter: &TripFilter,
    scope: TripScope,
) -> Result<Vec<Trip>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT t.id, t.departure_time, t.arrival_time,
                tr.cargo_num * tr.places_in_cargo - COUNT(tk.id) AS tickets_available,
                {ROUTE_COLUMNS},
                {TRAIN_COLUMNS}
         FROM trips t
         JOIN routes r ON r.id = t.route_id
         JOIN stations s ON s.id = r.source_id
         JOIN stations d ON d.id = r.destination_id
         JOIN trains tr ON tr.id = t.train_id
         JOIN train_types tt ON tt.id = tr.train_type_id
         LEFT JOIN tickets tk ON tk.trip_id = t.id
         WHERE 1=1"
    ));

    if let Some(train) = &filter.train {
        query
            .push(" AND instr(tr.name_folded, ")
            .push_bind(fold_case(train))
            .push(") > 0");
    }
    if let Some(source) = &filter.source {
        query
            .push(" AND instr(s.name_folded, ")
            .push_bind(fold_case(source))
            .push(") > 0");
    }
    if let Some(destination) = &filter.destination {
        query
            .push(" AND instr(d.name_folded, ")
            .push_bind(fold_case(destination))
            .push(") > 0");
    }
    if let Some(date) = filter.departure {
        query
            .push(" AND date(t.departure_time) = ")
            .push_bind(date.format(DATE_FORMAT).to_string());
    }
    if let Some(date) = filter.arrival {
        query
            .push(" AND date(t.arrival_time) = ")
            .push_bind(date.format(DATE_FORMAT).to_string());
    }
    match scope {
        TripScope::All => {}
        TripScope::Id(id) => {
            query.push(" AND t.id = ").push_bind(id);
        }
        TripScope::Crews(None) => {
            query.push(" AND t.id IN (SELECT trip_id FROM crew_trips)");
        }
        TripScope::Crews(Some(crew_id)) => {
            query
                .push(" AND t.id IN (SELECT trip_id FROM crew_trips WHERE crew_id = ")
                .push_bind(crew_id)
                .push(")");
        }
        TripScope::Orders(orders) => {
            query.push(" AND t.id IN (SELECT trip_id FROM tickets WHERE ");
            orders.push_predicate(&mut query, "order_id");
            query.push(")");
        }
    }

    query.push(" GROUP BY t.id ORDER BY t.departure_time, t.id");

    let rows: Vec<TripRow> = query.build_query_as().fetch_all(conn).await?;
    Ok(rows.into_iter().map(Trip::from).collect())
}
