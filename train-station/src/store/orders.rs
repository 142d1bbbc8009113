//! Orders: atomic multi-ticket booking.
//!
//! `create_order` runs in one transaction whose first statement is the
//! order insert, so the connection holds SQLite's write lock before any
//! ticket is checked. Seat checks inside the transaction therefore see
//! every committed ticket; the `(trip_id, cargo, seat)` unique index stays
//! the final word and surfaces as [`StoreError::Conflict`]. Any failure
//! drops the transaction, rolling back the order and all of its tickets.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};
use tracing::info;

use crate::domain::{
    Capacity, Order, Ticket, TicketRequest, TripFilter, ValidationError, check_ticket_batch,
    seat_taken, ticket_path,
};

use super::error::{is_foreign_key_violation, is_unique_violation};
use super::rows::{OrderRow, TicketRow};
use super::trips::{TripScope, fetch_trips};
use super::{Store, StoreError};

/// Which orders to load.
#[derive(Debug, Clone, Copy)]
pub(crate) enum OrderScope {
    Id(i64),
    User(i64),
}

impl OrderScope {
    /// Restrict `column`, which holds an order id, to this scope.
    pub(crate) fn push_predicate(self, query: &mut QueryBuilder<'_, Sqlite>, column: &str) {
        match self {
            OrderScope::Id(id) => {
                query.push(format!("{column} = ")).push_bind(id);
            }
            OrderScope::User(user_id) => {
                query
                    .push(format!("{column} IN (SELECT id FROM orders WHERE user_id = "))
                    .push_bind(user_id)
                    .push(")");
            }
        }
    }
}

impl Store {
    /// Book all `tickets` for `user_id` as one order, or nothing at all.
    pub async fn create_order(
        &self,
        user_id: i64,
        tickets: &[TicketRequest],
    ) -> Result<Order, StoreError> {
        check_ticket_batch(tickets)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = Connection::begin(&mut *conn).await?;

        let order_id = sqlx::query("INSERT INTO orders (user_id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let mut capacities: HashMap<i64, Capacity> = HashMap::new();
        for (index, ticket) in tickets.iter().enumerate() {
            let capacity = match capacities.get(&ticket.trip) {
                Some(capacity) => *capacity,
                None => {
                    let capacity = trip_capacity(&mut tx, ticket.trip).await?.ok_or_else(|| {
                        ValidationError::field(
                            "trip",
                            format!("trip {} does not exist", ticket.trip),
                        )
                        .within(&ticket_path(index))
                    })?;
                    capacities.insert(ticket.trip, capacity);
                    capacity
                }
            };
            capacity
                .check(ticket.cargo, ticket.seat)
                .map_err(|e| e.within(&ticket_path(index)))?;
        }

        for (index, ticket) in tickets.iter().enumerate() {
            let taken: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM tickets WHERE trip_id = ? AND cargo = ? AND seat = ?",
            )
            .bind(ticket.trip)
            .bind(ticket.cargo)
            .bind(ticket.seat)
            .fetch_optional(&mut *tx)
            .await?;
            if taken.is_some() {
                return Err(seat_taken(index, ticket.slot()).into());
            }

            sqlx::query("INSERT INTO tickets (cargo, seat, trip_id, order_id) VALUES (?, ?, ?, ?)")
                .bind(ticket.cargo)
                .bind(ticket.seat)
                .bind(ticket.trip)
                .bind(order_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| ticket_insert_error(e, index, ticket))?;
        }
        tx.commit().await?;

        info!(order_id, user_id, tickets = tickets.len(), "order created");
        fetch_orders(&mut conn, OrderScope::Id(order_id))
            .await?
            .pop()
            .ok_or_else(|| StoreError::not_found("order", order_id))
    }

    /// Orders placed by `user_id`, oldest first.
    pub async fn list_orders(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_orders(&mut conn, OrderScope::User(user_id)).await?)
    }
}

async fn trip_capacity(
    conn: &mut SqliteConnection,
    trip_id: i64,
) -> Result<Option<Capacity>, sqlx::Error> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT tr.cargo_num, tr.places_in_cargo
         FROM trips t
         JOIN trains tr ON tr.id = t.train_id
         WHERE t.id = ?",
    )
    .bind(trip_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|(cargo_num, places_in_cargo)| Capacity {
        cargo_num,
        places_in_cargo,
    }))
}

fn ticket_insert_error(err: sqlx::Error, index: usize, ticket: &TicketRequest) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(format!("seat already taken ({})", ticket.slot()))
    } else if is_foreign_key_violation(&err) {
        ValidationError::field("trip", format!("trip {} does not exist", ticket.trip))
            .within(&ticket_path(index))
            .into()
    } else {
        StoreError::Database(err)
    }
}

async fn fetch_orders(
    conn: &mut SqliteConnection,
    scope: OrderScope,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut query =
        QueryBuilder::<Sqlite>::new("SELECT id, user_id, created_at FROM orders WHERE ");
    match scope {
        OrderScope::Id(id) => query.push("id = ").push_bind(id),
        OrderScope::User(user_id) => query.push("user_id = ").push_bind(user_id),
    };
    query.push(" ORDER BY created_at, id");
    let orders: Vec<OrderRow> = query.build_query_as().fetch_all(&mut *conn).await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        QueryBuilder::<Sqlite>::new("SELECT id, cargo, seat, trip_id, order_id FROM tickets WHERE ");
    scope.push_predicate(&mut query, "order_id");
    query.push(" ORDER BY cargo, seat, id");
    let tickets: Vec<TicketRow> = query.build_query_as().fetch_all(&mut *conn).await?;

    let trips: HashMap<i64, _> = fetch_trips(conn, &TripFilter::default(), TripScope::Orders(scope))
        .await?
        .into_iter()
        .map(|trip| (trip.id, trip))
        .collect();

    let mut by_order: HashMap<i64, Vec<Ticket>> = HashMap::new();
    for row in tickets {
        let trip = trips.get(&row.trip_id).cloned().ok_or(sqlx::Error::RowNotFound)?;
        by_order.entry(row.order_id).or_default().push(Ticket {
            id: row.id,
            cargo: row.cargo,
            seat: row.seat,
            trip,
        });
    }

    Ok(orders
        .into_iter()
        .map(|row| Order {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
            tickets: by_order.remove(&row.id).unwrap_or_default(),
        })
        .collect())
}
