//! Flat row shapes returned by joined queries, and their conversion into
//! nested domain types.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::{Route, Station, Train, TrainType, Trip};

/// Columns selected for a train joined with its type.
pub(crate) const TRAIN_COLUMNS: &str = "tr.id AS train_id, tr.name AS train_name, \
     tr.cargo_num, tr.places_in_cargo, \
     tt.id AS train_type_id, tt.name AS train_type_name";

/// Columns selected for a route joined with both stations.
pub(crate) const ROUTE_COLUMNS: &str = "r.id AS route_id, r.distance, \
     s.id AS source_id, s.name AS source_name, \
     s.latitude AS source_latitude, s.longitude AS source_longitude, \
     d.id AS destination_id, d.name AS destination_name, \
     d.latitude AS destination_latitude, d.longitude AS destination_longitude";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TrainRow {
    pub train_id: i64,
    pub train_name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    pub train_type_id: i64,
    pub train_type_name: String,
}

impl From<TrainRow> for Train {
    fn from(row: TrainRow) -> Self {
        Train {
            id: row.train_id,
            name: row.train_name,
            cargo_num: row.cargo_num,
            places_in_cargo: row.places_in_cargo,
            train_type: TrainType {
                id: row.train_type_id,
                name: row.train_type_name,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RouteRow {
    pub route_id: i64,
    pub distance: i64,
    pub source_id: i64,
    pub source_name: String,
    pub source_latitude: f64,
    pub source_longitude: f64,
    pub destination_id: i64,
    pub destination_name: String,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.route_id,
            source: Station {
                id: row.source_id,
                name: row.source_name,
                latitude: row.source_latitude,
                longitude: row.source_longitude,
            },
            destination: Station {
                id: row.destination_id,
                name: row.destination_name,
                latitude: row.destination_latitude,
                longitude: row.destination_longitude,
            },
            distance: row.distance,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TripRow {
    pub id: i64,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub tickets_available: i64,
    #[sqlx(flatten)]
    pub route: RouteRow,
    #[sqlx(flatten)]
    pub train: TrainRow,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            route: row.route.into(),
            train: row.train.into(),
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            tickets_available: row.tickets_available,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TicketRow {
    pub id: i64,
    pub cargo: i64,
    pub seat: i64,
    pub trip_id: i64,
    pub order_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CrewRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}
