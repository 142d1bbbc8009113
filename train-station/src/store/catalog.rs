//! Stations, train types, trains and crews.
//!
//! Plain records with no derived state beyond what the joins provide.

use std::collections::HashMap;

use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};
use tracing::info;

use crate::domain::{
    Crew, NewCrew, NewStation, NewTrain, NewTrainType, Station, Train, TrainType, TripFilter,
    ValidationError, fold_case,
};

use super::rows::{CrewRow, TRAIN_COLUMNS, TrainRow};
use super::trips::{TripScope, fetch_trips};
use super::{Store, StoreError, Table, exists, require};

impl Store {
    /// Create a station.
    pub async fn create_station(&self, new: &NewStation) -> Result<Station, StoreError> {
        new.validate()?;

        let id = sqlx::query(
            "INSERT INTO stations (name, name_folded, latitude, longitude) VALUES (?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(fold_case(&new.name))
        .bind(new.latitude)
        .bind(new.longitude)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(station_id = id, name = %new.name, "station created");
        Ok(Station {
            id,
            name: new.name.clone(),
            latitude: new.latitude,
            longitude: new.longitude,
        })
    }

    /// All stations, by id.
    pub async fn list_stations(&self) -> Result<Vec<Station>, StoreError> {
        let stations = sqlx::query_as::<_, Station>(
            "SELECT id, name, latitude, longitude FROM stations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stations)
    }

    /// Create a train type.
    pub async fn create_train_type(&self, new: &NewTrainType) -> Result<TrainType, StoreError> {
        new.validate()?;

        let id = sqlx::query("INSERT INTO train_types (name) VALUES (?)")
            .bind(&new.name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!(train_type_id = id, name = %new.name, "train type created");
        Ok(TrainType {
            id,
            name: new.name.clone(),
        })
    }

    /// All train types, by id.
    pub async fn list_train_types(&self) -> Result<Vec<TrainType>, StoreError> {
        let types = sqlx::query_as::<_, TrainType>("SELECT id, name FROM train_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    /// Create a train of an existing type.
    pub async fn create_train(&self, new: &NewTrain) -> Result<Train, StoreError> {
        new.validate()?;

        let mut conn = self.pool.acquire().await?;
        require(&mut conn, Table::TrainTypes, "train_type", new.train_type).await?;

        let id = sqlx::query(
            "INSERT INTO trains (name, name_folded, cargo_num, places_in_cargo, train_type_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(fold_case(&new.name))
        .bind(new.cargo_num)
        .bind(new.places_in_cargo)
        .bind(new.train_type)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        info!(train_id = id, name = %new.name, "train created");
        fetch_train(&mut conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("train", id))
    }

    /// All trains with their type, by id.
    pub async fn list_trains(&self) -> Result<Vec<Train>, StoreError> {
        let sql = format!(
            "SELECT {TRAIN_COLUMNS}
             FROM trains tr
             JOIN train_types tt ON tt.id = tr.train_type_id
             ORDER BY tr.id"
        );
        let rows = sqlx::query_as::<_, TrainRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Train::from).collect())
    }

    /// Create a crew member assigned to the given trips.
    pub async fn create_crew(&self, new: &NewCrew) -> Result<Crew, StoreError> {
        new.validate()?;
        let trip_ids = new.distinct_trips();

        let mut conn = self.pool.acquire().await?;
        for (index, trip_id) in new.trips.iter().enumerate() {
            if !exists(&mut conn, Table::Trips, *trip_id).await? {
                return Err(ValidationError::field(
                    format!("trips[{index}]"),
                    format!("trip {trip_id} does not exist"),
                )
                .into());
            }
        }

        let mut tx = Connection::begin(&mut *conn).await?;
        let id = sqlx::query("INSERT INTO crews (first_name, last_name) VALUES (?, ?)")
            .bind(&new.first_name)
            .bind(&new.last_name)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for trip_id in &trip_ids {
            sqlx::query("INSERT INTO crew_trips (crew_id, trip_id) VALUES (?, ?)")
                .bind(id)
                .bind(trip_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(crew_id = id, trips = trip_ids.len(), "crew member created");
        fetch_crews(&mut conn, Some(id))
            .await?
            .pop()
            .ok_or_else(|| StoreError::not_found("crew", id))
    }

    /// All crew members with their trips, by id.
    pub async fn list_crews(&self) -> Result<Vec<Crew>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_crews(&mut conn, None).await?)
    }
}

/// Load one train with its type.
pub(crate) async fn fetch_train(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Train>, sqlx::Error> {
    let sql = format!(
        "SELECT {TRAIN_COLUMNS}
         FROM trains tr
         JOIN train_types tt ON tt.id = tr.train_type_id
         WHERE tr.id = ?"
    );
    let row = sqlx::query_as::<_, TrainRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Train::from))
}

/// Load crews (all, or one by id) together with their trips.
async fn fetch_crews(
    conn: &mut SqliteConnection,
    id: Option<i64>,
) -> Result<Vec<Crew>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT id, first_name, last_name FROM crews");
    if let Some(id) = id {
        query.push(" WHERE id = ").push_bind(id);
    }
    query.push(" ORDER BY id");
    let crews: Vec<CrewRow> = query.build_query_as().fetch_all(&mut *conn).await?;
    if crews.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT crew_id, trip_id FROM crew_trips");
    if let Some(id) = id {
        query.push(" WHERE crew_id = ").push_bind(id);
    }
    let links: Vec<(i64, i64)> = query.build_query_as().fetch_all(&mut *conn).await?;

    let trips = fetch_trips(conn, &TripFilter::default(), TripScope::Crews(id)).await?;

    let mut by_crew: HashMap<i64, Vec<i64>> = HashMap::new();
    for (crew_id, trip_id) in links {
        by_crew.entry(crew_id).or_default().push(trip_id);
    }

    Ok(crews
        .into_iter()
        .map(|row| {
            let assigned = by_crew.remove(&row.id).unwrap_or_default();
            Crew {
                id: row.id,
                first_name: row.first_name,
                last_name: row.last_name,
                // Keep the trip list's departure order.
                trips: trips
                    .iter()
                    .filter(|trip| assigned.contains(&trip.id))
                    .cloned()
                    .collect(),
            }
        })
        .collect())
}
