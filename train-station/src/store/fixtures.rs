//! Shared sample data for store and web tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{NewRoute, NewStation, NewTrain, NewTrainType, NewTrip, Route, Station, Train, Trip};

use super::Store;

pub const USER_A: i64 = 1;
pub const USER_B: i64 = 2;

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn new_trip(route: i64, train: i64, departure: NaiveDateTime, arrival: NaiveDateTime) -> NewTrip {
    NewTrip {
        route,
        train,
        departure_time: departure,
        arrival_time: arrival,
    }
}

pub async fn station(store: &Store, name: &str) -> Station {
    store
        .create_station(&NewStation {
            name: name.to_string(),
            latitude: 1.0,
            longitude: 1.0,
        })
        .await
        .unwrap()
}

pub async fn route(store: &Store, source: i64, destination: i64) -> Route {
    store
        .create_route(&NewRoute {
            source,
            destination,
            distance: 10,
        })
        .await
        .unwrap()
}

pub async fn sample_route(store: &Store) -> Route {
    let source = station(store, "Sample source").await;
    let destination = station(store, "Sample destination").await;
    route(store, source.id, destination.id).await
}

pub async fn sample_train(store: &Store, name: &str, cargo_num: i64, places_in_cargo: i64) -> Train {
    let train_type = store
        .create_train_type(&NewTrainType {
            name: "Sample type".to_string(),
        })
        .await
        .unwrap();
    store
        .create_train(&NewTrain {
            name: name.to_string(),
            cargo_num,
            places_in_cargo,
            train_type: train_type.id,
        })
        .await
        .unwrap()
}

pub async fn route_and_train(
    store: &Store,
    train_name: &str,
    cargo_num: i64,
    places_in_cargo: i64,
) -> (Route, Train) {
    let route = sample_route(store).await;
    let train = sample_train(store, train_name, cargo_num, places_in_cargo).await;
    (route, train)
}

/// A trip on a one-seat train, 2024-11-19 22:00 → 2024-11-20 22:00.
pub async fn sample_trip(store: &Store) -> Trip {
    let (route, train) = route_and_train(store, "Sample train", 1, 1).await;
    store
        .create_trip(&new_trip(route.id, train.id, at(2024, 11, 19, 22), at(2024, 11, 20, 22)))
        .await
        .unwrap()
}
