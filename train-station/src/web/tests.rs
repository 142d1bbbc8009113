//! Router tests, driven through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::{AppState, create_router};
use crate::identity::{Authenticator, Identity, StaticTokens};
use crate::store::Store;
use crate::store::fixtures::{at, new_trip, route_and_train, sample_trip};

const ADMIN: &str = "admin-token";
const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

async fn app() -> (Router, Store) {
    let store = Store::in_memory().await.unwrap();
    let tokens = StaticTokens::new()
        .with(ADMIN, Identity { user_id: 1, is_staff: true })
        .with(ALICE, Identity { user_id: 2, is_staff: false })
        .with(BOB, Identity { user_id: 3, is_staff: false });
    let state = AppState::new(store.clone(), Authenticator::Static(tokens));
    (create_router(state), store)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

#[tokio::test]
async fn health() {
    let (app, _) = app().await;
    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn anonymous_callers_are_unauthorized() {
    let (app, _) = app().await;
    for uri in ["/stations/", "/orders/", "/trips/", "/routes/1/"] {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["error"].is_string());
    }

    let (status, _) = get(&app, "/stations/", Some("unknown-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_ids_are_checked_after_authorization() {
    let (app, _) = app().await;
    for uri in ["/trips/abc/", "/routes/abc/", "/trips/abc"] {
        let (status, _) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
    let (status, _) = send(&app, Method::DELETE, "/trips/abc/", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, "/trips/abc/", Some(ALICE)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(body["field"], "id");
}

#[tokio::test]
async fn catalog_is_read_only_for_regular_users() {
    let (app, _) = app().await;
    let station = json!({"name": "Kyiv", "latitude": 50.45, "longitude": 30.52});

    let (status, _) = post(&app, "/stations/", Some(ALICE), station.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(&app, "/stations/", Some(ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = post(&app, "/stations/", Some(ADMIN), station).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Kyiv");

    let (_, body) = get(&app, "/stations", Some(ALICE)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_input_is_a_field_error() {
    let (app, _) = app().await;

    let (status, body) = post(
        &app,
        "/stations/",
        Some(ADMIN),
        json!({"name": "North Pole+", "latitude": 91.0, "longitude": 0.0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "latitude");

    let (status, body) = send(&app, Method::POST, "/stations/", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn route_creation_adds_reverse_route() {
    let (app, _) = app().await;
    let mut ids = Vec::new();
    for name in ["Kyiv", "Lviv"] {
        let (_, station) = post(
            &app,
            "/stations/",
            Some(ADMIN),
            json!({"name": name, "latitude": 49.8, "longitude": 24.0}),
        )
        .await;
        ids.push(station["id"].as_i64().unwrap());
    }

    let (status, created) = post(
        &app,
        "/routes/",
        Some(ADMIN),
        json!({"source": ids[0], "destination": ids[1], "distance": 540}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["source"], ids[0]);
    assert_eq!(created["destination"], ids[1]);

    let (_, routes) = get(&app, "/routes/", Some(ALICE)).await;
    let mut pairs: Vec<(String, String, i64)> = routes
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["source"].as_str().unwrap().to_string(),
                r["destination"].as_str().unwrap().to_string(),
                r["distance"].as_i64().unwrap(),
            )
        })
        .collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("Kyiv".to_string(), "Lviv".to_string(), 540),
            ("Lviv".to_string(), "Kyiv".to_string(), 540),
        ]
    );

    let uri = format!("/routes/{}/", created["id"]);
    let (status, detail) = get(&app, &uri, Some(ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["source"]["name"], "Kyiv");
    assert_eq!(detail["destination"]["latitude"], 49.8);

    let (status, body) = post(
        &app,
        "/routes/",
        Some(ADMIN),
        json!({"source": ids[0], "destination": ids[1], "distance": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, _) = get(&app, "/routes/999/", Some(ALICE)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trip_crud_and_filters() {
    let (app, store) = app().await;
    let (route, train) = route_and_train(&store, "Intercity", 2, 10).await;

    let (status, created) = post(
        &app,
        "/trips/",
        Some(ADMIN),
        json!({
            "route": route.id,
            "train": train.id,
            "departure_time": "2024-11-19 22:00",
            "arrival_time": "2024-11-20T07:30:00",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["route"], route.id);
    assert_eq!(created["tickets_available"], 20);
    assert_eq!(created["arrival_time"], "2024-11-20 07:30");
    let id = created["id"].as_i64().unwrap();

    let (_, listed) = get(&app, "/trips/?train=inter&departure=2024-11-19", Some(ALICE)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["route"], "Sample source to Sample destination");
    assert_eq!(listed[0]["train"], "Intercity (Sample type)");

    let (_, listed) = get(&app, "/trips/?arrival=2024-11-19", Some(ALICE)).await;
    assert_eq!(listed, json!([]));

    let (status, body) = get(&app, "/trips/?departure=19-11-2024", Some(ALICE)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "departure");

    let (status, detail) = get(&app, &format!("/trips/{id}"), Some(ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["route"]["source"]["name"], "Sample source");
    assert_eq!(detail["train"]["train_type"], "Sample type");
    assert_eq!(detail["tickets_available"], 20);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/trips/{id}/"),
        Some(ADMIN),
        Some(json!({
            "route": route.id,
            "train": train.id,
            "departure_time": "2024-11-21 08:00",
            "arrival_time": "2024-11-21 12:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["departure_time"], "2024-11-21 08:00");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/trips/{id}/"),
        Some(ADMIN),
        Some(json!({
            "route": route.id,
            "train": train.id,
            "departure_time": "2024-11-21 08:00",
            "arrival_time": "2024-11-21 07:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "arrival_time");

    let (status, _) = send(&app, Method::DELETE, &format!("/trips/{id}/"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &format!("/trips/{id}/"), Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/trips/{id}/"), Some(ALICE)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn orders_belong_to_their_caller() {
    let (app, store) = app().await;
    let (route, train) = route_and_train(&store, "Intercity", 2, 10).await;
    let trip = store
        .create_trip(&new_trip(route.id, train.id, at(2024, 11, 19, 22), at(2024, 11, 20, 7)))
        .await
        .unwrap();

    let (status, order) = post(
        &app,
        "/orders/",
        Some(ALICE),
        json!({"tickets": [
            {"trip": trip.id, "cargo": 2, "seat": 3},
            {"trip": trip.id, "cargo": 1, "seat": 4},
        ]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    let tickets = order["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 2);
    assert_eq!((tickets[0]["cargo"].clone(), tickets[0]["seat"].clone()), (json!(1), json!(4)));
    assert_eq!(tickets[0]["trip"]["train"]["name"], "Intercity");
    assert!(order["created_at"].is_string());

    let (_, detail) = get(&app, &format!("/trips/{}/", trip.id), Some(ALICE)).await;
    assert_eq!(detail["tickets_available"], 18);

    let (_, alice_orders) = get(&app, "/orders/", Some(ALICE)).await;
    assert_eq!(alice_orders.as_array().unwrap().len(), 1);
    assert_eq!(alice_orders[0]["id"], order["id"]);

    let (status, bob_orders) = get(&app, "/orders/", Some(BOB)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bob_orders, json!([]));
}

#[tokio::test]
async fn order_errors_name_the_ticket() {
    let (app, store) = app().await;
    let trip = sample_trip(&store).await;

    let (status, body) = post(
        &app,
        "/orders/",
        Some(BOB),
        json!({"tickets": [{"trip": trip.id, "cargo": 1, "seat": 2}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "tickets[0].seat");

    let (status, body) = post(&app, "/orders/", Some(BOB), json!({"tickets": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "tickets");

    let ticket = json!({"tickets": [{"trip": trip.id, "cargo": 1, "seat": 1}]});
    let (status, _) = post(&app, "/orders/", Some(ALICE), ticket.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = post(&app, "/orders/", Some(BOB), ticket).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "tickets[0]");

    let (_, bob_orders) = get(&app, "/orders/", Some(BOB)).await;
    assert_eq!(bob_orders, json!([]));

    let (status, _) = send(&app, Method::DELETE, &format!("/trips/{}/", trip.id), Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn crews_list_trip_names() {
    let (app, store) = app().await;
    let trip = sample_trip(&store).await;

    let (status, created) = post(
        &app,
        "/crews/",
        Some(ADMIN),
        json!({"first_name": "Ann", "last_name": "Lee", "trips": [trip.id]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["full_name"], "Ann Lee");
    assert_eq!(created["trips"][0]["id"], trip.id);

    let (_, crews) = get(&app, "/crews/", Some(ALICE)).await;
    assert_eq!(
        crews,
        json!([{
            "id": created["id"],
            "full_name": "Ann Lee",
            "trips": ["Sample source to Sample destination (Sample train (Sample type))"],
        }])
    );
}

#[tokio::test]
async fn train_catalog() {
    let (app, _) = app().await;
    let (status, train_type) = post(&app, "/train-types/", Some(ADMIN), json!({"name": "Express"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &app,
        "/trains/",
        Some(ADMIN),
        json!({"name": "Hyundai", "cargo_num": 0, "places_in_cargo": 40, "train_type": train_type["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "cargo_num");

    let (status, _) = post(
        &app,
        "/trains/",
        Some(ADMIN),
        json!({"name": "Hyundai", "cargo_num": 9, "places_in_cargo": 40, "train_type": train_type["id"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, trains) = get(&app, "/trains/", Some(BOB)).await;
    assert_eq!(
        trains,
        json!([{"id": 1, "name": "Hyundai", "cargo_num": 9, "places_in_cargo": 40, "train_type": "Express"}])
    );

    let (_, types) = get(&app, "/train-types", Some(BOB)).await;
    assert_eq!(types, json!([{"id": train_type["id"], "name": "Express"}]));
}
