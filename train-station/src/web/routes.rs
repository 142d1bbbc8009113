//! HTTP route handlers.
//!
//! Path and query input is parsed only after `authorize`, so an anonymous
//! caller sees 401 even when the id is malformed.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::access::{AccessError, Action, Resource, authorize};
use crate::domain::{
    NewCrew, NewRoute, NewStation, NewTrain, NewTrainType, NewTrip, TripFilter, TripFilterParams,
    ValidationError,
};
use crate::identity::{Caller, IdentityError};
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// Every resource path answers with and without a trailing slash.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new().route("/health", get(health));
    [
        ("/stations", get(list_stations).post(create_station)),
        ("/train-types", get(list_train_types).post(create_train_type)),
        ("/trains", get(list_trains).post(create_train)),
        ("/crews", get(list_crews).post(create_crew)),
        ("/routes", get(list_routes).post(create_route)),
        ("/routes/:id", get(get_route)),
        ("/trips", get(list_trips).post(create_trip)),
        (
            "/trips/:id",
            get(get_trip).put(update_trip).delete(delete_trip),
        ),
        ("/orders", get(list_orders).post(create_order)),
    ]
    .into_iter()
    .fold(router, |router, (path, handler)| with_slash(router, path, handler))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn with_slash(
    router: Router<AppState>,
    path: &str,
    handler: MethodRouter<AppState>,
) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse a JSON body, logging the raw body on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(body = %String::from_utf8_lossy(body), "JSON parse error: {e}");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
            field: None,
        }
    })
}

fn created<T: serde::Serialize>(view: T) -> Response {
    (StatusCode::CREATED, Json(view)).into_response()
}

async fn list_stations(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<StationView>>, AppError> {
    authorize(Resource::Station, Action::List, &caller)?;
    let stations = state.store.list_stations().await?;
    Ok(Json(stations.iter().map(StationView::from_station).collect()))
}

async fn create_station(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(Resource::Station, Action::Create, &caller)?;
    let new: NewStation = parse_body(&body)?;
    let station = state.store.create_station(&new).await?;
    Ok(created(StationView::from_station(&station)))
}

async fn list_train_types(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<TrainTypeView>>, AppError> {
    authorize(Resource::TrainType, Action::List, &caller)?;
    let types = state.store.list_train_types().await?;
    Ok(Json(types.iter().map(TrainTypeView::from_train_type).collect()))
}

async fn create_train_type(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(Resource::TrainType, Action::Create, &caller)?;
    let new: NewTrainType = parse_body(&body)?;
    let train_type = state.store.create_train_type(&new).await?;
    Ok(created(TrainTypeView::from_train_type(&train_type)))
}

async fn list_trains(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<TrainView>>, AppError> {
    authorize(Resource::Train, Action::List, &caller)?;
    let trains = state.store.list_trains().await?;
    Ok(Json(trains.iter().map(TrainView::from_train).collect()))
}

async fn create_train(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(Resource::Train, Action::Create, &caller)?;
    let new: NewTrain = parse_body(&body)?;
    let train = state.store.create_train(&new).await?;
    Ok(created(TrainView::from_train(&train)))
}

async fn list_crews(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CrewView>>, AppError> {
    authorize(Resource::Crew, Action::List, &caller)?;
    let crews = state.store.list_crews().await?;
    Ok(Json(
        crews
            .iter()
            .map(|c| CrewView::from_crew(c, ViewMode::Compact))
            .collect(),
    ))
}

async fn create_crew(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(Resource::Crew, Action::Create, &caller)?;
    let new: NewCrew = parse_body(&body)?;
    let crew = state.store.create_crew(&new).await?;
    Ok(created(CrewView::from_crew(&crew, ViewMode::Detail)))
}

async fn list_routes(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<RouteView>>, AppError> {
    authorize(Resource::Route, Action::List, &caller)?;
    let routes = state.store.list_routes().await?;
    Ok(Json(
        routes
            .iter()
            .map(|r| RouteView::from_route(r, ViewMode::Compact))
            .collect(),
    ))
}

async fn get_route(
    caller: Caller,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<RouteView>, AppError> {
    authorize(Resource::Route, Action::Retrieve, &caller)?;
    let Path(id) = path?;
    let route = state.store.get_route(id).await?;
    Ok(Json(RouteView::from_route(&route, ViewMode::Detail)))
}

/// Create a route; the reverse route is created alongside if missing.
async fn create_route(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(Resource::Route, Action::Create, &caller)?;
    let new: NewRoute = parse_body(&body)?;
    let route = state.store.create_route(&new).await?;
    Ok(created(RouteView::written(&route)))
}

/// List trips, narrowed by any of `train`, `source`, `destination`,
/// `departure` and `arrival`.
async fn list_trips(
    caller: Caller,
    State(state): State<AppState>,
    query: Result<Query<TripFilterParams>, QueryRejection>,
) -> Result<Json<Vec<TripView>>, AppError> {
    authorize(Resource::Trip, Action::List, &caller)?;
    let Query(params) = query?;
    let filter = TripFilter::try_from(params)?;
    let trips = state.store.list_trips(&filter).await?;
    Ok(Json(
        trips
            .iter()
            .map(|t| TripView::from_trip(t, ViewMode::Compact))
            .collect(),
    ))
}

async fn get_trip(
    caller: Caller,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TripView>, AppError> {
    authorize(Resource::Trip, Action::Retrieve, &caller)?;
    let Path(id) = path?;
    let trip = state.store.get_trip(id).await?;
    Ok(Json(TripView::from_trip(&trip, ViewMode::Detail)))
}

async fn create_trip(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(Resource::Trip, Action::Create, &caller)?;
    let new: NewTrip = parse_body(&body)?;
    let trip = state.store.create_trip(&new).await?;
    Ok(created(TripView::written(&trip)))
}

async fn update_trip(
    caller: Caller,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<TripView>, AppError> {
    authorize(Resource::Trip, Action::Update, &caller)?;
    let Path(id) = path?;
    let new: NewTrip = parse_body(&body)?;
    let trip = state.store.update_trip(id, &new).await?;
    Ok(Json(TripView::written(&trip)))
}

async fn delete_trip(
    caller: Caller,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    authorize(Resource::Trip, Action::Delete, &caller)?;
    let Path(id) = path?;
    state.store.delete_trip(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own orders, oldest first.
async fn list_orders(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let identity = authorize(Resource::Order, Action::List, &caller)?;
    let orders = state.store.list_orders(identity.user_id).await?;
    Ok(Json(orders.iter().map(OrderView::from_order).collect()))
}

/// Place an order for the caller. The owner always comes from the token.
async fn create_order(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> Result<Response, AppError> {
    let identity = authorize(Resource::Order, Action::Create, &caller)?;
    let req: CreateOrderRequest = parse_body(&body)?;
    let order = state
        .store
        .create_order(identity.user_id, &req.tickets)
        .await?;
    Ok(created(OrderView::from_order(&order)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        field: Option<String>,
    },
    Unauthorized { message: String },
    Forbidden { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::BadRequest {
            message: e.message,
            field: e.field,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
            field: Some("id".to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
            field: None,
        }
    }
}

impl From<AccessError> for AppError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Unauthenticated => AppError::Unauthorized {
                message: e.to_string(),
            },
            AccessError::Forbidden => AppError::Forbidden {
                message: e.to_string(),
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => v.into(),
            StoreError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            StoreError::Conflict(message) => AppError::Conflict { message },
            StoreError::Database(db) => {
                error!("database error: {db}");
                AppError::Internal {
                    message: "database error".to_string(),
                }
            }
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        error!("identity provider error: {e}");
        AppError::Internal {
            message: "identity provider unavailable".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, field) = match self {
            AppError::BadRequest { message, field } => (StatusCode::BAD_REQUEST, message, field),
            AppError::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message, None),
            AppError::Forbidden { message } => (StatusCode::FORBIDDEN, message, None),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, None),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message, None),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message, None),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, field = field.as_deref(), "{message}");
        }

        let body = Json(ErrorResponse {
            error: message,
            field,
        });
        (status, body).into_response()
    }
}
