//! Data transfer objects for web requests and responses.
//!
//! Responses are shaped by pure `from_*` functions. List endpoints use the
//! compact view, where related entities collapse to a name or display
//! string; single-entity endpoints use the detail view with related
//! entities nested in full.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::time::trip_time;
use crate::domain::{Crew, Order, Route, Station, Ticket, TicketRequest, Train, TrainType, Trip};

/// How much of the related entities a response carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Compact,
    Detail,
}

/// A reference to another entity, in whichever form the view calls for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Related<T> {
    Id(i64),
    Name(String),
    Nested(T),
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Request to place an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub tickets: Vec<TicketRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationView {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            latitude: station.latitude,
            longitude: station.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainTypeView {
    pub id: i64,
    pub name: String,
}

impl TrainTypeView {
    pub fn from_train_type(train_type: &TrainType) -> Self {
        Self {
            id: train_type.id,
            name: train_type.name.clone(),
        }
    }
}

/// A train; the type is always given by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainView {
    pub id: i64,
    pub name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    pub train_type: String,
}

impl TrainView {
    pub fn from_train(train: &Train) -> Self {
        Self {
            id: train.id,
            name: train.name.clone(),
            cargo_num: train.cargo_num,
            places_in_cargo: train.places_in_cargo,
            train_type: train.train_type.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    pub id: i64,
    pub source: Related<StationView>,
    pub destination: Related<StationView>,
    pub distance: i64,
}

impl RouteView {
    /// Compact: station names. Detail: full stations.
    pub fn from_route(route: &Route, mode: ViewMode) -> Self {
        let station = |s: &Station| match mode {
            ViewMode::Compact => Related::Name(s.name.clone()),
            ViewMode::Detail => Related::Nested(StationView::from_station(s)),
        };
        Self {
            id: route.id,
            source: station(&route.source),
            destination: station(&route.destination),
            distance: route.distance,
        }
    }

    /// Echo of a write: station ids.
    pub fn written(route: &Route) -> Self {
        Self {
            id: route.id,
            source: Related::Id(route.source.id),
            destination: Related::Id(route.destination.id),
            distance: route.distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripView {
    pub id: i64,
    pub route: Related<RouteView>,
    pub train: Related<TrainView>,
    #[serde(with = "trip_time")]
    pub departure_time: NaiveDateTime,
    #[serde(with = "trip_time")]
    pub arrival_time: NaiveDateTime,
    pub tickets_available: i64,
}

impl TripView {
    /// Compact: route and train display strings. Detail: the route with
    /// full stations and the train with its type name.
    pub fn from_trip(trip: &Trip, mode: ViewMode) -> Self {
        let (route, train) = match mode {
            ViewMode::Compact => (
                Related::Name(trip.route.to_string()),
                Related::Name(trip.train.to_string()),
            ),
            ViewMode::Detail => (
                Related::Nested(RouteView::from_route(&trip.route, ViewMode::Detail)),
                Related::Nested(TrainView::from_train(&trip.train)),
            ),
        };
        Self::with_related(trip, route, train)
    }

    /// Echo of a write: route and train ids.
    pub fn written(trip: &Trip) -> Self {
        Self::with_related(trip, Related::Id(trip.route.id), Related::Id(trip.train.id))
    }

    fn with_related(trip: &Trip, route: Related<RouteView>, train: Related<TrainView>) -> Self {
        Self {
            id: trip.id,
            route,
            train,
            departure_time: trip.departure_time,
            arrival_time: trip.arrival_time,
            tickets_available: trip.tickets_available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewView {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub full_name: String,
    pub trips: Vec<Related<TripView>>,
}

impl CrewView {
    /// Compact: full name and trip display strings. Detail: both name
    /// parts and the trips as written.
    pub fn from_crew(crew: &Crew, mode: ViewMode) -> Self {
        match mode {
            ViewMode::Compact => Self {
                id: crew.id,
                first_name: None,
                last_name: None,
                full_name: crew.full_name(),
                trips: crew
                    .trips
                    .iter()
                    .map(|t| Related::Name(t.to_string()))
                    .collect(),
            },
            ViewMode::Detail => Self {
                id: crew.id,
                first_name: Some(crew.first_name.clone()),
                last_name: Some(crew.last_name.clone()),
                full_name: crew.full_name(),
                trips: crew
                    .trips
                    .iter()
                    .map(|t| Related::Nested(TripView::written(t)))
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketView {
    pub id: i64,
    pub cargo: i64,
    pub seat: i64,
    pub trip: TripView,
}

impl TicketView {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            cargo: ticket.cargo,
            seat: ticket.seat,
            trip: TripView::from_trip(&ticket.trip, ViewMode::Detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<TicketView>,
}

impl OrderView {
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            tickets: order.tickets.iter().map(TicketView::from_ticket).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn station(id: i64, name: &str) -> Station {
        Station {
            id,
            name: name.into(),
            latitude: 50.5,
            longitude: 30.25,
        }
    }

    fn trip() -> Trip {
        let at = |d, h| {
            NaiveDate::from_ymd_opt(2024, 11, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        };
        Trip {
            id: 3,
            route: Route {
                id: 2,
                source: station(1, "Kyiv"),
                destination: station(4, "Lviv"),
                distance: 540,
            },
            train: Train {
                id: 5,
                name: "Intercity 1".into(),
                cargo_num: 2,
                places_in_cargo: 10,
                train_type: TrainType {
                    id: 6,
                    name: "Express".into(),
                },
            },
            departure_time: at(19, 22),
            arrival_time: at(20, 7),
            tickets_available: 19,
        }
    }

    #[test]
    fn compact_trip_uses_display_strings() {
        let view = TripView::from_trip(&trip(), ViewMode::Compact);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": 3,
                "route": "Kyiv to Lviv",
                "train": "Intercity 1 (Express)",
                "departure_time": "2024-11-19 22:00",
                "arrival_time": "2024-11-20 07:00",
                "tickets_available": 19,
            })
        );
    }

    #[test]
    fn detail_trip_nests_route_and_train() {
        let value = serde_json::to_value(TripView::from_trip(&trip(), ViewMode::Detail)).unwrap();
        assert_eq!(
            value["route"]["source"],
            json!({"id": 1, "name": "Kyiv", "latitude": 50.5, "longitude": 30.25})
        );
        assert_eq!(value["route"]["distance"], 540);
        assert_eq!(value["train"]["train_type"], "Express");
        assert_eq!(value["tickets_available"], 19);
    }

    #[test]
    fn written_trip_echoes_ids() {
        let value = serde_json::to_value(TripView::written(&trip())).unwrap();
        assert_eq!(value["route"], 2);
        assert_eq!(value["train"], 5);
    }

    #[test]
    fn route_views() {
        let route = trip().route;
        let compact = serde_json::to_value(RouteView::from_route(&route, ViewMode::Compact)).unwrap();
        assert_eq!(
            compact,
            json!({"id": 2, "source": "Kyiv", "destination": "Lviv", "distance": 540})
        );

        let written = serde_json::to_value(RouteView::written(&route)).unwrap();
        assert_eq!(
            written,
            json!({"id": 2, "source": 1, "destination": 4, "distance": 540})
        );
    }

    #[test]
    fn crew_views() {
        let crew = Crew {
            id: 8,
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            trips: vec![trip()],
        };

        let compact = serde_json::to_value(CrewView::from_crew(&crew, ViewMode::Compact)).unwrap();
        assert_eq!(
            compact,
            json!({
                "id": 8,
                "full_name": "Ann Lee",
                "trips": ["Kyiv to Lviv (Intercity 1 (Express))"],
            })
        );

        let detail = serde_json::to_value(CrewView::from_crew(&crew, ViewMode::Detail)).unwrap();
        assert_eq!(detail["first_name"], "Ann");
        assert_eq!(detail["last_name"], "Lee");
        assert_eq!(detail["trips"][0]["route"], 2);
    }

    #[test]
    fn error_response_omits_missing_field() {
        let body = ErrorResponse {
            error: "not found".into(),
            field: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error": "not found"})
        );
    }
}
