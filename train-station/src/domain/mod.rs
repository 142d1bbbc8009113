//! Domain types for the train station booking service.
//!
//! Stored entities (`Station`, `Route`, `Trip`, ...) are what the store
//! hands back. `New*` types are unvalidated client input; each has a
//! `validate` method that checks the rules that do not need storage.

mod crew;
mod error;
mod order;
mod route;
mod station;
pub mod time;
mod train;
mod trip;

pub use crew::{CREW_NAME_MAX, Crew, NewCrew};
pub use error::ValidationError;
pub use order::{
    Order, SeatSlot, Ticket, TicketRequest, check_ticket_batch, seat_taken, ticket_path,
};
pub use route::{NewRoute, Route};
pub use station::{NewStation, STATION_NAME_MAX, Station};
pub use time::{TimeError, format_trip_time, parse_date, parse_trip_time};
pub use train::{Capacity, LAYOUT_MAX, NewTrain, NewTrainType, TRAIN_NAME_MAX, Train, TrainType};
pub use trip::{NewTrip, Trip, TripFilter, TripFilterParams, fold_case};
