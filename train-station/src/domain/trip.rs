//! Trips and the trip search filter.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::error::ValidationError;
use super::route::Route;
use super::time::{parse_date, trip_time};
use super::train::Train;

/// A scheduled run of a train over a route.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: i64,
    pub route: Route,
    pub train: Train,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    /// Train capacity minus tickets issued for this trip.
    ///
    /// Computed by the store; a negative value means the ticket invariants
    /// were broken somewhere and is reported as-is.
    pub tickets_available: i64,
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.route, self.train)
    }
}

/// Input for creating or replacing a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrip {
    /// Id of an existing route.
    pub route: i64,
    /// Id of an existing train.
    pub train: i64,
    #[serde(with = "trip_time")]
    pub departure_time: NaiveDateTime,
    #[serde(with = "trip_time")]
    pub arrival_time: NaiveDateTime,
}

impl NewTrip {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.arrival_time <= self.departure_time {
            return Err(ValidationError::field(
                "arrival_time",
                "must be after departure_time",
            ));
        }
        Ok(())
    }
}

/// Raw trip-list query parameters, as sent by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFilterParams {
    pub train: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

/// Typed trip filter. Every present field is one predicate; predicates are
/// combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFilter {
    /// Case-insensitive substring of the train name.
    pub train: Option<String>,
    /// Case-insensitive substring of the route's source station name.
    pub source: Option<String>,
    /// Case-insensitive substring of the route's destination station name.
    pub destination: Option<String>,
    /// Calendar date of departure.
    pub departure: Option<NaiveDate>,
    /// Calendar date of arrival.
    pub arrival: Option<NaiveDate>,
}

impl TryFrom<TripFilterParams> for TripFilter {
    type Error = ValidationError;

    fn try_from(params: TripFilterParams) -> Result<Self, Self::Error> {
        Ok(Self {
            train: non_blank(params.train),
            source: non_blank(params.source),
            destination: non_blank(params.destination),
            departure: date_param("departure", params.departure)?,
            arrival: date_param("arrival", params.arrival)?,
        })
    }
}

impl TripFilter {
    /// Evaluate the filter against a loaded trip.
    ///
    /// The store evaluates the same predicates in SQL; this is the
    /// reference used to check it.
    pub fn matches(&self, trip: &Trip) -> bool {
        contains_ci(self.train.as_deref(), &trip.train.name)
            && contains_ci(self.source.as_deref(), &trip.route.source.name)
            && contains_ci(self.destination.as_deref(), &trip.route.destination.name)
            && self
                .departure
                .is_none_or(|d| trip.departure_time.date() == d)
            && self.arrival.is_none_or(|d| trip.arrival_time.date() == d)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn date_param(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, ValidationError> {
    non_blank(value)
        .map(|v| parse_date(&v).map_err(|e| ValidationError::field(field, e.to_string())))
        .transpose()
}

/// Case folding used for name search, here and in the store.
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

fn contains_ci(needle: Option<&str>, haystack: &str) -> bool {
    needle.is_none_or(|n| fold_case(haystack).contains(&fold_case(n)))
}
