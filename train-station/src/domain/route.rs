//! Directed routes between stations.
//!
//! Every stored route `A → B` is paired with a reverse route `B → A`; the
//! store creates the reverse side when the forward side is first saved.

use std::fmt;

use serde::Deserialize;

use super::error::ValidationError;
use super::station::Station;

/// A stored route with both stations loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: i64,
    pub source: Station,
    pub destination: Station,
    /// Distance in kilometres.
    pub distance: i64,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.source.name, self.destination.name)
    }
}

/// Input for creating a route. Stations are referenced by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewRoute {
    pub source: i64,
    pub destination: i64,
    pub distance: i64,
}

impl NewRoute {
    /// Check the route's own invariants (stations are checked by the store).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source == self.destination {
            return Err(ValidationError::new("source and destination must differ"));
        }
        if self.distance <= 0 {
            return Err(ValidationError::new("distance must be positive"));
        }
        Ok(())
    }

    /// The same pair travelled the other way, at the same distance.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            distance: self.distance,
        }
    }
}
