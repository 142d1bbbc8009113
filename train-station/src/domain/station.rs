//! Stations.

use std::fmt;

use serde::Deserialize;

use super::error::{ValidationError, check_name};

/// Maximum length of a station name.
pub const STATION_NAME_MAX: usize = 255;

/// A stored station.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {:?})", self.name, self.latitude, self.longitude)
    }
}

/// Input for creating a station.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewStation {
    /// Check name and coordinate ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("name", &self.name, STATION_NAME_MAX)?;

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::field(
                "latitude",
                "must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::field(
                "longitude",
                "must be between -180 and 180",
            ));
        }
        Ok(())
    }
}
