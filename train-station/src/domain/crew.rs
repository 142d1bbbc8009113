//! Train crew members and the trips they work.

use serde::Deserialize;

use super::error::{ValidationError, check_name};
use super::trip::Trip;

/// Maximum length of a crew member's first or last name.
pub const CREW_NAME_MAX: usize = 50;

/// A stored crew member with the trips they are assigned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Crew {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub trips: Vec<Trip>,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for creating a crew member.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCrew {
    pub first_name: String,
    pub last_name: String,
    /// Ids of trips the crew member works.
    #[serde(default)]
    pub trips: Vec<i64>,
}

impl NewCrew {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("first_name", &self.first_name, CREW_NAME_MAX)?;
        check_name("last_name", &self.last_name, CREW_NAME_MAX)?;
        Ok(())
    }

    /// Trip ids with duplicates removed, in first-seen order.
    pub fn distinct_trips(&self) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        self.trips
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
