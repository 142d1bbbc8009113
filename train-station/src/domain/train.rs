//! Train types, trains and their seating capacity.

use std::fmt;

use serde::Deserialize;

use super::error::{ValidationError, check_name};

/// Maximum length of train and train-type names.
pub const TRAIN_NAME_MAX: usize = 50;

/// Upper bound for `cargo_num` and `places_in_cargo`, matching a 32-bit
/// integer column. The product of two bounded values still fits an `i64`.
pub const LAYOUT_MAX: i64 = i32::MAX as i64;

/// A stored train type (e.g. "Intercity").
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TrainType {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for TrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Input for creating a train type.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrainType {
    pub name: String,
}

impl NewTrainType {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("name", &self.name, TRAIN_NAME_MAX)
    }
}

/// A stored train together with its type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Train {
    pub id: i64,
    pub name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    pub train_type: TrainType,
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.train_type)
    }
}

/// Input for creating a train.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrain {
    pub name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    /// Id of an existing train type.
    pub train_type: i64,
}

impl NewTrain {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("name", &self.name, TRAIN_NAME_MAX)?;
        check_layout("cargo_num", self.cargo_num)?;
        check_layout("places_in_cargo", self.places_in_cargo)
    }
}

fn check_layout(field: &str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::field(field, "must be positive"));
    }
    if value > LAYOUT_MAX {
        return Err(ValidationError::field(
            field,
            format!("must be at most {LAYOUT_MAX}"),
        ));
    }
    Ok(())
}

/// Seating layout: `cargo_num` carriages of `places_in_cargo` seats each.
///
/// Carriages and seats are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub cargo_num: i64,
    pub places_in_cargo: i64,
}

impl Capacity {
    /// Check that a (cargo, seat) slot exists on this train.
    pub fn check(&self, cargo: i64, seat: i64) -> Result<(), ValidationError> {
        if !(1..=self.cargo_num).contains(&cargo) {
            return Err(ValidationError::field(
                "cargo",
                format!("must be in range [1, {}]", self.cargo_num),
            ));
        }
        if !(1..=self.places_in_cargo).contains(&seat) {
            return Err(ValidationError::field(
                "seat",
                format!("must be in range [1, {}]", self.places_in_cargo),
            ));
        }
        Ok(())
    }
}
