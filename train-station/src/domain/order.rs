//! Orders and tickets.
//!
//! A ticket claims one (cargo, seat) slot on one trip. The triple
//! (trip, cargo, seat) is unique across all orders; the store enforces it
//! with a unique index, and [`check_ticket_batch`] rejects obvious clashes
//! before anything is written.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::error::ValidationError;
use super::trip::Trip;

/// A stored order, owned by one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    /// Tickets ordered by (cargo, seat).
    pub tickets: Vec<Ticket>,
}

/// A stored ticket with its trip loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub cargo: i64,
    pub seat: i64,
    pub trip: Trip,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cargo: {}, seat: {})", self.trip, self.cargo, self.seat)
    }
}

/// One requested ticket in an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct TicketRequest {
    pub trip: i64,
    pub cargo: i64,
    pub seat: i64,
}

impl TicketRequest {
    /// The slot this ticket claims.
    pub fn slot(&self) -> SeatSlot {
        SeatSlot {
            trip: self.trip,
            cargo: self.cargo,
            seat: self.seat,
        }
    }
}

/// A (trip, cargo, seat) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatSlot {
    pub trip: i64,
    pub cargo: i64,
    pub seat: i64,
}

impl fmt::Display for SeatSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trip {}, cargo {}, seat {}",
            self.trip, self.cargo, self.seat
        )
    }
}

/// Field path of the ticket at `index`.
pub fn ticket_path(index: usize) -> String {
    format!("tickets[{index}]")
}

/// Error for a slot that is already claimed.
pub fn seat_taken(index: usize, slot: SeatSlot) -> ValidationError {
    ValidationError::field(ticket_path(index), format!("seat already taken ({slot})"))
}

/// Reject an empty batch and any slot requested twice within it.
pub fn check_ticket_batch(tickets: &[TicketRequest]) -> Result<(), ValidationError> {
    if tickets.is_empty() {
        return Err(ValidationError::field(
            "tickets",
            "an order needs at least one ticket",
        ));
    }

    let mut first_seen: HashMap<SeatSlot, usize> = HashMap::new();
    for (index, ticket) in tickets.iter().enumerate() {
        if first_seen.insert(ticket.slot(), index).is_some() {
            return Err(seat_taken(index, ticket.slot()));
        }
    }
    Ok(())
}
