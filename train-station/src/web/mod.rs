//! HTTP API for the booking backend.
//!
//! Every handler resolves the caller from the bearer token, checks the
//! access policy for its resource, then calls into the store.

mod auth;
mod dto;
mod routes;
mod state;

#[cfg(test)]
mod tests;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
