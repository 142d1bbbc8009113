//! Booking backend for a train station: stations, routes, trains, trips,
//! crews and ticket orders behind an HTTP API.

pub mod access;
pub mod config;
pub mod domain;
pub mod identity;
pub mod store;
pub mod web;
