//! Itinerary composition engine.
//!
//! Normalizes heterogeneous stops into one coordinate model, projects them
//! onto a map, matches day segments against transport options, aggregates
//! expenses against a budget and resolves who may edit a shared trip.

pub mod access;
pub mod api;
pub mod budget;
pub mod cache;
pub mod domain;
pub mod editor;
pub mod map;
pub mod resolve;
pub mod session;
pub mod transport;
