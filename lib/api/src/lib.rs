//! REST surface for concursim
//!
//! Exposes the record store and the clustering, matching and diffing
//! operations over HTTP for the dashboard.

pub mod rest;

pub use rest::{ApiError, AppState, RestApi};
