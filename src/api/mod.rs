//! API clients
//!
//! Remote catalogue lookups consumed by the overlay core.

pub mod tmdb;

pub use tmdb::{TmdbClient, TmdbError};
