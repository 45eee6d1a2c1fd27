//! API client library for reelbox.
//!
//! Wraps the TMDB v3 endpoints used to browse, search, and inspect
//! movies and TV shows.

/// TMDB API client.
pub mod tmdb;
