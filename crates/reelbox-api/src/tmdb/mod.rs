//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 endpoints and parses
//! search, discovery, trending, and detail responses for movies and TV shows.

mod api;
mod client;
mod error;
mod genres;
mod kind;
mod query;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalMediaApi, MediaApi, TRENDING_LIMIT};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use error::{ApiError, NetworkFailure};
pub use genres::{GenreInfo, find_genre, genres_for, resolve_genre_id};
pub use kind::MediaKind;
pub use query::{Endpoint, MediaQuery};
pub use types::{
    Genre, MediaDetail, MediaItem, MovieDetail, MovieSummary, Paged, ProductionCompany,
    TmdbErrorResponse, TvDetail, TvSummary,
};
