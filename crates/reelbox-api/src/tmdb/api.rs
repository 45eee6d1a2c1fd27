//! `MediaApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::ApiError;
use super::kind::MediaKind;
use super::query::MediaQuery;
use super::types::{MediaDetail, MediaItem};

/// Maximum number of trending items returned to callers.
pub const TRENDING_LIMIT: usize = 10;

/// Media metadata API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(MediaApi: Send)]
pub trait LocalMediaApi {
    /// Searches by text or discovers by popularity, optionally filtered by genre.
    ///
    /// See [`MediaQuery`] for the precedence between query and genre.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] on a non-success HTTP status and
    /// [`ApiError::Network`] on transport or JSON parsing failure.
    async fn search_or_discover(
        &self,
        kind: MediaKind,
        query: &MediaQuery,
    ) -> Result<Vec<MediaItem>, ApiError>;

    /// Fetches the weekly trending list, truncated to [`TRENDING_LIMIT`] items.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] on a non-success HTTP status and
    /// [`ApiError::Network`] on transport or JSON parsing failure.
    async fn trending(&self, kind: MediaKind) -> Result<Vec<MediaItem>, ApiError>;

    /// Fetches the full detail record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] on a non-success HTTP status and
    /// [`ApiError::Network`] on transport or JSON parsing failure.
    async fn detail(&self, kind: MediaKind, id: u64) -> Result<MediaDetail, ApiError>;
}
