//! `MediaQuery` and endpoint resolution for search/discover requests.

use super::kind::MediaKind;

/// Sort order used for every discovery request.
const DISCOVER_SORT: &str = "popularity.desc";

/// Filters for a search-or-discover request.
///
/// A non-empty `query` selects text search and takes precedence over
/// `genre_id`. Without a query, a positive `genre_id` filters the
/// popularity-sorted discovery list. With neither, the unfiltered
/// discovery list is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaQuery {
    /// Free-text search query.
    pub query: Option<String>,
    /// TMDB genre ID to filter discovery by (`0` means unset).
    pub genre_id: Option<u32>,
}

/// A resolved request target: path relative to the API base plus query params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Path relative to the API base URL (e.g. `search/movie`).
    pub path: String,
    /// Query string parameters.
    pub params: Vec<(&'static str, String)>,
}

impl MediaQuery {
    /// Text search for `query`.
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            genre_id: None,
        }
    }

    /// Popularity-sorted discovery filtered by `genre_id`.
    #[must_use]
    pub const fn genre(genre_id: u32) -> Self {
        Self {
            query: None,
            genre_id: Some(genre_id),
        }
    }

    /// Unfiltered popularity-sorted discovery.
    #[must_use]
    pub const fn popular() -> Self {
        Self {
            query: None,
            genre_id: None,
        }
    }

    /// The trimmed query text, if it is non-empty.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// The genre filter, if it is set and positive.
    #[must_use]
    pub fn genre_filter(&self) -> Option<u32> {
        self.genre_id.filter(|id| *id > 0)
    }

    /// Resolves the endpoint for `kind`.
    #[must_use]
    pub fn endpoint(&self, kind: MediaKind) -> Endpoint {
        let segment = kind.path_segment();

        if let Some(text) = self.search_text() {
            return Endpoint {
                path: format!("search/{segment}"),
                params: vec![("query", String::from(text))],
            };
        }

        let mut params = vec![("sort_by", String::from(DISCOVER_SORT))];
        if let Some(genre_id) = self.genre_filter() {
            params.push(("with_genres", genre_id.to_string()));
        }
        Endpoint {
            path: format!("discover/{segment}"),
            params,
        }
    }
}
