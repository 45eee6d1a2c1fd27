//! TMDB API response types.

use serde::Deserialize;

use super::kind::MediaKind;

// --- Lists ---

/// Paginated list response (`search/*`, `discover/*`, `trending/*`).
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    /// Current page number.
    #[serde(default)]
    pub page: u32,
    /// Page results.
    pub results: Vec<T>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A single movie in a list response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
}

/// A single TV series in a list response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TvSummary {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// First air date (YYYY-MM-DD, may be empty).
    #[serde(default)]
    pub first_air_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
}

// --- Details ---

/// Genre entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

/// Production company entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductionCompany {
    /// Company ID.
    pub id: u64,
    /// Company name.
    pub name: String,
    /// Logo image path.
    #[serde(default)]
    pub logo_path: Option<String>,
    /// Origin country (ISO 3166-1).
    #[serde(default)]
    pub origin_country: Option<String>,
}

/// Response from `movie/{movie_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Genres, in TMDB order.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Production companies.
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Budget in USD (0 when unknown).
    #[serde(default)]
    pub budget: u64,
    /// Revenue in USD (0 when unknown).
    #[serde(default)]
    pub revenue: u64,
    /// Release status (e.g., "Released").
    #[serde(default)]
    pub status: Option<String>,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
}

/// Response from `tv/{series_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TvDetail {
    /// TMDB series ID.
    pub id: u64,
    /// Localized name.
    pub name: String,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// First air date.
    #[serde(default)]
    pub first_air_date: Option<String>,
    /// Last air date.
    #[serde(default)]
    pub last_air_date: Option<String>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: f64,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Genres, in TMDB order.
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Production companies.
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    /// Typical episode runtimes in minutes.
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    /// Total number of seasons.
    #[serde(default)]
    pub number_of_seasons: u32,
    /// Total number of episodes.
    #[serde(default)]
    pub number_of_episodes: u32,
    /// Status (e.g., "Returning Series", "Ended").
    #[serde(default)]
    pub status: Option<String>,
    /// Whether the show is still in production.
    #[serde(default)]
    pub in_production: bool,
}

// --- Kind-agnostic views ---

/// A movie or TV show as returned by list endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaItem {
    /// Movie summary.
    Movie(MovieSummary),
    /// TV series summary.
    Tv(TvSummary),
}

impl MediaItem {
    /// Kind of this item.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self {
            Self::Movie(_) => MediaKind::Movie,
            Self::Tv(_) => MediaKind::Tv,
        }
    }

    /// TMDB ID (unique per kind).
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Movie(m) => m.id,
            Self::Tv(t) => t.id,
        }
    }

    /// Movie title or series name.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Tv(t) => &t.name,
        }
    }

    /// Poster image path.
    #[must_use]
    pub fn poster_path(&self) -> Option<&str> {
        match self {
            Self::Movie(m) => m.poster_path.as_deref(),
            Self::Tv(t) => t.poster_path.as_deref(),
        }
    }

    /// Release date or first air date, `None` when unknown or empty.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        let date = match self {
            Self::Movie(m) => m.release_date.as_deref(),
            Self::Tv(t) => t.first_air_date.as_deref(),
        };
        date.filter(|d| !d.is_empty())
    }

    /// Vote average.
    #[must_use]
    pub const fn vote_average(&self) -> f64 {
        match self {
            Self::Movie(m) => m.vote_average,
            Self::Tv(t) => t.vote_average,
        }
    }

    /// Vote count.
    #[must_use]
    pub const fn vote_count(&self) -> u32 {
        match self {
            Self::Movie(m) => m.vote_count,
            Self::Tv(t) => t.vote_count,
        }
    }
}

/// Full detail record for a movie or TV show.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaDetail {
    /// Movie details.
    Movie(MovieDetail),
    /// TV series details.
    Tv(TvDetail),
}

impl MediaDetail {
    /// Kind of this record.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self {
            Self::Movie(_) => MediaKind::Movie,
            Self::Tv(_) => MediaKind::Tv,
        }
    }

    /// TMDB ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Movie(m) => m.id,
            Self::Tv(t) => t.id,
        }
    }

    /// Movie title or series name.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Movie(m) => &m.title,
            Self::Tv(t) => &t.name,
        }
    }

    /// Poster image path.
    #[must_use]
    pub fn poster_path(&self) -> Option<&str> {
        match self {
            Self::Movie(m) => m.poster_path.as_deref(),
            Self::Tv(t) => t.poster_path.as_deref(),
        }
    }

    /// Release date or first air date, `None` when unknown or empty.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        let date = match self {
            Self::Movie(m) => m.release_date.as_deref(),
            Self::Tv(t) => t.first_air_date.as_deref(),
        };
        date.filter(|d| !d.is_empty())
    }

    /// Overview text.
    #[must_use]
    pub fn overview(&self) -> Option<&str> {
        match self {
            Self::Movie(m) => m.overview.as_deref(),
            Self::Tv(t) => t.overview.as_deref(),
        }
    }

    /// Genres, in TMDB order.
    #[must_use]
    pub fn genres(&self) -> &[Genre] {
        match self {
            Self::Movie(m) => &m.genres,
            Self::Tv(t) => &t.genres,
        }
    }

    /// Production companies.
    #[must_use]
    pub fn production_companies(&self) -> &[ProductionCompany] {
        match self {
            Self::Movie(m) => &m.production_companies,
            Self::Tv(t) => &t.production_companies,
        }
    }

    /// Vote average.
    #[must_use]
    pub const fn vote_average(&self) -> f64 {
        match self {
            Self::Movie(m) => m.vote_average,
            Self::Tv(t) => t.vote_average,
        }
    }

    /// Vote count.
    #[must_use]
    pub const fn vote_count(&self) -> u32 {
        match self {
            Self::Movie(m) => m.vote_count,
            Self::Tv(t) => t.vote_count,
        }
    }

    /// Runtime in minutes: movie runtime, or the first listed episode runtime.
    #[must_use]
    pub fn runtime(&self) -> Option<u32> {
        match self {
            Self::Movie(m) => m.runtime,
            Self::Tv(t) => t.episode_run_time.first().copied(),
        }
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[serde(default)]
    #[allow(dead_code)]
    pub success: bool,
}
