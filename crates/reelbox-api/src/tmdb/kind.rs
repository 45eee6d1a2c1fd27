//! `MediaKind` - movie or TV show.

use std::fmt;
use std::str::FromStr;

/// Kind of media a request or a saved list refers to.
///
/// Decides which remote endpoints apply and which storage key holds
/// the saved identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    /// Feature films (`/movie`, `/search/movie`, ...).
    Movie,
    /// TV series (`/tv`, `/search/tv`, ...).
    Tv,
}

impl MediaKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Movie, Self::Tv];

    /// Path segment used by TMDB for this kind.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Key under which the saved identifiers of this kind are persisted.
    #[must_use]
    pub const fn saved_key(self) -> &'static str {
        match self {
            Self::Movie => "@savedMovies",
            Self::Tv => "@savedTV",
        }
    }

    /// Human-readable plural label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Movie => "Movies",
            Self::Tv => "TV Shows",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Self::Movie),
            "tv" | "show" | "shows" | "series" => Ok(Self::Tv),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}
