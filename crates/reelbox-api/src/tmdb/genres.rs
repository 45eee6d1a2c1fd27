//! Built-in TMDB genre catalog.
//!
//! Genre IDs are stable on TMDB, so the catalog ships as a constant
//! instead of being fetched from `genre/{kind}/list`.

use super::kind::MediaKind;

/// A genre from the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenreInfo {
    /// TMDB genre ID.
    pub id: u32,
    /// English genre name.
    pub name: &'static str,
}

const fn genre(id: u32, name: &'static str) -> GenreInfo {
    GenreInfo { id, name }
}

const MOVIE_GENRES: &[GenreInfo] = &[
    genre(28, "Action"),
    genre(12, "Adventure"),
    genre(16, "Animation"),
    genre(35, "Comedy"),
    genre(80, "Crime"),
    genre(99, "Documentary"),
    genre(18, "Drama"),
    genre(10751, "Family"),
    genre(14, "Fantasy"),
    genre(36, "History"),
    genre(27, "Horror"),
    genre(10402, "Music"),
    genre(9648, "Mystery"),
    genre(10749, "Romance"),
    genre(878, "Science Fiction"),
    genre(10770, "TV Movie"),
    genre(53, "Thriller"),
    genre(10752, "War"),
    genre(37, "Western"),
];

const TV_GENRES: &[GenreInfo] = &[
    genre(10759, "Action & Adventure"),
    genre(16, "Animation"),
    genre(35, "Comedy"),
    genre(80, "Crime"),
    genre(99, "Documentary"),
    genre(18, "Drama"),
    genre(10751, "Family"),
    genre(10762, "Kids"),
    genre(9648, "Mystery"),
    genre(10763, "News"),
    genre(10764, "Reality"),
    genre(10765, "Sci-Fi & Fantasy"),
    genre(10766, "Soap"),
    genre(10767, "Talk"),
    genre(10768, "War & Politics"),
    genre(37, "Western"),
];

/// Genres available for `kind`, in display order.
#[must_use]
pub const fn genres_for(kind: MediaKind) -> &'static [GenreInfo] {
    match kind {
        MediaKind::Movie => MOVIE_GENRES,
        MediaKind::Tv => TV_GENRES,
    }
}

/// Looks up a genre by numeric ID or case-insensitive name.
#[must_use]
pub fn find_genre(kind: MediaKind, id_or_name: &str) -> Option<GenreInfo> {
    let needle = id_or_name.trim();
    if let Ok(id) = needle.parse::<u32>() {
        return genres_for(kind).iter().find(|g| g.id == id).copied();
    }
    genres_for(kind)
        .iter()
        .find(|g| g.name.eq_ignore_ascii_case(needle))
        .copied()
}

/// Resolves a `--genre` style argument into a TMDB genre ID.
///
/// Numeric input is passed through as-is, even when it is not in the
/// built-in catalog; names are looked up case-insensitively.
#[must_use]
pub fn resolve_genre_id(kind: MediaKind, id_or_name: &str) -> Option<u32> {
    let needle = id_or_name.trim();
    needle
        .parse::<u32>()
        .ok()
        .or_else(|| find_genre(kind, needle).map(|g| g.id))
}
