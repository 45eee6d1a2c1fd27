//! Application core for reelbox.
//!
//! Ties the TMDB client and the key-value store together: a generic
//! asynchronous fetch controller, the per-kind saved-items registry, and
//! the process-wide user profile store.

/// Asynchronous fetch state controller.
pub mod fetch;
/// User profile store.
pub mod profile;
/// Saved-items registry.
pub mod saved;

pub use fetch::{FetchController, FetchPhase, FetchState};
pub use profile::{PROFILE_KEY, ProfileError, ProfileStore, UserProfile};
pub use saved::{SavedRegistry, ToggleOutcome};
