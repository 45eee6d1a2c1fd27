//! Per-kind saved-items registry.
//!
//! Each [`MediaKind`] keeps an ordered JSON array of id strings under its
//! own storage key. Toggles go through [`update_json`], a compare-and-swap
//! cycle on the store, so concurrent toggles cannot lose updates even when
//! they come from separate processes sharing one database. Within a process
//! they are additionally queued per kind to avoid needless retries.

use std::sync::Arc;

use futures::future::join_all;
use reelbox_api::tmdb::{MediaApi, MediaDetail, MediaKind};
use reelbox_db::{KeyValueStore, StorageError, read_json, update_json};
use tokio::sync::Mutex;
use tracing::instrument;

/// Result of [`SavedRegistry::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the id is saved after the toggle.
    pub saved: bool,
}

/// Saved identifiers per media kind, persisted in a key-value store.
#[derive(Debug)]
pub struct SavedRegistry<S> {
    store: Arc<S>,
    movie_lock: Mutex<()>,
    tv_lock: Mutex<()>,
}

impl<S> SavedRegistry<S>
where
    S: KeyValueStore + Send + Sync,
{
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            movie_lock: Mutex::new(()),
            tv_lock: Mutex::new(()),
        }
    }

    const fn lock_for(&self, kind: MediaKind) -> &Mutex<()> {
        match kind {
            MediaKind::Movie => &self.movie_lock,
            MediaKind::Tv => &self.tv_lock,
        }
    }

    /// Adds `id` if absent, removes it if present, and persists the set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the set cannot be read or written, or
    /// [`StorageError::Conflict`] if other writers keep changing it; the
    /// stored set is left unchanged in that case.
    #[instrument(skip(self, kind), fields(kind = %kind))]
    pub async fn toggle(&self, kind: MediaKind, id: &str) -> Result<ToggleOutcome, StorageError> {
        let _guard = self.lock_for(kind).lock().await;

        let (saved, count) = update_json(
            self.store.as_ref(),
            kind.saved_key(),
            |ids: Option<Vec<String>>| {
                let mut ids = ids.unwrap_or_default();
                let before = ids.len();
                ids.retain(|saved| saved != id);
                let saved = ids.len() == before;
                if saved {
                    ids.push(String::from(id));
                }
                let count = ids.len();
                (ids, (saved, count))
            },
        )
        .await?;

        tracing::debug!(saved, count, "Toggled saved item");
        Ok(ToggleOutcome { saved })
    }

    /// Whether `id` is currently saved.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the set cannot be read.
    pub async fn is_saved(&self, kind: MediaKind, id: &str) -> Result<bool, StorageError> {
        Ok(self.saved_ids(kind).await?.iter().any(|saved| saved == id))
    }

    /// Saved ids in insertion order. A missing or undecodable set is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the set cannot be read.
    pub async fn saved_ids(&self, kind: MediaKind) -> Result<Vec<String>, StorageError> {
        let ids: Option<Vec<String>> = read_json(self.store.as_ref(), kind.saved_key()).await?;
        Ok(ids.unwrap_or_default())
    }

    /// Resolves every saved id into its detail record.
    ///
    /// Lookups run concurrently. Ids whose lookup fails (or which are not
    /// numeric) are logged and dropped; the rest keep their saved order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] only if the set cannot be read.
    #[instrument(skip(self, kind, api), fields(kind = %kind))]
    pub async fn list_saved_details<A>(
        &self,
        kind: MediaKind,
        api: &A,
    ) -> Result<Vec<MediaDetail>, StorageError>
    where
        A: MediaApi + Sync,
    {
        let ids = self.saved_ids(kind).await?;
        let lookups = ids.iter().map(|raw| async move {
            let id: u64 = match raw.parse() {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(id = %raw, error = %e, "Skipping non-numeric saved id");
                    return None;
                }
            };
            match api.detail(kind, id).await {
                Ok(detail) => Some(detail),
                Err(e) => {
                    tracing::warn!(id, error = %e, "Dropping saved item whose lookup failed");
                    None
                }
            }
        });

        let details: Vec<MediaDetail> = join_all(lookups).await.into_iter().flatten().collect();
        tracing::debug!(saved = ids.len(), resolved = details.len(), "Resolved saved items");
        Ok(details)
    }
}
