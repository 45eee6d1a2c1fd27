//! `KeyValueStore` trait definition and JSON helpers.
#![allow(clippy::future_not_send)]

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::StorageError;

/// String key-value store.
///
/// Abstracts the on-device storage primitive for backend substitution.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Stores `new` under `key` only if the current value equals `expected`
    /// (`None` meaning absent). Returns whether the value was replaced.
    ///
    /// The comparison and the write happen atomically with respect to every
    /// other handle on the same backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read or write fails.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StorageError>;
}

/// Attempts made by [`update_json`] before giving up.
const MAX_UPDATE_ATTEMPTS: u32 = 8;

/// Decodes a stored value, treating malformed JSON as absent.
fn decode_or_warn<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring undecodable stored value");
            None
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: String::from(key),
        source,
    })
}

/// Reads and JSON-decodes the value under `key`.
///
/// A value that fails to decode is treated as absent and logged; it is
/// never surfaced as an error.
///
/// # Errors
///
/// Returns an error only if the backend read fails.
pub async fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + Sync,
{
    let raw = store.get(key).await?;
    Ok(raw.as_deref().and_then(|raw| decode_or_warn(key, raw)))
}

/// JSON-encodes `value` and stores it under `key`.
///
/// The value is fully serialized before the store is touched, so a value
/// that cannot be encoded leaves the previous value in place.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails, or the backend
/// error if the write fails.
pub async fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + Sync + ?Sized,
    S: KeyValueStore + Sync,
{
    let encoded = encode(key, value)?;
    store.set(key, &encoded).await
}

/// Atomically rewrites the JSON value under `key`.
///
/// `apply` receives the decoded current value (`None` if absent or
/// undecodable) and returns the replacement plus an output for the caller.
/// If another writer changes the value in between, the cycle is retried
/// with the fresh value, so `apply` may run more than once.
///
/// # Errors
///
/// Returns [`StorageError::Conflict`] if the value keeps changing, or the
/// encode/backend error of the failed step. Nothing is written on error.
pub async fn update_json<T, R, S, F>(store: &S, key: &str, mut apply: F) -> Result<R, StorageError>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore + Sync,
    F: FnMut(Option<T>) -> (T, R),
{
    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let current = store.get(key).await?;
        let decoded = current.as_deref().and_then(|raw| decode_or_warn(key, raw));
        let (next, output) = apply(decoded);
        let encoded = encode(key, &next)?;
        if store
            .compare_and_swap(key, current.as_deref(), &encoded)
            .await?
        {
            return Ok(output);
        }
        tracing::debug!(key, attempt, "Stored value changed concurrently, retrying");
    }
    Err(StorageError::Conflict {
        key: String::from(key),
    })
}
