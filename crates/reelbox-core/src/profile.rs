//! Process-wide user profile.
//!
//! The profile is loaded once at startup into [`ProfileStore`], which then
//! serves it from memory. Edits replace the whole record; there are no
//! partial-field updates.

use std::sync::Arc;

use reelbox_db::{KeyValueStore, StorageError, read_json, write_json};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// Storage key of the profile record.
pub const PROFILE_KEY: &str = "userProfile";

/// The locally stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Age, as entered.
    pub age: String,
    /// City.
    pub city: String,
}

impl UserProfile {
    /// Checks that no field is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let fields = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("age", &self.age),
            ("city", &self.city),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ProfileError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// Error returned by [`ProfileStore`] operations.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ProfileError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The backing store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Cached profile backed by a key-value store.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ProfileStore<S> {
    store: Arc<S>,
    cached: RwLock<Option<UserProfile>>,
}

impl<S> ProfileStore<S>
where
    S: KeyValueStore + Send + Sync,
{
    /// Reads the profile from `store`. An undecodable record counts as no profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Storage`] if the read fails.
    pub async fn load(store: Arc<S>) -> Result<Self, ProfileError> {
        let profile: Option<UserProfile> = read_json(store.as_ref(), PROFILE_KEY).await?;
        tracing::debug!(present = profile.is_some(), "Loaded user profile");
        Ok(Self {
            store,
            cached: RwLock::new(profile),
        })
    }

    /// The cached profile.
    pub async fn current(&self) -> Option<UserProfile> {
        self.cached.read().await.clone()
    }

    /// Validates and persists `profile`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::MissingField`] if a field is blank, or
    /// [`ProfileError::Storage`] if the write fails. The cache is only
    /// updated after a successful write.
    pub async fn submit(&self, profile: UserProfile) -> Result<(), ProfileError> {
        profile.validate()?;
        let mut cached = self.cached.write().await;
        write_json(self.store.as_ref(), PROFILE_KEY, &profile).await?;
        *cached = Some(profile);
        tracing::debug!("Saved user profile");
        Ok(())
    }

    /// Deletes the stored profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Storage`] if the removal fails.
    pub async fn delete(&self) -> Result<(), ProfileError> {
        let mut cached = self.cached.write().await;
        self.store.remove(PROFILE_KEY).await?;
        *cached = None;
        tracing::debug!("Deleted user profile");
        Ok(())
    }

    /// Discards the cache and reads the profile again.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Storage`] if the read fails; the cache is
    /// left untouched in that case.
    pub async fn reload(&self) -> Result<Option<UserProfile>, ProfileError> {
        let mut cached = self.cached.write().await;
        let profile: Option<UserProfile> = read_json(self.store.as_ref(), PROFILE_KEY).await?;
        cached.clone_from(&profile);
        Ok(profile)
    }

    /// Home screen greeting, if a profile exists.
    pub async fn greeting(&self) -> Option<String> {
        self.cached
            .read()
            .await
            .as_ref()
            .map(|p| format!("Hello : {}", p.first_name))
    }
}
