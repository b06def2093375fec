//! Keyed profile storage.
//!
//! One `RwLock` guards the whole collection: create/update/delete take the write side,
//! read/list the read side, so no caller ever observes a half-applied mutation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, TailgateError};

/// A stored profile. `id` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

/// Storage contract the RPC layer is written against.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert a new profile. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, profile: ProfileRecord) -> Result<ProfileRecord>;
    /// Fetch by id. Fails with `NotFound`.
    async fn read(&self, id: &str) -> Result<ProfileRecord>;
    /// Replace name/attributes of an existing profile. Fails with `NotFound`.
    async fn update(&self, profile: ProfileRecord) -> Result<ProfileRecord>;
    /// Remove by id; `true` if something was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
    /// All profiles, ascending by id.
    async fn list(&self) -> Result<Vec<ProfileRecord>>;
    async fn len(&self) -> usize;
}

/// Process-local store backed by a `BTreeMap` (stable id order for `list`).
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<BTreeMap<String, ProfileRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn require_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(TailgateError::InvalidArgument("profile id must not be empty".into()));
    }
    Ok(())
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn create(&self, profile: ProfileRecord) -> Result<ProfileRecord> {
        require_id(&profile.id)?;
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.id) {
            return Err(TailgateError::AlreadyExists { id: profile.id });
        }
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn read(&self, id: &str) -> Result<ProfileRecord> {
        self.profiles
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| TailgateError::NotFound { id: id.to_string() })
    }

    async fn update(&self, profile: ProfileRecord) -> Result<ProfileRecord> {
        require_id(&profile.id)?;
        let mut profiles = self.profiles.write().await;
        let slot = profiles
            .get_mut(&profile.id)
            .ok_or_else(|| TailgateError::NotFound { id: profile.id.clone() })?;
        *slot = profile.clone();
        Ok(profile)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.profiles.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<ProfileRecord>> {
        Ok(self.profiles.read().await.values().cloned().collect())
    }

    async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }
}
