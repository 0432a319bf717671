use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use tracing::trace;

use crate::{api::ApiResult, types::RepoRef};

/// Run-lifetime memo of repository name to provider repository ID.
///
/// Reads take a shared lock. A miss calls the fetcher without holding any
/// lock, so two workers asking for the same repository at once may both
/// fetch; the later insert wins and both values are the same ID.
#[derive(Debug, Default)]
pub struct RepoIdCache {
    ids: RwLock<HashMap<String, String>>,
}

impl RepoIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, repo: &RepoRef) -> Option<String> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&repo.full_name())
            .cloned()
    }

    pub fn insert(&self, repo: &RepoRef, id: impl Into<String>) {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(repo.full_name(), id.into());
    }

    /// Returns the cached ID for `repo`, calling `fetch` and caching its
    /// result on a miss. Errors are not cached.
    pub fn get_or_fetch<F>(&self, repo: &RepoRef, fetch: F) -> ApiResult<String>
    where
        F: FnOnce() -> ApiResult<String>,
    {
        if let Some(id) = self.get(repo) {
            trace!(repo = %repo, "repository id cache hit");
            return Ok(id);
        }

        let id = fetch()?;
        self.insert(repo, id.clone());
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
