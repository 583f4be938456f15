//! Backend-synchronized chore cache.
//!
//! Every operation is an independent round-trip; the last successful
//! response wins and replaces the cached record. A failed call leaves
//! the cache exactly as it was.

use chrono::NaiveDate;

use crate::api::{self, ApiClient};
use crate::auth::SessionStore;
use crate::chores::{Chore, ChoreDraft, ChoreFilter, ChorePatch};
use crate::dates;
use crate::error::{ApiError, CoreError};

/// CRUD over `/api/chores`, scoped to the persisted session.
pub struct ChoreStore {
    api: ApiClient,
    sessions: SessionStore,
    cache: Vec<Chore>,
}

impl ChoreStore {
    pub fn new(api: ApiClient, sessions: SessionStore) -> Self {
        Self {
            api,
            sessions,
            cache: Vec::new(),
        }
    }

    /// The chores fetched by the most recent successful call.
    pub fn cached(&self) -> &[Chore] {
        &self.cache
    }

    /// Fetch chores, optionally restricted to a weekday name, and
    /// replace the cache.
    pub fn list(&mut self, day: Option<&str>) -> Result<&[Chore], CoreError> {
        let mut query = Vec::new();
        if let Some(day) = day {
            query.push(("day", day.to_string()));
        }
        self.fetch_into_cache("/chores", &query)
    }

    /// Fetch chores for a calendar date.
    pub fn list_by_date(&mut self, date: NaiveDate) -> Result<&[Chore], CoreError> {
        let query = [("date", dates::format_date(date))];
        self.fetch_into_cache("/chores", &query)
    }

    /// Fetch the server-filtered list (priority/deadline/self).
    pub fn filtered(&mut self, filter: ChoreFilter) -> Result<&[Chore], CoreError> {
        let query = [("filter", filter.as_str().to_string())];
        self.fetch_into_cache("/chores/filter", &query)
    }

    /// The task feed the timer selects from: `GET /tasks?day=`.
    /// Requires a session.
    pub fn tasks_for_day(&mut self, day: &str) -> Result<Vec<Chore>, CoreError> {
        let Some(session) = self.sessions.load()? else {
            return Err(ApiError::Unauthorized.into());
        };
        let query = [("day", day.to_string())];
        let tasks = self.guard_401(api::wait(self.api.get_json(
            "/tasks",
            &query,
            Some(&session.token),
        )))?;
        Ok(tasks)
    }

    /// Create a chore; the backend's copy (with its id) is appended to
    /// the cache and returned.
    pub fn create(&mut self, draft: &ChoreDraft) -> Result<Chore, CoreError> {
        draft.validate()?;
        let token = self.token()?;
        let created: Chore = self.guard_401(api::wait(self.api.post_json(
            "/chores",
            draft,
            token.as_deref(),
        )))?;
        self.cache.push(created.clone());
        Ok(created)
    }

    /// Apply a partial update; the backend's response replaces the
    /// cached record.
    pub fn update(&mut self, id: &str, patch: &ChorePatch) -> Result<Chore, CoreError> {
        let token = self.token()?;
        let path = format!("/chores/{id}");
        let updated: Chore = self.guard_401(api::wait(self.api.put_json(
            &path,
            patch,
            token.as_deref(),
        )))?;
        if let Some(slot) = self.cache.iter_mut().find(|c| c.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Mark a chore done.
    pub fn complete(&mut self, id: &str) -> Result<Chore, CoreError> {
        self.update(id, &ChorePatch::completed())
    }

    /// Delete a chore and drop it from the cache.
    pub fn delete(&mut self, id: &str) -> Result<(), CoreError> {
        let token = self.token()?;
        let path = format!("/chores/{id}");
        self.guard_401(api::wait(self.api.delete(&path, token.as_deref())))?;
        self.cache.retain(|c| c.id != id);
        Ok(())
    }

    fn fetch_into_cache(
        &mut self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<&[Chore], CoreError> {
        let token = self.token()?;
        let chores: Vec<Chore> =
            self.guard_401(api::wait(self.api.get_json(path, query, token.as_deref())))?;
        self.cache = chores;
        Ok(&self.cache)
    }

    fn token(&self) -> Result<Option<String>, CoreError> {
        Ok(self.sessions.load()?.map(|s| s.token))
    }

    /// Any 401 means the persisted session is dead; clear it.
    fn guard_401<T>(&self, result: Result<T, ApiError>) -> Result<T, CoreError> {
        if let Err(ApiError::Unauthorized) = &result {
            if let Err(e) = self.sessions.clear() {
                eprintln!("Warning: failed to clear session after 401: {e}");
            }
        }
        result.map_err(Into::into)
    }
}
