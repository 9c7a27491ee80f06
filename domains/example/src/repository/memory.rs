//! In-memory example store for tests and local development

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use nextbase_common::RepositoryError;

use super::examples::ExampleStore;
use crate::domain::entities::{Example, ExampleChanges, NewExample};

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Example>,
    unavailable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryExampleStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, RepositoryError> {
        let state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(RepositoryError::Connection(sqlx::Error::PoolTimedOut));
        }
        Ok(state)
    }
}

#[async_trait]
impl ExampleStore for InMemoryExampleStore {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Example>, RepositoryError> {
        let state = self.guard()?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Example>, RepositoryError> {
        Ok(self.guard()?.rows.iter().find(|e| e.id == id).cloned())
    }

    async fn create(&self, example: NewExample) -> Result<Example, RepositoryError> {
        let mut state = self.guard()?;
        if state.rows.iter().any(|e| e.id == example.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        let example = example.into_example(Utc::now());
        state.rows.push(example.clone());
        Ok(example)
    }

    async fn update(
        &self,
        id: &str,
        changes: ExampleChanges,
    ) -> Result<Option<Example>, RepositoryError> {
        let mut state = self.guard()?;
        Ok(state.rows.iter_mut().find(|e| e.id == id).map(|example| {
            changes.apply(example, Utc::now());
            example.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<Option<Example>, RepositoryError> {
        let mut state = self.guard()?;
        let position = state.rows.iter().position(|e| e.id == id);
        Ok(position.map(|i| state.rows.remove(i)))
    }
}
