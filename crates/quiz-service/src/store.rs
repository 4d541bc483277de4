//! In-memory quiz storage.

use crate::model::{Quiz, QuizDraft, QuizId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Errors returned by [`QuizStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Quiz with given id is not found on server: {0}")]
    NotFound(QuizId),
}

/// Keyed quiz storage shared by every request handler.
///
/// Ids are assigned on insert, start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct QuizStore {
    quizzes: Arc<RwLock<BTreeMap<QuizId, Quiz>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for QuizStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizStore {
    pub fn new() -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn create(&self, draft: QuizDraft) -> Quiz {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let quiz = Quiz {
            id,
            title: draft.title,
        };
        self.write().insert(id, quiz.clone());
        quiz
    }

    pub fn get(&self, id: QuizId) -> Result<Quiz, StoreError> {
        self.read().get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    /// All quizzes in id order.
    pub fn list(&self) -> Vec<Quiz> {
        self.read().values().cloned().collect()
    }

    pub fn update(&self, id: QuizId, draft: QuizDraft) -> Result<Quiz, StoreError> {
        let mut quizzes = self.write();
        let quiz = quizzes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        quiz.title = draft.title;
        Ok(quiz.clone())
    }

    pub fn delete(&self, id: QuizId) -> Result<Quiz, StoreError> {
        self.write().remove(&id).ok_or(StoreError::NotFound(id))
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Inserts `Quiz 1` .. `Quiz n` when the store is empty. Returns how many
    /// quizzes were inserted.
    pub fn seed(&self, n: usize) -> usize {
        if self.count() > 0 {
            return 0;
        }
        for i in 1..=n {
            self.create(QuizDraft {
                title: format!("Quiz {i}"),
            });
        }
        tracing::info!(count = n, "seeded quiz store");
        n
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<QuizId, Quiz>> {
        self.quizzes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<QuizId, Quiz>> {
        self.quizzes.write().unwrap_or_else(PoisonError::into_inner)
    }
}
