//! In-memory question storage.

use crate::model::{Question, QuestionDraft};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Question with given id is not found on server: {0}")]
    NotFound(u64),
}

/// Keyed question storage shared by every request handler.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    questions: Arc<RwLock<BTreeMap<u64, Question>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for QuestionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionStore {
    pub fn new() -> Self {
        Self {
            questions: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn create(&self, draft: QuestionDraft) -> Question {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let question = Question {
            id,
            question: draft.question,
            quiz_id: draft.quiz_id,
        };
        self.write().insert(id, question.clone());
        question
    }

    pub fn get(&self, id: u64) -> Result<Question, StoreError> {
        self.read().get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    pub fn list(&self) -> Vec<Question> {
        self.read().values().cloned().collect()
    }

    /// Questions of one quiz, in id order. Unknown quizzes have none.
    pub fn find_by_quiz(&self, quiz_id: u64) -> Vec<Question> {
        self.read()
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect()
    }

    pub fn update(&self, id: u64, draft: QuestionDraft) -> Result<Question, StoreError> {
        let mut questions = self.write();
        let question = questions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        question.question = draft.question;
        question.quiz_id = draft.quiz_id;
        Ok(question.clone())
    }

    pub fn delete(&self, id: u64) -> Result<Question, StoreError> {
        self.write().remove(&id).ok_or(StoreError::NotFound(id))
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Inserts `n` sample questions spread over quizzes 0, 1 and 2 when the
    /// store is empty. Returns how many were inserted.
    pub fn seed(&self, n: usize) -> usize {
        if self.count() > 0 {
            return 0;
        }
        for i in 0..n {
            self.create(QuestionDraft {
                question: format!("Questions Tomcat started {i}"),
                quiz_id: (i % 3) as u64,
            });
        }
        tracing::info!(count = n, "seeded question store");
        n
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<u64, Question>> {
        self.questions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<u64, Question>> {
        self.questions.write().unwrap_or_else(PoisonError::into_inner)
    }
}
