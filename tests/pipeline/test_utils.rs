//! Scriptable stand-in for the question service.

use futures::future::BoxFuture;
use quiz_service::{Question, QuestionClient, QuizId, TransportError, TransportErrorKind};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answers with one question per quiz.
    Healthy,
    /// Answers with exactly these questions, whatever the quiz.
    Respond(Vec<Question>),
    Fail(TransportErrorKind),
    /// Never answers within any reasonable timeout.
    Hang,
}

pub struct ScriptedQuestionService {
    behavior: Mutex<Behavior>,
    failing_ids: Mutex<HashSet<QuizId>>,
    calls: AtomicUsize,
}

impl ScriptedQuestionService {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            failing_ids: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Makes only these quiz ids fail; others follow the behavior.
    pub fn fail_ids(&self, ids: &[QuizId]) {
        *self.failing_ids.lock().unwrap() = ids.iter().copied().collect();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn question_for(quiz_id: QuizId) -> Question {
    Question {
        id: quiz_id * 100,
        question: format!("Question for quiz {quiz_id}"),
        quiz_id,
    }
}

impl QuestionClient for ScriptedQuestionService {
    fn fetch_questions(
        &self,
        quiz_id: QuizId,
    ) -> BoxFuture<'_, Result<Vec<Question>, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().unwrap().clone();
        let failing = self.failing_ids.lock().unwrap().contains(&quiz_id);

        Box::pin(async move {
            if failing {
                return Err(TransportError::new(TransportErrorKind::Status(500), quiz_id));
            }
            match behavior {
                Behavior::Healthy => Ok(vec![question_for(quiz_id)]),
                Behavior::Respond(questions) => Ok(questions),
                Behavior::Fail(kind) => Err(TransportError::new(kind, quiz_id)),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        })
    }
}
