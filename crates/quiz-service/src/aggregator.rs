//! Attaches remotely fetched questions to stored quizzes.

use crate::invoker::ResilientInvoker;
use crate::model::{Quiz, QuizView};
use futures::future::join_all;

/// Builds [`QuizView`]s, one guarded fetch per quiz.
#[derive(Debug, Clone)]
pub struct QuizAggregator {
    invoker: ResilientInvoker,
}

impl QuizAggregator {
    pub fn new(invoker: ResilientInvoker) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &ResilientInvoker {
        &self.invoker
    }

    /// Fetches the questions for one quiz.
    pub async fn enrich(&self, quiz: Quiz) -> QuizView {
        let questions = self.invoker.invoke(quiz.id).await;
        QuizView::new(quiz, questions)
    }

    /// Fetches the questions for every quiz concurrently.
    ///
    /// Output order matches input order. Each quiz gets the result of its own
    /// fetch; a failed fetch leaves only that quiz's questions empty.
    pub async fn enrich_all(&self, quizzes: Vec<Quiz>) -> Vec<QuizView> {
        join_all(quizzes.into_iter().map(|quiz| self.enrich(quiz))).await
    }
}
