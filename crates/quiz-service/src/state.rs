//! Wiring of the stores, guards and aggregators shared by the handlers.

use crate::aggregator::QuizAggregator;
use crate::client::QuestionClient;
use crate::invoker::ResilientInvoker;
use crate::registry::ResilienceRegistry;
use crate::settings::{Guards, Settings};
use crate::store::QuizStore;
use std::sync::Arc;

/// State handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: QuizStore,
    /// Aggregator behind `GET /quiz/{id}`.
    pub get_quiz: QuizAggregator,
    /// Aggregator behind `GET /quiz`.
    pub list_quizzes: QuizAggregator,
    pub registry: Arc<ResilienceRegistry>,
    /// Dependency name of the question service.
    pub dependency: String,
}

impl AppState {
    /// Builds one invoker per endpoint, sharing the question service's guards
    /// between them through a fresh registry.
    pub fn new(settings: &Settings, store: QuizStore, client: Arc<dyn QuestionClient>) -> Self {
        let registry = Arc::new(ResilienceRegistry::new());

        let invoker = |guards: Guards| {
            let name = &settings.question_service.name;
            let mut builder = ResilientInvoker::builder(Arc::clone(&client))
                .dependency(name.clone())
                .call_timeout(settings.client_timeout());
            if guards.rate_limiter {
                builder =
                    builder.rate_limiter(registry.rate_limiter(name, || settings.build_rate_limiter()));
            }
            if guards.circuit_breaker {
                builder = builder
                    .circuit_breaker(registry.circuit_breaker(name, || settings.build_circuit_breaker()));
            }
            builder.build()
        };

        let get_quiz = QuizAggregator::new(invoker(settings.endpoints.get_quiz()));
        let list_quizzes = QuizAggregator::new(invoker(settings.endpoints.list_quizzes()));

        tracing::debug!(
            dependency = %settings.question_service.name,
            get_quiz = ?get_quiz.invoker(),
            list_quizzes = ?list_quizzes.invoker(),
            "resilient invokers configured"
        );

        Self {
            store,
            get_quiz,
            list_quizzes,
            registry,
            dependency: settings.question_service.name.clone(),
        }
    }
}
