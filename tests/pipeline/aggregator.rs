//! Bulk enrichment under partial failure.

use super::test_utils::{question_for, Behavior, ScriptedQuestionService};
use quiz_resilience_circuitbreaker::CircuitBreakerConfig;
use quiz_service::{Quiz, QuizAggregator, ResilientInvoker};

fn quizzes(ids: impl IntoIterator<Item = u64>) -> Vec<Quiz> {
    ids.into_iter()
        .map(|id| Quiz {
            id,
            title: format!("Quiz {id}"),
        })
        .collect()
}

#[tokio::test]
async fn failing_ids_are_empty_and_others_enriched() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    client.fail_ids(&[2, 5]);
    let aggregator = QuizAggregator::new(ResilientInvoker::builder(client.clone()).build());

    let views = aggregator.enrich_all(quizzes(1..=6)).await;

    assert_eq!(views.len(), 6);
    for view in views {
        assert_eq!(view.title, format!("Quiz {}", view.id));
        if view.id == 2 || view.id == 5 {
            assert!(view.questions.is_empty(), "quiz {} should be empty", view.id);
        } else {
            assert_eq!(view.questions, vec![question_for(view.id)]);
        }
    }
    assert_eq!(client.calls(), 6);
}

#[tokio::test]
async fn list_through_a_large_window_breaker_survives_a_few_failures() {
    let client = ScriptedQuestionService::new(Behavior::Healthy);
    client.fail_ids(&[3]);
    let breaker = CircuitBreakerConfig::builder().sliding_window_size(20).build();
    let aggregator = QuizAggregator::new(
        ResilientInvoker::builder(client.clone())
            .circuit_breaker(breaker.clone())
            .build(),
    );

    let views = aggregator.enrich_all(quizzes(1..=10)).await;

    assert!(!breaker.is_open());
    let enriched = views.iter().filter(|v| !v.questions.is_empty()).count();
    assert_eq!(enriched, 9);
}
