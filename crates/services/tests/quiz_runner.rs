use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use quiz_core::model::{Question, QuestionDraft, QuestionId};
use quiz_core::time::fixed_clock;
use services::{
    HIGH_SCORE_KEY, HighScoreService, QuizHandle, QuizRunner, QuizUpdate, RunnerConfig,
    RunnerError, SessionEngine, SessionError,
};
use storage::repository::{InMemoryRepository, KeyValueStore, StorageError};

fn question(id: i64) -> Question {
    QuestionDraft {
        id: QuestionId::new(id),
        prompt: format!("Question {id}?"),
        options: vec!["right".into(), "wrong".into()],
        correct_answer: "right".into(),
        points: 10,
        category: "General".into(),
    }
    .validate()
    .unwrap()
}

/// Holds a stale high score and refuses every write.
struct ReadOnlyStore;

#[async_trait::async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(Some("15".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }
}

fn spawn(
    count: i64,
    repo: Arc<dyn KeyValueStore>,
) -> (QuizHandle, UnboundedReceiver<QuizUpdate>, tokio::task::JoinHandle<()>) {
    let engine = SessionEngine::new()
        .with_rng(StdRng::seed_from_u64(7))
        .with_clock(fixed_clock());
    QuizRunner::spawn(
        (1..=count).map(question).collect(),
        engine,
        HighScoreService::new(repo),
        RunnerConfig::default(),
    )
}

async fn next(updates: &mut UnboundedReceiver<QuizUpdate>) -> QuizUpdate {
    updates.recv().await.expect("runner publishes updates")
}

#[tokio::test(start_paused = true)]
async fn countdown_times_out_and_opens_next_question() {
    let (handle, mut updates, _task) = spawn(2, Arc::new(InMemoryRepository::new()));
    handle.start().unwrap();

    let QuizUpdate::Started(view) = next(&mut updates).await else {
        panic!("expected Started");
    };
    assert_eq!(view.time_remaining, 30);
    assert_eq!(view.progress(), (1, 2));
    let started = Instant::now();

    for expected in (0..30).rev() {
        assert_eq!(
            next(&mut updates).await,
            QuizUpdate::Tick {
                time_remaining: expected
            }
        );
    }
    assert_eq!(
        next(&mut updates).await,
        QuizUpdate::TimedOut {
            question_id: view.question.id()
        }
    );
    let QuizUpdate::Question(next_view) = next(&mut updates).await else {
        panic!("expected Question");
    };
    assert_eq!(next_view.position, 1);
    assert_eq!(next_view.time_remaining, 30);
    assert_eq!(next_view.streak, 0);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
}

#[tokio::test(start_paused = true)]
async fn answer_holds_feedback_before_advancing() {
    let (handle, mut updates, _task) = spawn(2, Arc::new(InMemoryRepository::new()));
    handle.start().unwrap();
    assert!(matches!(next(&mut updates).await, QuizUpdate::Started(_)));

    let started = Instant::now();
    handle.submit_answer("right").unwrap();
    let QuizUpdate::Answered(outcome) = next(&mut updates).await else {
        panic!("expected Answered");
    };
    assert_eq!(outcome.score.points, 20);
    assert_eq!(outcome.correct_answer, "right");

    handle.submit_answer("wrong").unwrap();
    assert!(matches!(
        next(&mut updates).await,
        QuizUpdate::Rejected(SessionError::AlreadyAnswered(_))
    ));

    let QuizUpdate::Question(view) = next(&mut updates).await else {
        panic!("expected Question");
    };
    assert_eq!(view.position, 1);
    assert_eq!(view.score, 20);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1500) && elapsed < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn finishing_publishes_summary_and_persists_high_score() {
    let repo = Arc::new(InMemoryRepository::new());
    repo.set(HIGH_SCORE_KEY, "15").await.unwrap();
    let (handle, mut updates, _task) = spawn(2, repo.clone());

    handle.start().unwrap();
    let QuizUpdate::Started(view) = next(&mut updates).await else {
        panic!("expected Started");
    };
    assert_eq!(view.score, 0);

    handle.submit_answer("right").unwrap();
    let QuizUpdate::Answered(first) = next(&mut updates).await else {
        panic!("expected Answered");
    };
    assert_eq!(first.new_high_score, Some(20));
    assert_eq!(repo.get(HIGH_SCORE_KEY).await.unwrap().as_deref(), Some("20"));
    assert!(matches!(next(&mut updates).await, QuizUpdate::Question(_)));

    handle.submit_answer("right").unwrap();
    assert!(matches!(next(&mut updates).await, QuizUpdate::Answered(_)));
    let QuizUpdate::Finished(summary) = next(&mut updates).await else {
        panic!("expected Finished");
    };

    assert_eq!(summary.score, 40);
    assert_eq!(summary.correct_count, 2);
    assert_eq!(summary.previous_high_score, 15);
    assert!(summary.is_new_high_score);
    assert_eq!(repo.get(HIGH_SCORE_KEY).await.unwrap().as_deref(), Some("40"));

    handle.submit_answer("right").unwrap();
    assert_eq!(
        next(&mut updates).await,
        QuizUpdate::Rejected(SessionError::NotInProgress)
    );

    handle.start().unwrap();
    let QuizUpdate::Started(view) = next(&mut updates).await else {
        panic!("expected Started");
    };
    assert_eq!(view.position, 0);
}

#[tokio::test(start_paused = true)]
async fn retry_discards_the_pending_advance() {
    let (handle, mut updates, _task) = spawn(3, Arc::new(InMemoryRepository::new()));
    handle.start().unwrap();
    let QuizUpdate::Started(first) = next(&mut updates).await else {
        panic!("expected Started");
    };

    handle.submit_answer("right").unwrap();
    assert!(matches!(next(&mut updates).await, QuizUpdate::Answered(_)));
    handle.retry().unwrap();

    let QuizUpdate::Started(view) = next(&mut updates).await else {
        panic!("expected Started");
    };
    assert_ne!(view.session_id, first.session_id);
    assert_eq!(view.position, 0);
    assert_eq!(view.score, 0);
    assert_eq!(view.selected, None);

    assert_eq!(
        next(&mut updates).await,
        QuizUpdate::Tick { time_remaining: 29 }
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_commands_are_rejected_without_stopping() {
    let (handle, mut updates, task) = spawn(1, Arc::new(InMemoryRepository::new()));

    handle.submit_answer("right").unwrap();
    assert_eq!(
        next(&mut updates).await,
        QuizUpdate::Rejected(SessionError::NotInProgress)
    );

    handle.start().unwrap();
    assert!(matches!(next(&mut updates).await, QuizUpdate::Started(_)));
    handle.start().unwrap();
    assert_eq!(
        next(&mut updates).await,
        QuizUpdate::Rejected(SessionError::SessionActive)
    );

    handle.shutdown().unwrap();
    task.await.unwrap();
    assert_eq!(handle.start(), Err(RunnerError::Stopped));
    assert!(updates.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn retry_before_any_start_begins_a_session() {
    let (handle, mut updates, _task) = spawn(2, Arc::new(InMemoryRepository::new()));
    handle.retry().unwrap();

    let QuizUpdate::Started(view) = next(&mut updates).await else {
        panic!("expected Started");
    };
    assert_eq!(view.position, 0);
    assert_eq!(view.total, 2);
    assert_eq!(view.time_remaining, 30);
}

#[tokio::test(start_paused = true)]
async fn rejected_start_keeps_the_session_best_over_stale_storage() {
    let (handle, mut updates, _task) = spawn(2, Arc::new(ReadOnlyStore));

    handle.start().unwrap();
    assert!(matches!(next(&mut updates).await, QuizUpdate::Started(_)));
    handle.submit_answer("right").unwrap();
    let QuizUpdate::Answered(first) = next(&mut updates).await else {
        panic!("expected Answered");
    };
    assert_eq!(first.new_high_score, Some(20));

    handle.start().unwrap();
    assert_eq!(
        next(&mut updates).await,
        QuizUpdate::Rejected(SessionError::SessionActive)
    );

    handle.retry().unwrap();
    assert!(matches!(next(&mut updates).await, QuizUpdate::Started(_)));
    handle.submit_answer("right").unwrap();
    let QuizUpdate::Answered(again) = next(&mut updates).await else {
        panic!("expected Answered");
    };
    assert_eq!(again.total_score, 20);
    assert_eq!(again.new_high_score, None);
}
