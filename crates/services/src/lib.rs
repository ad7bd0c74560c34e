#![forbid(unsafe_code)]

pub mod error;
pub mod fallback;
pub mod high_score;
pub mod question_source;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{QuestionSourceError, RunnerError, SessionError};
pub use high_score::{HIGH_SCORE_KEY, HighScoreService};
pub use question_source::{QuestionSource, QuestionSourceConfig};

pub use sessions::{
    AdvanceOutcome, AnswerOutcome, PendingAdvance, QuestionView, QuizHandle, QuizRunner,
    QuizUpdate, RunnerConfig, SessionEngine, SessionPhase, TickOutcome,
};
