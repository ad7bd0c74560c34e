mod engine;
mod runner;
mod timer;

pub use engine::{
    AdvanceOutcome, AnswerOutcome, PendingAdvance, QuestionView, SessionEngine, SessionPhase,
    TickOutcome,
};
pub use runner::{QuizHandle, QuizRunner, QuizUpdate, RunnerConfig};
