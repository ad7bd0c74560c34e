//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuestionId;
use quiz_core::summary::SummaryError;

/// Reasons the remote question source could not be used.
///
/// Never shown to the player: `QuestionSource::load` logs these and falls
/// back to the bundled questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("remote question source is disabled")]
    Disabled,
    #[error("question request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("question payload is not a JSON array")]
    NotAnArray,
    #[error("question payload is empty")]
    EmptyPayload,
    #[error("question record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
}

/// Rejected or failed session operations.
///
/// Apart from `Empty` and `Summary`, every variant is an invalid transition:
/// the engine leaves its state untouched when returning one.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("no questions have been loaded yet")]
    NoQuestions,
    #[error("a session is already in progress")]
    SessionActive,
    #[error("no session is in progress")]
    NotInProgress,
    #[error("question {0} has already been answered")]
    AlreadyAnswered(QuestionId),
    #[error("time ran out for question {0}")]
    TimeExpired(QuestionId),
    #[error("scheduled advance no longer applies")]
    StaleAdvance,
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Errors emitted by the quiz runner handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RunnerError {
    #[error("quiz runner has stopped")]
    Stopped,
}
