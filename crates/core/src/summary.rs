use thiserror::Error;

use crate::model::{Badge, Question, SessionState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("session has not finished")]
    Incomplete,

    #[error("session covers {order} questions but {provided} were provided")]
    QuestionCountMismatch { order: usize, provided: usize },
}

//
// ─── TIERS ─────────────────────────────────────────────────────────────────────
//

/// Speed tier from the average response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTier {
    LightningFast,
    Quick,
    Steady,
}

impl SpeedTier {
    #[must_use]
    pub fn from_avg_response_time(avg_secs: f64) -> Self {
        if avg_secs < 10.0 {
            Self::LightningFast
        } else if avg_secs < 15.0 {
            Self::Quick
        } else {
            Self::Steady
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LightningFast => "Lightning Fast!",
            Self::Quick => "Quick!",
            Self::Steady => "Steady",
        }
    }
}

/// Consistency tier from the best streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyTier {
    Excellent,
    Good,
    Developing,
}

impl ConsistencyTier {
    #[must_use]
    pub fn from_best_streak(best_streak: u32) -> Self {
        match best_streak {
            5.. => Self::Excellent,
            3..=4 => Self::Good,
            _ => Self::Developing,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Developing => "Keep Practicing",
        }
    }
}

/// Mastery tier from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryTier {
    Master,
    Advanced,
    Learning,
}

impl MasteryTier {
    #[must_use]
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            Self::Master
        } else if accuracy >= 70.0 {
            Self::Advanced
        } else {
            Self::Learning
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Master => "Master",
            Self::Advanced => "Advanced",
            Self::Learning => "Learning",
        }
    }
}

/// Headline shown above the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Headline {
    Outstanding,
    GoodJob,
    NiceTry,
}

impl Headline {
    #[must_use]
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 80.0 {
            Self::Outstanding
        } else if accuracy >= 60.0 {
            Self::GoodJob
        } else {
            Self::NiceTry
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Outstanding => "Outstanding Performance!",
            Self::GoodJob => "Good Job! Keep it up!",
            Self::NiceTry => "Nice try! Practice makes perfect!",
        }
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Final statistics for a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub correct_count: usize,
    pub accuracy: f64,
    pub avg_response_time: f64,
    pub speed: SpeedTier,
    pub consistency: ConsistencyTier,
    pub mastery: MasteryTier,
    pub headline: Headline,
    pub score: u32,
    pub best_streak: u32,
    pub badges: Vec<Badge>,
    pub previous_high_score: u32,
    pub is_new_high_score: bool,
    pub duration_secs: i64,
}

impl QuizSummary {
    /// Compute the summary of a finished session.
    ///
    /// `questions` is the collection the session's `order` indexes into.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::Incomplete` if the session has not finished, or
    /// `SummaryError::QuestionCountMismatch` if `questions` does not match the
    /// session's order.
    pub fn from_state(state: &SessionState, questions: &[Question]) -> Result<Self, SummaryError> {
        let Some(completed_at) = state.completed_at() else {
            return Err(SummaryError::Incomplete);
        };
        if state.order().len() != questions.len() {
            return Err(SummaryError::QuestionCountMismatch {
                order: state.order().len(),
                provided: questions.len(),
            });
        }

        let correct_count = state
            .order()
            .iter()
            .filter_map(|&idx| questions.get(idx))
            .filter(|q| {
                state
                    .answer_for(q.id())
                    .is_some_and(|choice| q.is_correct(choice))
            })
            .count();

        let total_questions = questions.len();
        let (accuracy, avg_response_time) = if total_questions == 0 {
            (0.0, 0.0)
        } else {
            #[allow(clippy::cast_precision_loss)]
            let total = total_questions as f64;
            #[allow(clippy::cast_precision_loss)]
            let correct = correct_count as f64;
            (
                correct * 100.0 / total,
                f64::from(state.total_response_time()) / total,
            )
        };

        Ok(Self {
            total_questions,
            answered: state.answers().len(),
            correct_count,
            accuracy,
            avg_response_time,
            speed: SpeedTier::from_avg_response_time(avg_response_time),
            consistency: ConsistencyTier::from_best_streak(state.best_streak()),
            mastery: MasteryTier::from_accuracy(accuracy),
            headline: Headline::from_accuracy(accuracy),
            score: state.score(),
            best_streak: state.best_streak(),
            badges: state.badges().as_slice().to_vec(),
            previous_high_score: state.previous_high_score(),
            is_new_high_score: state.score() > state.previous_high_score(),
            duration_secs: (completed_at - state.started_at()).num_seconds().max(0),
        })
    }
}
