use thiserror::Error;

use crate::model::{Badge, Question, SessionState};

/// Seconds on the clock at the start of every question.
pub const QUESTION_TIMER_SECS: u32 = 30;

const HOT_STREAK_LENGTH: u32 = 3;
const CENTURY_SCORE: u32 = 100;
const SPEED_DEMON_TIME_BONUS: u32 = 8;
const PRECISION_MASTER_STREAK: u32 = 5;
const QUICK_THINKER_SECS: u32 = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("question timer must be at least one second")]
    ZeroTimer,
    #[error("{field} must be non-zero")]
    ZeroDivisor { field: &'static str },
}

//
// ─── ANSWER SCORE ──────────────────────────────────────────────────────────────
//

/// Scoring breakdown for one answered (or timed-out) question.
///
/// `time_bonus` is reported even for wrong answers since badges look at it;
/// only `points` is zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerScore {
    pub is_correct: bool,
    pub points: u32,
    pub time_bonus: u32,
    pub streak_bonus: u32,
    pub time_spent: u32,
}

/// Post-update view of a session used to decide which badges fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeContext {
    pub streak: u32,
    pub best_streak: u32,
    pub score: u32,
    pub time_bonus: u32,
    pub time_spent: u32,
}

impl BadgeContext {
    /// Context for `state` right after `answer` was recorded into it.
    #[must_use]
    pub fn after(state: &SessionState, answer: &AnswerScore) -> Self {
        Self {
            streak: state.streak(),
            best_streak: state.best_streak(),
            score: state.score(),
            time_bonus: answer.time_bonus,
            time_spent: answer.time_spent,
        }
    }
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Point and badge rules for a quiz.
///
/// # Examples
///
/// ```
/// # use quiz_core::scoring::ScoringRules;
/// let rules = ScoringRules::default();
/// assert_eq!(rules.time_bonus(30), 10);
/// assert_eq!(rules.streak_bonus(6), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    question_timer: u32,
    time_bonus_divisor: u32,
    streak_step: u32,
    streak_bonus: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            question_timer: QUESTION_TIMER_SECS,
            time_bonus_divisor: 3,
            streak_step: 3,
            streak_bonus: 5,
        }
    }
}

impl ScoringRules {
    /// Build custom rules.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError` if the timer, divisor, or streak step is zero.
    pub fn try_new(
        question_timer: u32,
        time_bonus_divisor: u32,
        streak_step: u32,
        streak_bonus: u32,
    ) -> Result<Self, ScoringError> {
        if question_timer == 0 {
            return Err(ScoringError::ZeroTimer);
        }
        if time_bonus_divisor == 0 {
            return Err(ScoringError::ZeroDivisor {
                field: "time_bonus_divisor",
            });
        }
        if streak_step == 0 {
            return Err(ScoringError::ZeroDivisor {
                field: "streak_step",
            });
        }
        Ok(Self {
            question_timer,
            time_bonus_divisor,
            streak_step,
            streak_bonus,
        })
    }

    #[must_use]
    pub fn question_timer(&self) -> u32 {
        self.question_timer
    }

    #[must_use]
    pub fn time_bonus(&self, time_remaining: u32) -> u32 {
        time_remaining / self.time_bonus_divisor
    }

    #[must_use]
    pub fn streak_bonus(&self, streak: u32) -> u32 {
        (streak / self.streak_step).saturating_mul(self.streak_bonus)
    }

    #[must_use]
    pub fn time_spent(&self, time_remaining: u32) -> u32 {
        self.question_timer.saturating_sub(time_remaining)
    }

    /// Score `choice` against `question`.
    ///
    /// `streak` is the streak before this answer is counted.
    #[must_use]
    pub fn score_answer(
        &self,
        question: &Question,
        choice: &str,
        time_remaining: u32,
        streak: u32,
    ) -> AnswerScore {
        let is_correct = question.is_correct(choice);
        let time_bonus = self.time_bonus(time_remaining);
        let streak_bonus = self.streak_bonus(streak);
        let points = if is_correct {
            question
                .points()
                .saturating_add(time_bonus)
                .saturating_add(streak_bonus)
        } else {
            0
        };

        AnswerScore {
            is_correct,
            points,
            time_bonus,
            streak_bonus,
            time_spent: self.time_spent(time_remaining),
        }
    }

    /// Score for a question whose countdown ran out.
    #[must_use]
    pub fn timeout_score(&self) -> AnswerScore {
        AnswerScore {
            is_correct: false,
            points: 0,
            time_bonus: 0,
            streak_bonus: 0,
            time_spent: self.question_timer,
        }
    }

    /// Badges whose conditions hold for `ctx`. Already-held badges are not
    /// filtered here; `BadgeSet` drops repeats.
    #[must_use]
    pub fn evaluate_badges(&self, ctx: &BadgeContext) -> Vec<Badge> {
        let mut earned = Vec::new();
        if ctx.streak == HOT_STREAK_LENGTH {
            earned.push(Badge::HotStreak);
        }
        if ctx.score >= CENTURY_SCORE {
            earned.push(Badge::Century);
        }
        if ctx.time_bonus >= SPEED_DEMON_TIME_BONUS {
            earned.push(Badge::SpeedDemon);
        }
        if ctx.best_streak >= PRECISION_MASTER_STREAK {
            earned.push(Badge::PrecisionMaster);
        }
        if ctx.time_spent < QUICK_THINKER_SECS {
            earned.push(Badge::QuickThinker);
        }
        earned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionDraft, QuestionId};

    fn paris() -> Question {
        QuestionDraft {
            id: QuestionId::new(1),
            prompt: "What is the capital of France?".into(),
            options: vec!["London".into(), "Berlin".into(), "Paris".into()],
            correct_answer: "Paris".into(),
            points: 10,
            category: "Geography".into(),
        }
        .validate()
        .unwrap()
    }

    fn ctx(streak: u32, best_streak: u32, score: u32, time_bonus: u32, time_spent: u32) -> BadgeContext {
        BadgeContext {
            streak,
            best_streak,
            score,
            time_bonus,
            time_spent,
        }
    }

    #[test]
    fn correct_answer_with_full_clock_and_no_streak() {
        let score = ScoringRules::default().score_answer(&paris(), "Paris", 30, 0);
        assert!(score.is_correct);
        assert_eq!(score.time_bonus, 10);
        assert_eq!(score.streak_bonus, 0);
        assert_eq!(score.points, 20);
        assert_eq!(score.time_spent, 0);
    }

    #[test]
    fn correct_answer_with_streak_bonus() {
        let score = ScoringRules::default().score_answer(&paris(), "Paris", 9, 6);
        assert_eq!(score.time_bonus, 3);
        assert_eq!(score.streak_bonus, 10);
        assert_eq!(score.points, 23);
        assert_eq!(score.time_spent, 21);
    }

    #[test]
    fn wrong_answer_scores_zero_but_keeps_time_bonus() {
        let score = ScoringRules::default().score_answer(&paris(), "London", 27, 4);
        assert!(!score.is_correct);
        assert_eq!(score.points, 0);
        assert_eq!(score.time_bonus, 9);
    }

    #[test]
    fn timeout_spends_the_whole_timer() {
        let score = ScoringRules::default().timeout_score();
        assert_eq!(score.points, 0);
        assert_eq!(score.time_spent, QUESTION_TIMER_SECS);
    }

    #[test]
    fn hot_streak_fires_only_at_exactly_three() {
        let rules = ScoringRules::default();
        assert!(rules.evaluate_badges(&ctx(3, 3, 40, 0, 20)).contains(&Badge::HotStreak));
        assert!(!rules.evaluate_badges(&ctx(4, 4, 40, 0, 20)).contains(&Badge::HotStreak));
    }

    #[test]
    fn all_conditions_can_fire_together() {
        let badges = ScoringRules::default().evaluate_badges(&ctx(3, 5, 100, 9, 2));
        assert_eq!(
            badges,
            vec![
                Badge::HotStreak,
                Badge::Century,
                Badge::SpeedDemon,
                Badge::PrecisionMaster,
                Badge::QuickThinker
            ]
        );
    }

    #[test]
    fn slow_streak_answer_only_keeps_precision_master() {
        // timeRemaining 9 with a prior streak of 6: bonus 3, streak becomes 7.
        let badges = ScoringRules::default().evaluate_badges(&ctx(7, 7, 90, 3, 21));
        assert_eq!(badges, vec![Badge::PrecisionMaster]);
    }

    #[test]
    fn try_new_rejects_zero_divisors() {
        assert_eq!(ScoringRules::try_new(0, 3, 3, 5), Err(ScoringError::ZeroTimer));
        assert!(matches!(
            ScoringRules::try_new(30, 0, 3, 5),
            Err(ScoringError::ZeroDivisor { .. })
        ));
        assert!(ScoringRules::try_new(20, 2, 4, 10).is_ok());
    }
}
