use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::model::{Badge, BadgeSet, QuestionId, SessionId};
use crate::scoring::AnswerScore;

/// Mutable state of one run through the question set.
///
/// The methods keep the session invariants: `position` only moves forward by
/// one, answers are never overwritten, `score` and `total_response_time` never
/// decrease, and `best_streak` tracks the maximum `streak`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    session_id: SessionId,
    order: Vec<usize>,
    position: usize,
    answers: BTreeMap<QuestionId, String>,
    score: u32,
    streak: u32,
    best_streak: u32,
    time_remaining: u32,
    total_response_time: u32,
    badges: BadgeSet,
    previous_high_score: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Fresh state at position 0 with a full clock.
    ///
    /// `order` must be a permutation of the question indices.
    #[must_use]
    pub fn new(
        session_id: SessionId,
        order: Vec<usize>,
        question_timer: u32,
        previous_high_score: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            order,
            position: 0,
            answers: BTreeMap::new(),
            score: 0,
            streak: 0,
            best_streak: 0,
            time_remaining: question_timer,
            total_response_time: 0,
            badges: BadgeSet::new(),
            previous_high_score,
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, String> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn total_response_time(&self) -> u32 {
        self.total_response_time
    }

    #[must_use]
    pub fn badges(&self) -> &BadgeSet {
        &self.badges
    }

    /// High score on record when this session started.
    #[must_use]
    pub fn previous_high_score(&self) -> u32 {
        self.previous_high_score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Index into the question collection for the active position.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.order.get(self.position).copied()
    }

    /// Count down one second, saturating at zero. Returns the new value.
    pub fn tick(&mut self) -> u32 {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.time_remaining
    }

    /// Record an answer for `question_id`.
    ///
    /// Returns false and leaves the state untouched if that question already
    /// has an answer.
    pub fn record_answer(
        &mut self,
        question_id: QuestionId,
        choice: impl Into<String>,
        score: &AnswerScore,
    ) -> bool {
        if self.answers.contains_key(&question_id) {
            return false;
        }
        self.answers.insert(question_id, choice.into());
        self.score = self.score.saturating_add(score.points);
        self.streak = if score.is_correct {
            self.streak.saturating_add(1)
        } else {
            0
        };
        self.best_streak = self.best_streak.max(self.streak);
        self.total_response_time = self.total_response_time.saturating_add(score.time_spent);
        true
    }

    /// A timed-out question breaks the streak and records nothing else.
    pub fn record_timeout(&mut self) {
        self.streak = 0;
    }

    /// Union `badges` into the session's set, returning the newly earned ones.
    pub fn award(&mut self, badges: impl IntoIterator<Item = Badge>) -> Vec<Badge> {
        self.badges.union(badges)
    }

    /// Step to the next position.
    ///
    /// Returns true with a fresh clock if another question follows; returns
    /// false when the step moved past the last question.
    pub fn advance(&mut self, question_timer: u32) -> bool {
        if self.position >= self.order.len() {
            return false;
        }
        self.position += 1;
        if self.position < self.order.len() {
            self.time_remaining = question_timer;
            true
        } else {
            false
        }
    }

    /// Stamp completion. Later calls keep the first timestamp.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        if self.completed_at.is_none() {
            self.completed_at = Some(at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringRules;
    use crate::time::fixed_now;

    fn state(n: usize) -> SessionState {
        SessionState::new(SessionId::new(1), (0..n).collect(), 30, 0, fixed_now())
    }

    fn correct(points: u32, time_spent: u32) -> AnswerScore {
        AnswerScore {
            is_correct: true,
            points,
            time_bonus: 0,
            streak_bonus: 0,
            time_spent,
        }
    }

    #[test]
    fn answers_are_never_overwritten() {
        let mut s = state(2);
        assert!(s.record_answer(QuestionId::new(1), "Paris", &correct(20, 4)));
        assert!(!s.record_answer(QuestionId::new(1), "London", &correct(20, 4)));
        assert_eq!(s.answer_for(QuestionId::new(1)), Some("Paris"));
        assert_eq!(s.score(), 20);
        assert_eq!(s.total_response_time(), 4);
    }

    #[test]
    fn wrong_answer_resets_streak_but_keeps_best() {
        let mut s = state(3);
        s.record_answer(QuestionId::new(1), "a", &correct(10, 1));
        s.record_answer(QuestionId::new(2), "b", &correct(10, 1));
        let wrong = ScoringRules::default().timeout_score();
        s.record_answer(QuestionId::new(3), "c", &wrong);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.best_streak(), 2);
    }

    #[test]
    fn advance_resets_clock_and_stops_at_end() {
        let mut s = state(2);
        s.tick();
        s.tick();
        assert_eq!(s.time_remaining(), 28);
        assert!(s.advance(30));
        assert_eq!(s.position(), 1);
        assert_eq!(s.time_remaining(), 30);
        assert!(!s.advance(30));
        assert_eq!(s.position(), 2);
        assert_eq!(s.current_index(), None);
        assert!(!s.advance(30));
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn tick_saturates_at_zero() {
        let mut s = SessionState::new(SessionId::new(1), vec![0], 1, 0, fixed_now());
        assert_eq!(s.tick(), 0);
        assert_eq!(s.tick(), 0);
    }

    #[test]
    fn complete_keeps_first_timestamp() {
        let mut s = state(1);
        let first = fixed_now();
        s.complete(first);
        s.complete(first + chrono::Duration::seconds(5));
        assert_eq!(s.completed_at(), Some(first));
    }
}
