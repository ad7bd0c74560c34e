use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};

use quiz_core::model::{Badge, Question, QuestionId, SessionId, SessionState};
use quiz_core::scoring::{AnswerScore, BadgeContext, ScoringRules};
use quiz_core::summary::{QuizSummary, SummaryError};
use quiz_core::Clock;

use crate::error::SessionError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Token for the delayed step after an answer.
///
/// Only applies while the same session is still waiting on the same question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingAdvance {
    pub session_id: SessionId,
    pub question_id: QuestionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub choice: String,
    pub correct_answer: String,
    pub score: AnswerScore,
    pub new_badges: Vec<Badge>,
    pub total_score: u32,
    pub streak: u32,
    /// Set when this answer pushed the score past the known high score.
    pub new_high_score: Option<u32>,
    pub pending: PendingAdvance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion { position: usize },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { time_remaining: u32 },
    /// The active question is answered and waiting on its scheduled advance.
    Paused { time_remaining: u32 },
    TimedOut {
        question_id: QuestionId,
        advance: AdvanceOutcome,
    },
}

/// Read-only snapshot of the active question for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub session_id: SessionId,
    pub position: usize,
    pub total: usize,
    pub question: Question,
    pub time_remaining: u32,
    pub score: u32,
    pub streak: u32,
    pub selected: Option<String>,
    /// Revealed once the question has been answered.
    pub correct_answer: Option<String>,
}

impl QuestionView {
    /// One-based progress label, e.g. `3 / 10`.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.position + 1, self.total)
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Synchronous quiz state machine: `NotStarted -> InProgress -> Finished`.
///
/// Owns no timers. A driver feeds it ticks once per second and applies the
/// `PendingAdvance` returned from `submit_answer` after a delay; see
/// `QuizRunner`.
pub struct SessionEngine {
    questions: Vec<Question>,
    rules: ScoringRules,
    rng: Box<dyn RngCore + Send>,
    clock: Clock,
    phase: SessionPhase,
    state: Option<SessionState>,
    pending: Option<PendingAdvance>,
    high_score: u32,
    next_session: SessionId,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            rules: ScoringRules::default(),
            rng: Box::new(StdRng::from_os_rng()),
            clock: Clock::default(),
            phase: SessionPhase::NotStarted,
            state: None,
            pending: None,
            high_score: 0,
            next_session: SessionId::new(1),
        }
    }

    /// Replace the random source used to shuffle question order.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: ScoringRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Known high score. Read into the next session when it starts.
    pub fn set_high_score(&mut self, high_score: u32) {
        self.high_score = high_score;
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Question at the active position, if a session is in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        let idx = self.state.as_ref()?.current_index()?;
        self.questions.get(idx)
    }

    #[must_use]
    pub fn view(&self) -> Option<QuestionView> {
        let question = self.current_question()?;
        let state = self.state.as_ref()?;
        let selected = state.answer_for(question.id()).map(str::to_owned);
        let correct_answer = selected
            .as_ref()
            .map(|_| question.correct_answer().to_owned());

        Some(QuestionView {
            session_id: state.session_id(),
            position: state.position(),
            total: state.order().len(),
            question: question.clone(),
            time_remaining: state.time_remaining(),
            score: state.score(),
            streak: state.streak(),
            selected,
            correct_answer,
        })
    }

    /// Start a session over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SessionActive` while a session is in progress
    /// (use `retry`), or `SessionError::Empty` for an empty collection.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), SessionError> {
        if self.phase == SessionPhase::InProgress {
            tracing::debug!("start ignored, session in progress");
            return Err(SessionError::SessionActive);
        }
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        self.questions = questions;
        self.begin();
        Ok(())
    }

    /// Discard the current session, if any, and start over with the loaded
    /// questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoQuestions` if `start` never succeeded.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if self.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        self.begin();
        Ok(())
    }

    fn begin(&mut self) {
        let mut order: Vec<usize> = (0..self.questions.len()).collect();
        order.shuffle(&mut *self.rng);

        let session_id = self.next_session;
        self.next_session = session_id.next();
        self.state = Some(SessionState::new(
            session_id,
            order,
            self.rules.question_timer(),
            self.high_score,
            self.clock.now(),
        ));
        self.pending = None;
        self.phase = SessionPhase::InProgress;

        tracing::info!(
            session = %session_id,
            questions = self.questions.len(),
            high_score = self.high_score,
            "quiz session started"
        );
    }

    /// Answer the active question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside a session,
    /// `SessionError::AlreadyAnswered` for a second answer to the same
    /// question, or `SessionError::TimeExpired` once the clock reads zero.
    /// State is untouched in every error case.
    pub fn submit_answer(&mut self, choice: &str) -> Result<AnswerOutcome, SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let rules = self.rules;
        let idx = self
            .state
            .as_ref()
            .and_then(SessionState::current_index)
            .ok_or(SessionError::NotInProgress)?;
        let question = self.questions.get(idx).ok_or(SessionError::NotInProgress)?;
        let state = self.state.as_mut().ok_or(SessionError::NotInProgress)?;
        let question_id = question.id();

        if state.answer_for(question_id).is_some() {
            tracing::debug!(question = %question_id, "duplicate answer ignored");
            return Err(SessionError::AlreadyAnswered(question_id));
        }
        if state.time_remaining() == 0 {
            return Err(SessionError::TimeExpired(question_id));
        }

        let score = rules.score_answer(question, choice, state.time_remaining(), state.streak());
        state.record_answer(question_id, choice, &score);
        let earned = rules.evaluate_badges(&BadgeContext::after(state, &score));
        let new_badges = state.award(earned);

        let new_high_score = (state.score() > self.high_score).then(|| state.score());
        if let Some(best) = new_high_score {
            self.high_score = best;
        }

        let pending = PendingAdvance {
            session_id: state.session_id(),
            question_id,
        };
        self.pending = Some(pending);

        tracing::debug!(
            question = %question_id,
            correct = score.is_correct,
            points = score.points,
            total = state.score(),
            "answer recorded"
        );

        Ok(AnswerOutcome {
            question_id,
            choice: choice.to_owned(),
            correct_answer: question.correct_answer().to_owned(),
            score,
            new_badges,
            total_score: state.score(),
            streak: state.streak(),
            new_high_score,
            pending,
        })
    }

    /// Count the active question down by one second.
    ///
    /// Reaching zero times the question out: the streak resets, nothing is
    /// recorded in the answers, and the session advances immediately.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside a session.
    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        let rules = self.rules;
        let pending = self.pending;
        let state = self.state.as_mut().ok_or(SessionError::NotInProgress)?;

        if pending.is_some() {
            return Ok(TickOutcome::Paused {
                time_remaining: state.time_remaining(),
            });
        }

        let time_remaining = state.tick();
        if time_remaining > 0 {
            return Ok(TickOutcome::Counting { time_remaining });
        }

        let question_id = state
            .current_index()
            .and_then(|idx| self.questions.get(idx))
            .map(Question::id)
            .ok_or(SessionError::NotInProgress)?;

        state.record_timeout();
        let timeout = rules.timeout_score();
        let earned = rules.evaluate_badges(&BadgeContext::after(state, &timeout));
        state.award(earned);
        tracing::debug!(question = %question_id, "question timed out");

        let advance = self.step();
        Ok(TickOutcome::TimedOut {
            question_id,
            advance,
        })
    }

    /// Apply a scheduled advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleAdvance` unless `pending` is exactly the
    /// advance this session is waiting on.
    pub fn advance(&mut self, pending: PendingAdvance) -> Result<AdvanceOutcome, SessionError> {
        if self.phase != SessionPhase::InProgress || self.pending != Some(pending) {
            tracing::debug!(session = %pending.session_id, "stale advance dropped");
            return Err(SessionError::StaleAdvance);
        }
        self.pending = None;
        Ok(self.step())
    }

    fn step(&mut self) -> AdvanceOutcome {
        let timer = self.rules.question_timer();
        let Some(state) = self.state.as_mut() else {
            return AdvanceOutcome::Finished;
        };

        if state.advance(timer) {
            return AdvanceOutcome::NextQuestion {
                position: state.position(),
            };
        }

        state.complete(self.clock.now());
        self.phase = SessionPhase::Finished;
        tracing::info!(
            session = %state.session_id(),
            score = state.score(),
            best_streak = state.best_streak(),
            "quiz session finished"
        );
        AdvanceOutcome::Finished
    }

    /// Statistics for the finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if no session has finished.
    pub fn summary(&self) -> Result<QuizSummary, SessionError> {
        let state = self.state.as_ref().ok_or(SummaryError::Incomplete)?;
        Ok(QuizSummary::from_state(state, &self.questions)?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
