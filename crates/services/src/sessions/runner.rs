use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;

use quiz_core::model::{Question, QuestionId};
use quiz_core::summary::QuizSummary;

use crate::error::{RunnerError, SessionError};
use crate::high_score::HighScoreService;

use super::engine::{
    AdvanceOutcome, AnswerOutcome, PendingAdvance, QuestionView, SessionEngine, SessionPhase,
    TickOutcome,
};
use super::timer::{QuestionTimer, ScheduledAdvance, TickTag};

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Period of the countdown.
    pub tick_interval: Duration,
    /// Pause between an answer and the next question, so feedback stays visible.
    pub advance_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            advance_delay: Duration::from_millis(1500),
        }
    }
}

//
// ─── MESSAGES ──────────────────────────────────────────────────────────────────
//

/// Events published to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizUpdate {
    Started(QuestionView),
    Tick { time_remaining: u32 },
    Answered(AnswerOutcome),
    TimedOut { question_id: QuestionId },
    Question(QuestionView),
    Finished(QuizSummary),
    Rejected(SessionError),
}

#[derive(Debug)]
pub(crate) enum QuizCommand {
    Start,
    Retry,
    Submit(String),
    Tick(TickTag),
    Advance(PendingAdvance),
    Shutdown,
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Cloneable sender side of a running quiz.
#[derive(Clone)]
pub struct QuizHandle {
    commands: UnboundedSender<QuizCommand>,
}

impl QuizHandle {
    /// # Errors
    ///
    /// Returns `RunnerError::Stopped` if the runner has exited.
    pub fn start(&self) -> Result<(), RunnerError> {
        self.send(QuizCommand::Start)
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Stopped` if the runner has exited.
    pub fn retry(&self) -> Result<(), RunnerError> {
        self.send(QuizCommand::Retry)
    }

    /// # Errors
    ///
    /// Returns `RunnerError::Stopped` if the runner has exited.
    pub fn submit_answer(&self, choice: impl Into<String>) -> Result<(), RunnerError> {
        self.send(QuizCommand::Submit(choice.into()))
    }

    /// Stop the runner and release its timers.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::Stopped` if the runner has already exited.
    pub fn shutdown(&self) -> Result<(), RunnerError> {
        self.send(QuizCommand::Shutdown)
    }

    fn send(&self, command: QuizCommand) -> Result<(), RunnerError> {
        self.commands
            .send(command)
            .map_err(|_| RunnerError::Stopped)
    }
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Async driver around a `SessionEngine`.
///
/// A single task owns the engine and applies commands, ticks, and scheduled
/// advances one at a time. The countdown timer exists only while a question
/// is open; the post-answer advance is a cancellable task tagged with the
/// session it belongs to.
pub struct QuizRunner {
    engine: SessionEngine,
    questions: Vec<Question>,
    high_scores: HighScoreService,
    config: RunnerConfig,
    commands: WeakUnboundedSender<QuizCommand>,
    updates: UnboundedSender<QuizUpdate>,
    timer: Option<QuestionTimer>,
    scheduled: Option<ScheduledAdvance>,
}

impl QuizRunner {
    /// Spawn the runner task.
    ///
    /// The task ends on `shutdown` or once every `QuizHandle` is dropped.
    #[must_use]
    pub fn spawn(
        questions: Vec<Question>,
        engine: SessionEngine,
        high_scores: HighScoreService,
        config: RunnerConfig,
    ) -> (QuizHandle, UnboundedReceiver<QuizUpdate>, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let runner = Self {
            engine,
            questions,
            high_scores,
            config,
            commands: command_tx.downgrade(),
            updates: update_tx,
            timer: None,
            scheduled: None,
        };
        let task = tokio::spawn(runner.run(command_rx));

        (
            QuizHandle {
                commands: command_tx,
            },
            update_rx,
            task,
        )
    }

    async fn run(mut self, mut commands: UnboundedReceiver<QuizCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                QuizCommand::Start => self.on_start(false).await,
                QuizCommand::Retry => self.on_start(true).await,
                QuizCommand::Submit(choice) => self.on_submit(&choice).await,
                QuizCommand::Tick(tag) => self.on_tick(tag),
                QuizCommand::Advance(pending) => self.on_advance(pending),
                QuizCommand::Shutdown => break,
            }
        }
        self.release();
        tracing::debug!("quiz runner stopped");
    }

    async fn on_start(&mut self, retry: bool) {
        // The in-memory best can be ahead of storage when a write failed.
        let known = self.engine.high_score();
        let high_score = self.high_scores.load().await.max(known);
        self.engine.set_high_score(high_score);

        let result = if retry && self.engine.phase() != SessionPhase::NotStarted {
            self.engine.retry()
        } else {
            self.engine.start(self.questions.clone())
        };
        if let Err(err) = result {
            self.engine.set_high_score(known);
            self.emit(QuizUpdate::Rejected(err));
            return;
        }

        self.release();
        self.open_question();
        if let Some(view) = self.engine.view() {
            self.emit(QuizUpdate::Started(view));
        }
    }

    async fn on_submit(&mut self, choice: &str) {
        let outcome = match self.engine.submit_answer(choice) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.emit(QuizUpdate::Rejected(err));
                return;
            }
        };

        self.timer = None;
        if let Some(score) = outcome.new_high_score {
            if let Err(err) = self.high_scores.record(score).await {
                tracing::warn!(error = %err, score, "failed to persist high score");
            }
        }
        self.scheduled = Some(ScheduledAdvance::start(
            self.config.advance_delay,
            outcome.pending,
            self.commands.clone(),
        ));
        self.emit(QuizUpdate::Answered(outcome));
    }

    fn on_tick(&mut self, tag: TickTag) {
        if self.timer.as_ref().map(QuestionTimer::tag) != Some(tag) {
            tracing::debug!(session = %tag.session_id, position = tag.position, "stale tick dropped");
            return;
        }

        match self.engine.tick() {
            Ok(TickOutcome::Counting { time_remaining }) => {
                self.emit(QuizUpdate::Tick { time_remaining });
            }
            Ok(TickOutcome::Paused { .. }) => {}
            Ok(TickOutcome::TimedOut {
                question_id,
                advance,
            }) => {
                self.emit(QuizUpdate::Tick { time_remaining: 0 });
                self.emit(QuizUpdate::TimedOut { question_id });
                self.after_advance(advance);
            }
            Err(err) => tracing::debug!(error = %err, "tick ignored"),
        }
    }

    fn on_advance(&mut self, pending: PendingAdvance) {
        match self.engine.advance(pending) {
            Ok(advance) => {
                self.scheduled = None;
                self.after_advance(advance);
            }
            Err(err) => tracing::debug!(error = %err, "advance ignored"),
        }
    }

    fn after_advance(&mut self, advance: AdvanceOutcome) {
        match advance {
            AdvanceOutcome::NextQuestion { .. } => {
                self.open_question();
                if let Some(view) = self.engine.view() {
                    self.emit(QuizUpdate::Question(view));
                }
            }
            AdvanceOutcome::Finished => {
                self.release();
                match self.engine.summary() {
                    Ok(summary) => self.emit(QuizUpdate::Finished(summary)),
                    Err(err) => tracing::warn!(error = %err, "finished session has no summary"),
                }
            }
        }
    }

    /// Replace the countdown with a fresh one for the active question.
    fn open_question(&mut self) {
        self.timer = self.engine.state().map(|state| {
            QuestionTimer::start(
                TickTag {
                    session_id: state.session_id(),
                    position: state.position(),
                },
                self.config.tick_interval,
                self.commands.clone(),
            )
        });
    }

    fn release(&mut self) {
        self.timer = None;
        self.scheduled = None;
    }

    fn emit(&self, update: QuizUpdate) {
        if self.updates.send(update).is_err() {
            tracing::debug!("quiz update dropped, no listener");
        }
    }
}
