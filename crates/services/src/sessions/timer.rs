use std::time::Duration;

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use quiz_core::model::SessionId;

use super::engine::PendingAdvance;
use super::runner::QuizCommand;

/// Identifies which question a tick was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TickTag {
    pub session_id: SessionId,
    pub position: usize,
}

/// Once-per-period tick source for one question.
///
/// Released on drop: the task is aborted, so no tick for this tag is queued
/// after the owner has let go of it.
pub(crate) struct QuestionTimer {
    tag: TickTag,
    task: JoinHandle<()>,
}

impl QuestionTimer {
    pub(crate) fn start(
        tag: TickTag,
        period: Duration,
        commands: WeakUnboundedSender<QuizCommand>,
    ) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(tx) = commands.upgrade() else {
                    break;
                };
                if tx.send(QuizCommand::Tick(tag)).is_err() {
                    break;
                }
            }
        });
        Self { tag, task }
    }

    pub(crate) fn tag(&self) -> TickTag {
        self.tag
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Delayed delivery of a `PendingAdvance`. Cancelled on drop.
pub(crate) struct ScheduledAdvance {
    task: JoinHandle<()>,
}

impl ScheduledAdvance {
    pub(crate) fn start(
        delay: Duration,
        pending: PendingAdvance,
        commands: WeakUnboundedSender<QuizCommand>,
    ) -> Self {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = commands.upgrade() {
                let _ = tx.send(QuizCommand::Advance(pending));
            }
        });
        Self { task }
    }
}

impl Drop for ScheduledAdvance {
    fn drop(&mut self) {
        self.task.abort();
    }
}
