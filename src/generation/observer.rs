//! Batch lifecycle events and the observers that consume them.

use crate::generation::orchestrator::{BatchProgress, Summary};
use crate::generation::service::GenerationOutput;
use crate::settings::GenerationMode;
use serde::Serialize;
use tracing::{info, warn};

/// Observation emitted by the orchestrator. Delivered synchronously, in emission order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    BatchStarted {
        total: usize,
        mode: GenerationMode,
    },
    UnitStarted {
        unit_index: usize,
        progress: BatchProgress,
    },
    UnitSucceeded {
        unit_index: usize,
        output: GenerationOutput,
        progress: BatchProgress,
    },
    UnitFailed {
        unit_index: usize,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        progress: BatchProgress,
    },
    BatchCompleted {
        summary: Summary,
    },
}

impl BatchEvent {
    /// Counters after this event, when the event carries them.
    pub fn progress(&self) -> Option<&BatchProgress> {
        match self {
            BatchEvent::UnitStarted { progress, .. }
            | BatchEvent::UnitSucceeded { progress, .. }
            | BatchEvent::UnitFailed { progress, .. } => Some(progress),
            _ => None,
        }
    }
}

/// Receives batch events. Must not block; it runs between unit suspension points.
pub trait BatchObserver: Send + Sync {
    fn observe(&self, event: &BatchEvent);
}

impl BatchObserver for () {
    fn observe(&self, _event: &BatchEvent) {}
}

impl<F> BatchObserver for F
where
    F: Fn(&BatchEvent) + Send + Sync,
{
    fn observe(&self, event: &BatchEvent) {
        self(event)
    }
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BatchObserver for TracingObserver {
    fn observe(&self, event: &BatchEvent) {
        match event {
            BatchEvent::BatchStarted { total, mode } => {
                info!(total, mode = %mode, "Batch started")
            }
            BatchEvent::UnitStarted {
                unit_index,
                progress,
            } => info!(
                unit_index,
                waiting = progress.waiting,
                processing = progress.processing,
                "Unit started"
            ),
            BatchEvent::UnitSucceeded {
                unit_index,
                output,
                progress,
            } => info!(
                unit_index,
                cost = output.cost(),
                done = %progress,
                "Unit succeeded"
            ),
            BatchEvent::UnitFailed {
                unit_index,
                message,
                status,
                ..
            } => warn!(unit_index, status = *status, error = %message, "Unit failed"),
            BatchEvent::BatchCompleted { summary } => info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                cost = summary.accumulated_cost,
                "Batch completed"
            ),
        }
    }
}

/// Fans one event out to several observers.
pub struct ObserverSet<'a> {
    observers: Vec<&'a dyn BatchObserver>,
}

impl<'a> ObserverSet<'a> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn with(mut self, observer: &'a dyn BatchObserver) -> Self {
        self.observers.push(observer);
        self
    }
}

impl Default for ObserverSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchObserver for ObserverSet<'_> {
    fn observe(&self, event: &BatchEvent) {
        for observer in &self.observers {
            observer.observe(event);
        }
    }
}
