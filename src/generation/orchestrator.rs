//! Batch orchestrator: runs N identical generation units sequentially or concurrently.
//! Owns per-unit state transitions and the aggregate tally; the service call stays in its domain.
//!
//! Units move `pending -> processing -> {succeeded | failed}` and never go back. A failed
//! unit is recorded and the batch carries on; once started a batch always completes with a
//! [`Summary`].

use crate::error::ApiError;
use crate::generation::observer::{BatchEvent, BatchObserver};
use crate::generation::request::GenerationRequest;
use crate::generation::service::{GenerationOutput, GenerationService};
use crate::settings::GenerationMode;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One failed unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitError {
    pub unit_index: usize,
    pub message: String,
}

/// Counter snapshot. `waiting + processing + succeeded + failed == total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub total: usize,
    pub waiting: usize,
    pub processing: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchProgress {
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Renders as `succeeded/total`.
impl fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.total)
    }
}

/// Final outcome of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub mode: GenerationMode,
    pub succeeded: usize,
    pub failed: usize,
    /// Sum of declared costs of successful units
    pub accumulated_cost: f64,
    /// In completion order
    pub errors: Vec<UnitError>,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// All failure messages as one report, one line per failed unit.
    pub fn error_report(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("- #{}: {}", e.unit_index + 1, e.message))
            .collect();
        Some(lines.join("\n"))
    }
}

/// Working state of one `run` invocation. Never outlives it.
#[derive(Debug)]
pub struct BatchJob {
    total: usize,
    mode: GenerationMode,
    waiting: usize,
    processing: usize,
    succeeded: usize,
    failed: usize,
    accumulated_cost: f64,
    errors: Vec<UnitError>,
}

impl BatchJob {
    fn new(total: usize, mode: GenerationMode) -> Self {
        Self {
            total,
            mode,
            waiting: total,
            processing: 0,
            succeeded: 0,
            failed: 0,
            accumulated_cost: 0.0,
            errors: Vec::new(),
        }
    }

    fn start_unit(&mut self) {
        self.waiting = self.waiting.saturating_sub(1);
        self.processing += 1;
    }

    fn record_success(&mut self, cost: Option<f64>) {
        self.processing = self.processing.saturating_sub(1);
        self.succeeded += 1;
        if let Some(cost) = cost.filter(|c| c.is_finite() && *c >= 0.0) {
            self.accumulated_cost += cost;
        }
    }

    fn record_failure(&mut self, unit_index: usize, message: String) {
        self.processing = self.processing.saturating_sub(1);
        self.failed += 1;
        self.errors.push(UnitError {
            unit_index,
            message,
        });
    }

    pub fn progress(&self) -> BatchProgress {
        BatchProgress {
            total: self.total,
            waiting: self.waiting,
            processing: self.processing,
            succeeded: self.succeeded,
            failed: self.failed,
        }
    }

    fn into_summary(self) -> Summary {
        Summary {
            total: self.total,
            mode: self.mode,
            succeeded: self.succeeded,
            failed: self.failed,
            accumulated_cost: self.accumulated_cost,
            errors: self.errors,
        }
    }
}

/// Runs batches against a [`GenerationService`].
pub struct BatchOrchestrator<S> {
    service: S,
}

impl<S: GenerationService> BatchOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run `total` units of `request` and report the outcome.
    ///
    /// Errors only when the batch cannot start (`total == 0` or an invalid request);
    /// unit failures are part of the returned [`Summary`].
    pub async fn run(
        &self,
        request: &GenerationRequest,
        total: usize,
        mode: GenerationMode,
        observer: &dyn BatchObserver,
    ) -> Result<Summary, ApiError> {
        if total == 0 {
            return Err(ApiError::Validation(
                "Batch count must be at least 1".to_string(),
            ));
        }
        request.validate()?;

        let job = Mutex::new(BatchJob::new(total, mode));
        observer.observe(&BatchEvent::BatchStarted { total, mode });

        match mode {
            GenerationMode::Sequential => {
                for unit_index in 0..total {
                    self.begin_unit(&job, unit_index, observer);
                    let _ = self.finish_unit(&job, unit_index, request, observer).await;
                }
            }
            GenerationMode::Parallel => {
                // Every unit is started before any response is awaited.
                for unit_index in 0..total {
                    self.begin_unit(&job, unit_index, observer);
                }
                let mut in_flight: FuturesUnordered<_> = (0..total)
                    .map(|unit_index| self.finish_unit(&job, unit_index, request, observer))
                    .collect();
                while in_flight.next().await.is_some() {}
            }
        }

        let summary = job.into_inner().into_summary();
        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch settled"
        );
        observer.observe(&BatchEvent::BatchCompleted {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    fn begin_unit(&self, job: &Mutex<BatchJob>, unit_index: usize, observer: &dyn BatchObserver) {
        let progress = {
            let mut job = job.lock();
            job.start_unit();
            job.progress()
        };
        observer.observe(&BatchEvent::UnitStarted {
            unit_index,
            progress,
        });
    }

    /// Issue the call for a started unit and record its terminal state.
    async fn finish_unit(
        &self,
        job: &Mutex<BatchJob>,
        unit_index: usize,
        request: &GenerationRequest,
        observer: &dyn BatchObserver,
    ) -> Result<GenerationOutput, ApiError> {
        match self.service.generate(request).await {
            Ok(output) => {
                let progress = {
                    let mut job = job.lock();
                    job.record_success(output.cost());
                    job.progress()
                };
                observer.observe(&BatchEvent::UnitSucceeded {
                    unit_index,
                    output: output.clone(),
                    progress,
                });
                Ok(output)
            }
            Err(err) => {
                let message = err.unit_message();
                let progress = {
                    let mut job = job.lock();
                    job.record_failure(unit_index, message.clone());
                    job.progress()
                };
                observer.observe(&BatchEvent::UnitFailed {
                    unit_index,
                    message,
                    status: err.status(),
                    progress,
                });
                Err(err)
            }
        }
    }
}
