//! Debounced settings auto-save.
//!
//! Every edit hands the full settings snapshot to [`AutoSaver::touch`]. A background task
//! holds only the newest snapshot and pushes it once no further edit arrived for the
//! configured delay. Status transitions are published on a `watch` channel.

use crate::error::ApiError;
use crate::settings::StudioSettings;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Destination of saved settings (the studio server's `/config` in production).
#[async_trait]
pub trait SettingsSink: Send + Sync + 'static {
    async fn save(&self, settings: &StudioSettings) -> Result<(), ApiError>;
}

/// Sync state of the most recent edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing edited yet
    Idle,
    /// An edit is waiting for the quiet period or is being pushed
    Syncing,
    Synced,
    Failed(String),
}

enum Command {
    Touch(StudioSettings),
    Flush(oneshot::Sender<Result<(), ApiError>>),
    Shutdown(oneshot::Sender<Result<(), ApiError>>),
}

/// Handle to the auto-save task.
pub struct AutoSaver {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawn the save task on the current tokio runtime.
    pub fn spawn<S: SettingsSink>(sink: S, delay: Duration) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let task = tokio::spawn(run_saver(sink, delay, rx, status_tx));
        Self {
            commands,
            status,
            task,
        }
    }

    /// Record an edit. Restarts the quiet-period timer.
    pub fn touch(&self, settings: StudioSettings) -> Result<(), ApiError> {
        self.commands
            .send(Command::Touch(settings))
            .map_err(|_| ApiError::ConfigError("Auto-save task has stopped".to_string()))
    }

    /// Push the pending snapshot now instead of waiting for the timer.
    pub async fn flush(&self) -> Result<(), ApiError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Flush(reply))
            .map_err(|_| ApiError::ConfigError("Auto-save task has stopped".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::ConfigError("Auto-save task dropped the flush".to_string()))?
    }

    /// Flush anything pending and stop the task.
    pub async fn shutdown(self) -> Result<(), ApiError> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Command::Shutdown(reply)).is_err() {
            return Ok(());
        }
        let result = response
            .await
            .map_err(|_| ApiError::ConfigError("Auto-save task dropped the shutdown".to_string()))?;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Auto-save task ended abnormally");
        }
        result
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Receiver for observing status changes.
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

async fn run_saver<S: SettingsSink>(
    sink: S,
    delay: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<SaveStatus>,
) {
    let mut pending: Option<StudioSettings> = None;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Touch(settings)) => {
                    pending = Some(settings);
                    deadline = Instant::now() + delay;
                    let _ = status.send(SaveStatus::Syncing);
                }
                Some(Command::Flush(reply)) => {
                    let result = save_pending(&sink, &mut pending, &status).await;
                    let _ = reply.send(result);
                }
                Some(Command::Shutdown(reply)) => {
                    let result = save_pending(&sink, &mut pending, &status).await;
                    let _ = reply.send(result);
                    break;
                }
                None => {
                    // Handle dropped without shutdown: still push the last edit.
                    let _ = save_pending(&sink, &mut pending, &status).await;
                    break;
                }
            },
            _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                let _ = save_pending(&sink, &mut pending, &status).await;
            }
        }
    }
}

async fn save_pending<S: SettingsSink>(
    sink: &S,
    pending: &mut Option<StudioSettings>,
    status: &watch::Sender<SaveStatus>,
) -> Result<(), ApiError> {
    let Some(settings) = pending.take() else {
        return Ok(());
    };
    match sink.save(&settings).await {
        Ok(()) => {
            debug!("Settings synced");
            let _ = status.send(SaveStatus::Synced);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Settings auto-save failed");
            let _ = status.send(SaveStatus::Failed(e.to_string()));
            Err(e)
        }
    }
}
