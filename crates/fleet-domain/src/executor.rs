use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{DomainError, DomainResult};
use crate::registry::DeviceRegistry;
use crate::tracker::ActionTracker;
use crate::types::{Action, ActionStatus, DeviceStatus};

/// The effect side of an action, performed out-of-band from the request
/// cycle. Implementations report success or failure; lifecycle bookkeeping
/// stays with the executor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateEffect: Send + Sync {
    async fn apply(&self, action: &Action) -> anyhow::Result<()>;
}

/// Stand-in update effect that sleeps for a configured duration and reports
/// success. The real flashing mechanism is an external collaborator.
pub struct SimulatedUpdateEffect {
    work_duration: Duration,
}

impl SimulatedUpdateEffect {
    pub fn new(work_duration: Duration) -> Self {
        Self { work_duration }
    }
}

#[async_trait]
impl UpdateEffect for SimulatedUpdateEffect {
    async fn apply(&self, action: &Action) -> anyhow::Result<()> {
        debug!(
            action_id = %action.action_id,
            device_id = %action.device_id,
            "Simulating update work"
        );
        tokio::time::sleep(self.work_duration).await;
        Ok(())
    }
}

/// Hands accepted actions to the executor without blocking the facade.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(&self, action: Action) -> DomainResult<()>;
}

/// `ActionDispatcher` backed by a bounded mpsc queue consumed by
/// `ActionExecutor::run`.
pub struct QueueDispatcher {
    sender: mpsc::Sender<Action>,
}

#[async_trait]
impl ActionDispatcher for QueueDispatcher {
    async fn dispatch(&self, action: Action) -> DomainResult<()> {
        self.sender
            .send(action)
            .await
            .map_err(|e| DomainError::DispatchError(e.to_string()))
    }
}

/// Create the dispatch queue shared between the facade and the executor.
pub fn action_queue(capacity: usize) -> (QueueDispatcher, mpsc::Receiver<Action>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (QueueDispatcher { sender }, receiver)
}

/// Asynchronous worker that drives each dispatched action to a terminal
/// state, reflecting device-side status through the registry as it goes.
pub struct ActionExecutor {
    inner: Arc<ExecutorInner>,
    queue: mpsc::Receiver<Action>,
}

struct ExecutorInner {
    registry: Arc<dyn DeviceRegistry>,
    tracker: Arc<dyn ActionTracker>,
    effect: Arc<dyn UpdateEffect>,
}

impl ActionExecutor {
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        tracker: Arc<dyn ActionTracker>,
        effect: Arc<dyn UpdateEffect>,
        queue: mpsc::Receiver<Action>,
    ) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                registry,
                tracker,
                effect,
            }),
            queue,
        }
    }

    /// Consume the dispatch queue until shutdown, executing each action on
    /// its own task. In-flight executions are drained before returning so a
    /// shutdown never leaves a dangling non-terminal action.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut executions = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Action executor shutdown signal received");
                    break;
                }
                maybe_action = self.queue.recv() => {
                    match maybe_action {
                        Some(action) => {
                            let inner = self.inner.clone();
                            executions.spawn(async move {
                                inner.execute(action).await;
                            });
                        }
                        None => {
                            debug!("Action queue closed, stopping executor");
                            break;
                        }
                    }
                }
            }
        }

        while executions.join_next().await.is_some() {}
        info!("Action executor stopped");
    }
}

impl ExecutorInner {
    async fn execute(&self, action: Action) {
        info!(
            action_id = %action.action_id,
            device_id = %action.device_id,
            "Executing action"
        );

        if let Err(e) = self.begin(&action).await {
            error!(
                action_id = %action.action_id,
                error = %e,
                "Failed to start action execution"
            );
            self.fail(&action, &format!("failed to start: {}", e)).await;
            return;
        }

        match self.effect.apply(&action).await {
            Ok(()) => self.complete(&action).await,
            Err(e) => {
                warn!(
                    action_id = %action.action_id,
                    device_id = %action.device_id,
                    error = %e,
                    "Update effect failed"
                );
                self.fail(&action, &format!("update failed: {}", e)).await;
            }
        }
    }

    async fn begin(&self, action: &Action) -> DomainResult<()> {
        self.registry
            .set_status(&action.device_id, DeviceStatus::Updating)
            .await?;
        self.tracker
            .transition(&action.action_id, ActionStatus::Running, "Update in progress")
            .await
    }

    async fn complete(&self, action: &Action) {
        // For software updates the opaque parameters carry the target
        // firmware version.
        if let Err(e) = self
            .registry
            .set_firmware_version(&action.device_id, &action.parameters)
            .await
        {
            error!(
                action_id = %action.action_id,
                error = %e,
                "Failed to record new firmware version"
            );
            self.fail(&action, &format!("failed to record firmware version: {}", e))
                .await;
            return;
        }

        if let Err(e) = self
            .registry
            .set_status(&action.device_id, DeviceStatus::Idle)
            .await
        {
            error!(
                action_id = %action.action_id,
                error = %e,
                "Failed to return device to idle"
            );
        }

        if let Err(e) = self
            .tracker
            .transition(&action.action_id, ActionStatus::Completed, "Success")
            .await
        {
            error!(
                action_id = %action.action_id,
                error = %e,
                "Failed to record action completion"
            );
        }

        info!(
            action_id = %action.action_id,
            device_id = %action.device_id,
            firmware_version = %action.parameters,
            "Action completed"
        );
    }

    /// The device is left in `Error` rather than reverted; a corrective
    /// action or manual intervention is expected.
    async fn fail(&self, action: &Action, details: &str) {
        if let Err(e) = self
            .registry
            .set_status(&action.device_id, DeviceStatus::Error)
            .await
        {
            error!(
                action_id = %action.action_id,
                error = %e,
                "Failed to mark device as errored"
            );
        }

        if let Err(e) = self
            .tracker
            .transition(&action.action_id, ActionStatus::Failed, details)
            .await
        {
            error!(
                action_id = %action.action_id,
                error = %e,
                "Failed to record action failure"
            );
        }
    }
}
