use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{DomainError, DomainResult};
use crate::executor::ActionDispatcher;
use crate::registry::DeviceRegistry;
use crate::tracker::ActionTracker;
use crate::types::{
    Action, CreateActionInput, Device, DeviceStatus, RegisterDeviceInput,
};

/// Domain service for device management business logic.
/// This is the validate-then-delegate layer the gRPC handlers call.
pub struct DeviceManagementService {
    registry: Arc<dyn DeviceRegistry>,
    tracker: Arc<dyn ActionTracker>,
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl DeviceManagementService {
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        tracker: Arc<dyn ActionTracker>,
        dispatcher: Arc<dyn ActionDispatcher>,
    ) -> Self {
        Self {
            registry,
            tracker,
            dispatcher,
        }
    }

    /// Register a new device with the given externally assigned id. New
    /// devices start out idle.
    pub async fn register_device(&self, input: RegisterDeviceInput) -> DomainResult<Device> {
        if input.device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        let device = Device {
            device_id: input.device_id,
            firmware_version: input.initial_firmware_version,
            status: DeviceStatus::Idle,
            registered_at: Some(chrono::Utc::now()),
        };

        debug!(device_id = %device.device_id, "Registering device");
        self.registry.insert(device.clone()).await?;

        info!(device_id = %device.device_id, "Device registered successfully");
        Ok(device)
    }

    /// Look up a device by id.
    pub async fn get_device_info(&self, device_id: &str) -> DomainResult<Device> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        debug!(device_id = %device_id, "Getting device info");

        self.registry
            .get(device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))
    }

    /// Overwrite a device's operational status.
    pub async fn set_device_status(
        &self,
        device_id: &str,
        status: DeviceStatus,
    ) -> DomainResult<()> {
        if device_id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }

        self.registry.set_status(device_id, status).await?;
        info!(device_id = %device_id, status = ?status, "Device status updated");
        Ok(())
    }

    /// Validate, create, and asynchronously dispatch a new action. Returns
    /// the pending action immediately; callers observe progress by polling
    /// `get_action_status`.
    pub async fn initiate_action(&self, input: CreateActionInput) -> DomainResult<Action> {
        let device = self
            .registry
            .get(&input.device_id)
            .await?
            .ok_or_else(|| DomainError::DeviceNotFound(input.device_id.clone()))?;

        if device.status == DeviceStatus::Updating {
            return Err(DomainError::DeviceBusy(format!(
                "device {} is already updating",
                device.device_id
            )));
        }

        // The in-flight guard lives inside `create`: the tracker rejects
        // with DeviceBusy in the same critical section as the insert, so
        // concurrent initiations for one device cannot all be accepted.
        let action = self.tracker.create(input).await?;
        debug!(
            action_id = %action.action_id,
            device_id = %action.device_id,
            "Action created, dispatching to executor"
        );

        if let Err(e) = self.dispatcher.dispatch(action.clone()).await {
            warn!(
                action_id = %action.action_id,
                error = %e,
                "Failed to dispatch action, marking it failed"
            );
            // Bookkeeping failure must not mask the dispatch error.
            if let Err(transition_err) = self
                .tracker
                .transition(
                    &action.action_id,
                    crate::types::ActionStatus::Failed,
                    "dispatch to executor failed",
                )
                .await
            {
                error!(
                    action_id = %action.action_id,
                    error = %transition_err,
                    "Failed to record dispatch failure"
                );
            }
            return Err(e);
        }

        info!(
            action_id = %action.action_id,
            device_id = %action.device_id,
            "Action dispatched"
        );
        Ok(action)
    }

    /// Look up an action by id.
    pub async fn get_action_status(&self, action_id: &str) -> DomainResult<Action> {
        debug!(action_id = %action_id, "Getting action status");

        self.tracker
            .get(action_id)
            .await?
            .ok_or_else(|| DomainError::ActionNotFound(action_id.to_string()))
    }
}
