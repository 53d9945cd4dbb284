use async_trait::async_trait;

use crate::error::DomainResult;
use crate::types::{Action, ActionStatus, CreateActionInput};

/// Storage contract for tracked actions.
///
/// The tracker is the single source of truth polled by clients; the executor
/// records progress exclusively through `transition`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionTracker: Send + Sync {
    /// Create a new action with a freshly generated, collision-free id and
    /// status `Pending`. Fails with `DeviceBusy` if a non-terminal action
    /// already targets the device; the check and the insert happen in one
    /// critical section, so concurrent creates for the same device can never
    /// both be accepted. Does not validate that the device exists; the
    /// facade verifies that before invoking this.
    async fn create(&self, input: CreateActionInput) -> DomainResult<Action>;

    /// Move an action to `new_status`, recording `details`. Fails with
    /// `ActionNotFound` for unknown ids and `InvalidTransition` when
    /// `new_status` is not a legal successor of the current status.
    /// Conflicting concurrent transitions are never both accepted.
    async fn transition(
        &self,
        action_id: &str,
        new_status: ActionStatus,
        details: &str,
    ) -> DomainResult<()>;

    /// Look up an action by id. Pure read, no side effects.
    async fn get(&self, action_id: &str) -> DomainResult<Option<Action>>;

    /// The non-terminal action currently targeting `device_id`, if any.
    /// At most one exists at a time; `create` enforces that.
    async fn active_for_device(&self, device_id: &str) -> DomainResult<Option<Action>>;
}
