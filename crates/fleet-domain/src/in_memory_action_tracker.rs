use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{DomainError, DomainResult};
use crate::tracker::ActionTracker;
use crate::types::{Action, ActionStatus, CreateActionInput};

/// In-memory implementation of `ActionTracker` using a `HashMap`.
///
/// Creates and transitions are check-and-set under the write lock: two
/// concurrent creates for the same device cannot both be accepted, and two
/// conflicting transitions on the same action cannot both succeed; the loser
/// observes the winner's write and fails with `DeviceBusy` or
/// `InvalidTransition` respectively.
pub struct InMemoryActionTracker {
    actions: RwLock<HashMap<String, Action>>,
}

impl InMemoryActionTracker {
    pub fn new() -> Self {
        Self {
            actions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryActionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionTracker for InMemoryActionTracker {
    async fn create(&self, input: CreateActionInput) -> DomainResult<Action> {
        let mut actions = self.actions.write().await;

        // The busy check must share the critical section with the insert;
        // otherwise two concurrent creates for the same device could both
        // pass it and both be accepted.
        if let Some(active) = actions
            .values()
            .find(|action| action.device_id == input.device_id && !action.status.is_terminal())
        {
            return Err(DomainError::DeviceBusy(format!(
                "device {} already has action {} in flight",
                input.device_id, active.action_id
            )));
        }

        let action = Action {
            action_id: xid::new().to_string(),
            device_id: input.device_id,
            action_type: input.action_type,
            parameters: input.parameters,
            status: ActionStatus::Pending,
            details: "Pending dispatch".to_string(),
            created_at: Some(chrono::Utc::now()),
        };

        actions.insert(action.action_id.clone(), action.clone());
        Ok(action)
    }

    async fn transition(
        &self,
        action_id: &str,
        new_status: ActionStatus,
        details: &str,
    ) -> DomainResult<()> {
        let mut actions = self.actions.write().await;
        let action = actions
            .get_mut(action_id)
            .ok_or_else(|| DomainError::ActionNotFound(action_id.to_string()))?;

        if !action.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidTransition(format!(
                "action {} cannot move from {:?} to {:?}",
                action_id, action.status, new_status
            )));
        }

        action.status = new_status;
        action.details = details.to_string();
        Ok(())
    }

    async fn get(&self, action_id: &str) -> DomainResult<Option<Action>> {
        let actions = self.actions.read().await;
        Ok(actions.get(action_id).cloned())
    }

    async fn active_for_device(&self, device_id: &str) -> DomainResult<Option<Action>> {
        let actions = self.actions.read().await;
        Ok(actions
            .values()
            .find(|action| action.device_id == device_id && !action.status.is_terminal())
            .cloned())
    }
}
