/// Operational status of a managed device.
///
/// The discriminants are the wire values expected by every client; they must
/// not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum DeviceStatus {
    Unknown = 0,
    Idle = 1,
    Busy = 2,
    Offline = 3,
    Maintenance = 4,
    Updating = 5,
    Error = 6,
}

/// Lifecycle status of a tracked action.
///
/// Transitions are monotonic along Pending → Running → {Completed | Failed};
/// skipping forward is legal, leaving a terminal state is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ActionStatus {
    Pending = 0,
    Running = 1,
    Completed = 2,
    Failed = 3,
}

impl ActionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Failed)
    }

    /// Whether `next` is a legal successor of this status.
    pub fn can_transition_to(self, next: ActionStatus) -> bool {
        match self {
            ActionStatus::Pending => next != ActionStatus::Pending,
            ActionStatus::Running => next.is_terminal(),
            ActionStatus::Completed | ActionStatus::Failed => false,
        }
    }
}

/// Kind of device action. Extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    SoftwareUpdate,
}

/// Domain representation of a managed device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub device_id: String,
    pub firmware_version: String,
    pub status: DeviceStatus,
    pub registered_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Domain representation of a tracked action.
///
/// `parameters` is an opaque payload owned by the action type; for
/// `SoftwareUpdate` it carries the target firmware version.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub action_id: String,
    pub device_id: String,
    pub action_type: ActionType,
    pub parameters: String,
    pub status: ActionStatus,
    pub details: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input for registering a new device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDeviceInput {
    pub device_id: String,
    pub initial_firmware_version: String,
}

/// Input for creating a new tracked action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateActionInput {
    pub device_id: String,
    pub action_type: ActionType,
    pub parameters: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_discriminants_are_stable() {
        assert_eq!(DeviceStatus::Unknown as i32, 0);
        assert_eq!(DeviceStatus::Idle as i32, 1);
        assert_eq!(DeviceStatus::Busy as i32, 2);
        assert_eq!(DeviceStatus::Offline as i32, 3);
        assert_eq!(DeviceStatus::Maintenance as i32, 4);
        assert_eq!(DeviceStatus::Updating as i32, 5);
        assert_eq!(DeviceStatus::Error as i32, 6);

        assert_eq!(ActionStatus::Pending as i32, 0);
        assert_eq!(ActionStatus::Running as i32, 1);
        assert_eq!(ActionStatus::Completed as i32, 2);
        assert_eq!(ActionStatus::Failed as i32, 3);
    }

    #[test]
    fn test_pending_successors() {
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Running));
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Completed));
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Failed));
        assert!(!ActionStatus::Pending.can_transition_to(ActionStatus::Pending));
    }

    #[test]
    fn test_running_successors() {
        assert!(ActionStatus::Running.can_transition_to(ActionStatus::Completed));
        assert!(ActionStatus::Running.can_transition_to(ActionStatus::Failed));
        assert!(!ActionStatus::Running.can_transition_to(ActionStatus::Pending));
        assert!(!ActionStatus::Running.can_transition_to(ActionStatus::Running));
    }

    #[test]
    fn test_terminal_states_have_no_successors() {
        for terminal in [ActionStatus::Completed, ActionStatus::Failed] {
            for next in [
                ActionStatus::Pending,
                ActionStatus::Running,
                ActionStatus::Completed,
                ActionStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
