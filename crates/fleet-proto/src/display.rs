//! Display labels for the wire enums.
//!
//! The wire representation is the stable integer; these label tables are the
//! single place clients map enum values to human-readable strings. The
//! matches are exhaustive so adding an enum variant without a label fails to
//! compile instead of silently rendering as a fallback.

use crate::device::v1::{ActionStatus, ActionType, DeviceStatus};

pub fn device_status_label(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Unknown => "UNKNOWN",
        DeviceStatus::Idle => "IDLE",
        DeviceStatus::Busy => "BUSY",
        DeviceStatus::Offline => "OFFLINE",
        DeviceStatus::Maintenance => "MAINTENANCE",
        DeviceStatus::Updating => "UPDATING",
        DeviceStatus::Error => "ERROR",
    }
}

pub fn action_status_label(status: ActionStatus) -> &'static str {
    match status {
        ActionStatus::Pending => "PENDING",
        ActionStatus::Running => "RUNNING",
        ActionStatus::Completed => "COMPLETED",
        ActionStatus::Failed => "FAILED",
    }
}

pub fn action_type_label(action_type: ActionType) -> &'static str {
    match action_type {
        ActionType::Unspecified => "UNSPECIFIED",
        ActionType::SoftwareUpdate => "SOFTWARE_UPDATE",
    }
}
