//! Proto ↔ domain mapping for the device management service.

use fleet_domain::{Action, ActionStatus, ActionType, Device, DeviceStatus, DomainError, DomainResult};
use fleet_proto::device::v1::{
    ActionStatus as ProtoActionStatus, ActionType as ProtoActionType, Device as ProtoDevice,
    DeviceStatus as ProtoDeviceStatus,
};

pub fn to_proto_device_status(status: DeviceStatus) -> ProtoDeviceStatus {
    match status {
        DeviceStatus::Unknown => ProtoDeviceStatus::Unknown,
        DeviceStatus::Idle => ProtoDeviceStatus::Idle,
        DeviceStatus::Busy => ProtoDeviceStatus::Busy,
        DeviceStatus::Offline => ProtoDeviceStatus::Offline,
        DeviceStatus::Maintenance => ProtoDeviceStatus::Maintenance,
        DeviceStatus::Updating => ProtoDeviceStatus::Updating,
        DeviceStatus::Error => ProtoDeviceStatus::Error,
    }
}

pub fn to_domain_device_status(status: ProtoDeviceStatus) -> DeviceStatus {
    match status {
        ProtoDeviceStatus::Unknown => DeviceStatus::Unknown,
        ProtoDeviceStatus::Idle => DeviceStatus::Idle,
        ProtoDeviceStatus::Busy => DeviceStatus::Busy,
        ProtoDeviceStatus::Offline => DeviceStatus::Offline,
        ProtoDeviceStatus::Maintenance => DeviceStatus::Maintenance,
        ProtoDeviceStatus::Updating => DeviceStatus::Updating,
        ProtoDeviceStatus::Error => DeviceStatus::Error,
    }
}

pub fn to_proto_action_status(status: ActionStatus) -> ProtoActionStatus {
    match status {
        ActionStatus::Pending => ProtoActionStatus::Pending,
        ActionStatus::Running => ProtoActionStatus::Running,
        ActionStatus::Completed => ProtoActionStatus::Completed,
        ActionStatus::Failed => ProtoActionStatus::Failed,
    }
}

/// Decode the wire action type. Unspecified and out-of-range values are
/// rejected rather than defaulted.
pub fn to_domain_action_type(raw: i32) -> DomainResult<ActionType> {
    match ProtoActionType::try_from(raw) {
        Ok(ProtoActionType::SoftwareUpdate) => Ok(ActionType::SoftwareUpdate),
        Ok(ProtoActionType::Unspecified) => Err(DomainError::InvalidActionType(
            "action type must be specified".to_string(),
        )),
        Err(_) => Err(DomainError::InvalidActionType(format!(
            "unrecognized action type value {}",
            raw
        ))),
    }
}

/// Decode the wire device status for `SetDeviceStatus`.
pub fn to_domain_device_status_from_wire(raw: i32) -> DomainResult<DeviceStatus> {
    ProtoDeviceStatus::try_from(raw)
        .map(to_domain_device_status)
        .map_err(|_| {
            DomainError::InvalidDeviceStatus(format!("unrecognized device status value {}", raw))
        })
}

/// Convert domain Device to its wire representation.
pub fn to_proto_device(device: Device) -> ProtoDevice {
    ProtoDevice {
        id: device.device_id,
        firmware_version: device.firmware_version,
        status: to_proto_device_status(device.status).into(),
    }
}

pub fn action_status_wire_value(action: &Action) -> i32 {
    to_proto_action_status(action.status).into()
}
