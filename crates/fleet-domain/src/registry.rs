use async_trait::async_trait;

use crate::error::DomainResult;
use crate::types::{Device, DeviceStatus};

/// Storage contract for device records.
///
/// All device mutation goes through these operations; mutations for a given
/// id are serialized by the implementation so reads never observe torn
/// records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Insert a new device. Fails with `DeviceAlreadyExists` if the id is
    /// already registered.
    async fn insert(&self, device: Device) -> DomainResult<()>;

    /// Look up a device by id. Pure read, no side effects.
    async fn get(&self, device_id: &str) -> DomainResult<Option<Device>>;

    /// Overwrite a device's operational status. Fails with `DeviceNotFound`
    /// if the id is unknown.
    async fn set_status(&self, device_id: &str, status: DeviceStatus) -> DomainResult<()>;

    /// Overwrite a device's firmware version. Fails with `DeviceNotFound`
    /// if the id is unknown.
    async fn set_firmware_version(&self, device_id: &str, version: &str) -> DomainResult<()>;
}
