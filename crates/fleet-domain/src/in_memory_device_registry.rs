use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{DomainError, DomainResult};
use crate::registry::DeviceRegistry;
use crate::types::{Device, DeviceStatus};

/// In-memory implementation of `DeviceRegistry` using a `HashMap`.
///
/// All mutation happens under the write lock, so updates for a given id are
/// serialized and readers only see whole records.
pub struct InMemoryDeviceRegistry {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    async fn insert(&self, device: Device) -> DomainResult<()> {
        let mut devices = self.devices.write().await;
        if devices.contains_key(&device.device_id) {
            return Err(DomainError::DeviceAlreadyExists(device.device_id));
        }
        devices.insert(device.device_id.clone(), device);
        Ok(())
    }

    async fn get(&self, device_id: &str) -> DomainResult<Option<Device>> {
        let devices = self.devices.read().await;
        Ok(devices.get(device_id).cloned())
    }

    async fn set_status(&self, device_id: &str, status: DeviceStatus) -> DomainResult<()> {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(device_id)
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))?;
        device.status = status;
        Ok(())
    }

    async fn set_firmware_version(&self, device_id: &str, version: &str) -> DomainResult<()> {
        let mut devices = self.devices.write().await;
        let device = devices
            .get_mut(device_id)
            .ok_or_else(|| DomainError::DeviceNotFound(device_id.to_string()))?;
        device.firmware_version = version.to_string();
        Ok(())
    }
}
