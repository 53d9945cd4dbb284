pub mod device_service;
pub mod error;
pub mod executor;
pub mod in_memory_action_tracker;
pub mod in_memory_device_registry;
pub mod registry;
pub mod tracker;
pub mod types;

pub use device_service::DeviceManagementService;
pub use error::{DomainError, DomainResult};
pub use executor::{
    action_queue, ActionDispatcher, ActionExecutor, QueueDispatcher, SimulatedUpdateEffect,
    UpdateEffect,
};
pub use in_memory_action_tracker::InMemoryActionTracker;
pub use in_memory_device_registry::InMemoryDeviceRegistry;
pub use registry::DeviceRegistry;
pub use tracker::ActionTracker;
pub use types::*;
