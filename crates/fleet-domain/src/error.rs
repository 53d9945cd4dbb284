use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device already exists: {0}")]
    DeviceAlreadyExists(String),

    #[error("Device is busy: {0}")]
    DeviceBusy(String),

    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(String),

    #[error("Invalid action type: {0}")]
    InvalidActionType(String),

    #[error("Invalid device status: {0}")]
    InvalidDeviceStatus(String),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Invalid action status transition: {0}")]
    InvalidTransition(String),

    #[error("Failed to dispatch action to executor: {0}")]
    DispatchError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
