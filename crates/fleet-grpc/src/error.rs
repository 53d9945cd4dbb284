use fleet_domain::DomainError;
use tonic::Status;

/// Convert domain error to gRPC Status.
///
/// Validation failures that the protocol reports in-band (duplicate id on
/// register, missing or busy device on initiate) are handled in the
/// individual handlers and never reach this mapping from those paths.
pub fn domain_error_to_status(error: DomainError) -> Status {
    match error {
        DomainError::DeviceNotFound(msg) | DomainError::ActionNotFound(msg) => {
            Status::not_found(msg)
        }

        DomainError::DeviceAlreadyExists(msg) => Status::already_exists(msg),

        DomainError::DeviceBusy(msg) => Status::failed_precondition(msg),

        DomainError::InvalidDeviceId(msg)
        | DomainError::InvalidActionType(msg)
        | DomainError::InvalidDeviceStatus(msg) => Status::invalid_argument(msg),

        // Defect class: should not occur given correct executor logic.
        DomainError::InvalidTransition(msg) => Status::internal(msg),

        DomainError::DispatchError(msg) => Status::internal(msg),

        DomainError::RepositoryError(err) => Status::internal(format!("Internal error: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_not_found_mapping() {
        let status = domain_error_to_status(DomainError::DeviceNotFound("dev-1".to_string()));
        assert_eq!(status.code(), Code::NotFound);

        let status = domain_error_to_status(DomainError::ActionNotFound("a-1".to_string()));
        assert_eq!(status.code(), Code::NotFound);
    }

    #[test]
    fn test_invalid_argument_mapping() {
        let status = domain_error_to_status(DomainError::InvalidDeviceId("empty".to_string()));
        assert_eq!(status.code(), Code::InvalidArgument);

        let status =
            domain_error_to_status(DomainError::InvalidActionType("unspecified".to_string()));
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[test]
    fn test_defects_map_to_internal() {
        let status =
            domain_error_to_status(DomainError::InvalidTransition("bad transition".to_string()));
        assert_eq!(status.code(), Code::Internal);

        let status =
            domain_error_to_status(DomainError::DispatchError("queue closed".to_string()));
        assert_eq!(status.code(), Code::Internal);
    }
}
