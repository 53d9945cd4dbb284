use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, instrument};

use fleet_domain::{
    CreateActionInput, DeviceManagementService, DomainError, RegisterDeviceInput,
};
use fleet_proto::device::v1::device_management_server::DeviceManagement;
use fleet_proto::device::v1::{
    GetDeviceActionStatusRequest, GetDeviceActionStatusResponse, GetDeviceInfoRequest,
    GetDeviceInfoResponse, InitiateDeviceActionRequest, InitiateDeviceActionResponse,
    RegisterDeviceRequest, RegisterDeviceResponse, SetDeviceStatusRequest,
    SetDeviceStatusResponse,
};

use crate::conversions::{
    action_status_wire_value, to_domain_action_type, to_domain_device_status_from_wire,
    to_proto_device,
};
use crate::error::domain_error_to_status;

/// gRPC handler for the DeviceManagement service.
/// Handles proto → domain mapping and error conversion; business logic
/// lives in the domain service.
pub struct DeviceManagementHandler {
    domain_service: Arc<DeviceManagementService>,
}

impl DeviceManagementHandler {
    pub fn new(domain_service: Arc<DeviceManagementService>) -> Self {
        Self { domain_service }
    }
}

#[tonic::async_trait]
impl DeviceManagement for DeviceManagementHandler {
    #[instrument(
        name = "RegisterDevice",
        skip(self, request),
        fields(device_id = %request.get_ref().device_id)
    )]
    async fn register_device(
        &self,
        request: Request<RegisterDeviceRequest>,
    ) -> Result<Response<RegisterDeviceResponse>, Status> {
        let req = request.into_inner();

        let input = RegisterDeviceInput {
            device_id: req.device_id,
            initial_firmware_version: req.initial_firmware_version,
        };

        match self.domain_service.register_device(input).await {
            Ok(device) => {
                debug!(device_id = %device.device_id, "Device registered");
                Ok(Response::new(RegisterDeviceResponse {
                    success: true,
                    message: "Device registered successfully.".to_string(),
                }))
            }
            // Duplicate ids are an in-band outcome, not a transport error.
            Err(e @ DomainError::DeviceAlreadyExists(_)) => {
                Ok(Response::new(RegisterDeviceResponse {
                    success: false,
                    message: e.to_string(),
                }))
            }
            Err(e) => Err(domain_error_to_status(e)),
        }
    }

    #[instrument(
        name = "SetDeviceStatus",
        skip(self, request),
        fields(device_id = %request.get_ref().device_id)
    )]
    async fn set_device_status(
        &self,
        request: Request<SetDeviceStatusRequest>,
    ) -> Result<Response<SetDeviceStatusResponse>, Status> {
        let req = request.into_inner();

        let status =
            to_domain_device_status_from_wire(req.status).map_err(domain_error_to_status)?;

        self.domain_service
            .set_device_status(&req.device_id, status)
            .await
            .map_err(domain_error_to_status)?;

        Ok(Response::new(SetDeviceStatusResponse { success: true }))
    }

    #[instrument(
        name = "GetDeviceInfo",
        skip(self, request),
        fields(device_id = %request.get_ref().device_id)
    )]
    async fn get_device_info(
        &self,
        request: Request<GetDeviceInfoRequest>,
    ) -> Result<Response<GetDeviceInfoResponse>, Status> {
        let req = request.into_inner();

        let device = self
            .domain_service
            .get_device_info(&req.device_id)
            .await
            .map_err(domain_error_to_status)?;

        Ok(Response::new(GetDeviceInfoResponse {
            device: Some(to_proto_device(device)),
        }))
    }

    #[instrument(
        name = "InitiateDeviceAction",
        skip(self, request),
        fields(device_id = %request.get_ref().device_id)
    )]
    async fn initiate_device_action(
        &self,
        request: Request<InitiateDeviceActionRequest>,
    ) -> Result<Response<InitiateDeviceActionResponse>, Status> {
        let req = request.into_inner();

        let action_type = to_domain_action_type(req.action_type).map_err(domain_error_to_status)?;

        let input = CreateActionInput {
            device_id: req.device_id,
            action_type,
            parameters: req.parameters,
        };

        match self.domain_service.initiate_action(input).await {
            Ok(action) => {
                debug!(action_id = %action.action_id, "Action initiated");
                Ok(Response::new(InitiateDeviceActionResponse {
                    success: true,
                    message: "Action initiated successfully.".to_string(),
                    action_id: action.action_id,
                }))
            }
            // Precondition failures are reported in-band so the caller can
            // correct the request and retry.
            Err(e @ (DomainError::DeviceNotFound(_) | DomainError::DeviceBusy(_))) => {
                Ok(Response::new(InitiateDeviceActionResponse {
                    success: false,
                    message: e.to_string(),
                    action_id: String::new(),
                }))
            }
            Err(e) => Err(domain_error_to_status(e)),
        }
    }

    #[instrument(
        name = "GetDeviceActionStatus",
        skip(self, request),
        fields(action_id = %request.get_ref().action_id)
    )]
    async fn get_device_action_status(
        &self,
        request: Request<GetDeviceActionStatusRequest>,
    ) -> Result<Response<GetDeviceActionStatusResponse>, Status> {
        let req = request.into_inner();

        let action = self
            .domain_service
            .get_action_status(&req.action_id)
            .await
            .map_err(domain_error_to_status)?;

        Ok(Response::new(GetDeviceActionStatusResponse {
            action_id: action.action_id.clone(),
            status: action_status_wire_value(&action),
            details: action.details,
        }))
    }
}
