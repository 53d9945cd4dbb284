pub mod conversions;
pub mod error;
pub mod handler;
pub mod server;

pub use error::domain_error_to_status;
pub use handler::DeviceManagementHandler;
pub use server::{run_grpc_server, GrpcServerConfig};
