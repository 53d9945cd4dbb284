use anyhow::Result;
use clap::{Parser, Subcommand};

use fleet_proto::device::v1::device_management_client::DeviceManagementClient;
use fleet_proto::device::v1::{
    ActionStatus, ActionType, DeviceStatus, GetDeviceActionStatusRequest, GetDeviceInfoRequest,
    InitiateDeviceActionRequest, RegisterDeviceRequest,
};
use fleet_proto::display::{action_status_label, device_status_label};

#[derive(Parser)]
#[command(name = "fleet-cli", about = "Device Management CLI", version)]
struct Cli {
    /// Service endpoint
    #[arg(long, default_value = "http://localhost:50051", global = true)]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new device
    Register {
        /// Device ID
        #[arg(long)]
        id: String,
        /// Initial firmware version
        #[arg(long, default_value = "1.0.0")]
        version: String,
    },
    /// Get device info
    Info {
        /// Device ID
        #[arg(long)]
        id: String,
    },
    /// Trigger a software update
    Update {
        /// Device ID
        #[arg(long)]
        id: String,
        /// Target firmware version
        #[arg(long, default_value = "2.0.0")]
        to: String,
    },
    /// Check status of an action
    CheckAction {
        /// Action ID
        #[arg(long)]
        action_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut client = DeviceManagementClient::connect(cli.endpoint).await?;

    // Transport errors surface as a distinct channel from application-level
    // failure (success=false), matching the server's error taxonomy.
    let outcome = match cli.command {
        Command::Register { id, version } => register(&mut client, id, version).await,
        Command::Info { id } => info(&mut client, id).await,
        Command::Update { id, to } => update(&mut client, id, to).await,
        Command::CheckAction { action_id } => check_action(&mut client, action_id).await,
    };

    if let Err(status) = outcome {
        eprintln!("RPC Error: {:?} - {}", status.code(), status.message());
        std::process::exit(1);
    }

    Ok(())
}

type Client = DeviceManagementClient<tonic::transport::Channel>;

async fn register(client: &mut Client, id: String, version: String) -> Result<(), tonic::Status> {
    let response = client
        .register_device(RegisterDeviceRequest {
            device_id: id,
            initial_firmware_version: version,
        })
        .await?
        .into_inner();

    println!("Success: {}, Message: {}", response.success, response.message);
    Ok(())
}

async fn info(client: &mut Client, id: String) -> Result<(), tonic::Status> {
    let response = client
        .get_device_info(GetDeviceInfoRequest { device_id: id })
        .await?
        .into_inner();

    if let Some(device) = response.device {
        println!("Device: {}", device.id);
        println!("  Version: {}", device.firmware_version);
        // An out-of-range value means the server speaks a newer protocol;
        // surface it instead of masking it with an UNKNOWN label.
        match DeviceStatus::try_from(device.status) {
            Ok(status) => println!("  Status:  {}", device_status_label(status)),
            Err(_) => println!("  Status:  <unrecognized value {}>", device.status),
        }
    }
    Ok(())
}

async fn update(client: &mut Client, id: String, to: String) -> Result<(), tonic::Status> {
    println!("Triggering update for {}...", id);

    let response = client
        .initiate_device_action(InitiateDeviceActionRequest {
            device_id: id,
            action_type: ActionType::SoftwareUpdate as i32,
            parameters: to,
        })
        .await?
        .into_inner();

    if response.success {
        println!("Update Started! Action ID: {}", response.action_id);
        println!(
            "Check status with: fleet-cli check-action --action-id {}",
            response.action_id
        );
    } else {
        println!("Failed: {}", response.message);
    }
    Ok(())
}

async fn check_action(client: &mut Client, action_id: String) -> Result<(), tonic::Status> {
    let response = client
        .get_device_action_status(GetDeviceActionStatusRequest { action_id })
        .await?
        .into_inner();

    match ActionStatus::try_from(response.status) {
        Ok(status) => println!(
            "Action {}: {} ({})",
            response.action_id,
            action_status_label(status),
            response.details
        ),
        Err(_) => println!(
            "Action {}: <unrecognized status value {}>",
            response.action_id, response.status
        ),
    }
    Ok(())
}
