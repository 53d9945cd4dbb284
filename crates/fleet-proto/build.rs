use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if env::var_os("PROTOC").is_none() {
        env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    let descriptor_path =
        PathBuf::from(env::var("OUT_DIR")?).join("fleet_device_descriptor.bin");

    tonic_build::configure()
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(
            &["proto/fleet/device/v1/device_management.proto"],
            &["proto"],
        )?;

    Ok(())
}
