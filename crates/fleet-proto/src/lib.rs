pub mod device {
    pub mod v1 {
        tonic::include_proto!("fleet.device.v1");

        pub const FILE_DESCRIPTOR_SET: &[u8] =
            tonic::include_file_descriptor_set!("fleet_device_descriptor");
    }
}

pub mod display;
