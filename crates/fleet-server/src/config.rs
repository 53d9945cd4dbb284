use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// gRPC server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// gRPC server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Simulated update work duration in seconds
    #[serde(default = "default_update_duration_secs")]
    pub update_duration_secs: u64,

    /// Capacity of the executor dispatch queue
    #[serde(default = "default_action_queue_capacity")]
    pub action_queue_capacity: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    50051
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_update_duration_secs() -> u64 {
    10
}

fn default_action_queue_capacity() -> usize {
    64
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("FLEET"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("FLEET_HOST");
        std::env::remove_var("FLEET_PORT");
        std::env::remove_var("FLEET_LOG_LEVEL");
        std::env::remove_var("FLEET_UPDATE_DURATION_SECS");
        std::env::remove_var("FLEET_ACTION_QUEUE_CAPACITY");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 50051);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.update_duration_secs, 10);
        assert_eq!(config.action_queue_capacity, 64);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("FLEET_PORT", "50099");
        std::env::set_var("FLEET_LOG_LEVEL", "debug");
        std::env::set_var("FLEET_UPDATE_DURATION_SECS", "1");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.port, 50099);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.update_duration_secs, 1);

        // Clean up
        std::env::remove_var("FLEET_PORT");
        std::env::remove_var("FLEET_LOG_LEVEL");
        std::env::remove_var("FLEET_UPDATE_DURATION_SECS");
    }
}
