use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub devices_path: String,
    pub frontend_dir: String,
    pub routeros_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            devices_path: get_env("DEVICES_PATH", "/data/devices.json"),
            frontend_dir: get_env("FRONTEND_DIR", "/app/frontend"),
            routeros_timeout_secs: get_env("ROUTEROS_TIMEOUT_SECS", "15")
                .parse()
                .unwrap_or(15),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
