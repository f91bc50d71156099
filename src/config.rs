use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::Quota;

#[derive(Clone)]
pub struct Config {
    // Admin auth
    pub admin_password_hash: String,

    // CORS
    pub allowed_origin: String,

    // Content storage
    pub data_dir: String,

    // Status probe target
    pub status_host: String,
    pub status_port: u16,
    pub status_timeout_secs: u64,
    pub status_interval_secs: u64,

    // Rate limiting for /auth
    pub auth_period_secs: u64,
    pub auth_burst_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_password_hash: String::new(),
            allowed_origin: "*".to_string(),
            data_dir: "data".to_string(),
            status_host: "127.0.0.1".to_string(),
            status_port: 25565,
            status_timeout_secs: 5,
            status_interval_secs: 10,
            auth_period_secs: 60,
            auth_burst_limit: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            // Stored digests are lowercase hex; normalize whatever is set.
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH")
                .unwrap_or_default()
                .to_lowercase(),

            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),

            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),

            status_host: env::var("STATUS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            status_port: env::var("STATUS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25565),

            status_timeout_secs: env::var("STATUS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            status_interval_secs: env::var("STATUS_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            auth_period_secs: env::var("AUTH_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),

            auth_burst_limit: env::var("AUTH_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    pub fn auth_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.auth_period_secs.max(1)))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.auth_burst_limit.max(1)).unwrap())
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }
}
