//! Crate-wide constants and defaults.

/// Default values used when configuration omits a field
pub mod defaults {
    /// Upper bound on events per workflow before appends are rejected
    pub const MAX_EVENTS_PER_WORKFLOW: u64 = 10_000;

    /// Broadcast channel capacity for the event publisher
    pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

    /// Interval between dashboard WebSocket keepalive frames
    pub const DASHBOARD_PUSH_INTERVAL_MS: u64 = 2_000;

    /// Bind address for the web API
    pub const BIND_ADDRESS: &str = "0.0.0.0:8003";

    /// Request timeout for REST handlers
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

    /// Database pool size for the postgres-backed store
    pub const DATABASE_POOL_SIZE: u32 = 10;

    /// Database connect timeout
    pub const DATABASE_CONNECT_TIMEOUT_SECONDS: u64 = 10;
}

/// Environment variable consulted for environment detection
pub const ENV_VAR: &str = "FLOWSTATE_ENV";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_VAR: &str = "FLOWSTATE_CONFIG_DIR";

/// Environment variable overriding the database url
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
