use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

// Configuration constants for the bot

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: portals.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "portals.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: portalbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "portalbot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("BOT_API_URL").ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
});

/// Setup wizard configuration
pub mod wizard {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// Number of input steps the user goes through
    pub const TOTAL_STEPS: u8 = 3;

    /// Command that skips the welcome message step
    pub const SKIP_COMMAND: &str = "/skip";

    /// Command that aborts the wizard at any step
    pub const CANCEL_COMMAND: &str = "/cancel";

    /// Idle time after which a session is swept (in seconds)
    /// Read from PORTAL_SESSION_TIMEOUT_SECS environment variable
    /// Default: 600 (10 minutes)
    pub static SESSION_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("PORTAL_SESSION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(600)
    });

    /// Interval between expiry sweeps (in seconds)
    /// Read from PORTAL_SWEEP_INTERVAL_SECS environment variable
    /// Default: 60
    pub static SWEEP_INTERVAL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("PORTAL_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(60)
    });

    /// Session timeout duration
    pub fn session_timeout() -> Duration {
        Duration::from_secs(*SESSION_TIMEOUT_SECS)
    }

    /// Sweep interval duration
    pub fn sweep_interval() -> Duration {
        Duration::from_secs(*SWEEP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of `get_me` attempts while the Bot API is starting up
    pub const MAX_STARTUP_RETRIES: u32 = 60;

    /// Delay between startup attempts (in seconds)
    pub const STARTUP_RETRY_DELAY_SECS: u64 = 5;

    /// Startup retry delay duration
    pub fn startup_delay() -> Duration {
        Duration::from_secs(STARTUP_RETRY_DELAY_SECS)
    }
}
