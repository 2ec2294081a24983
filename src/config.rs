use std::time::Duration;

/// Program configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory for persistent browser profiles
    pub profiles_dir: String,
    /// Run browsers headless
    pub headless: bool,
    /// How long to wait for a freshly launched browser to respond
    pub session_start_timeout: Duration,
    /// Default budget for a required condition-wait
    pub step_timeout: Duration,
    /// Polling interval for condition-waits
    pub poll_interval: Duration,
    /// Budget for the interactive login round-trip
    pub auth_timeout: Duration,
    /// Budget for the final publish wait
    pub publish_timeout: Duration,
    /// Optional TOML file overriding the built-in destination list
    pub destinations_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profiles_dir: "browser_profiles".to_string(),
            headless: false,
            session_start_timeout: Duration::from_secs(20),
            step_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
            auth_timeout: Duration::from_secs(600),
            publish_timeout: Duration::from_secs(60),
            destinations_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            profiles_dir: std::env::var("MP_PROFILES_DIR").unwrap_or(default.profiles_dir),
            headless: std::env::var("MP_HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            session_start_timeout: secs_var("MP_SESSION_START_TIMEOUT").unwrap_or(default.session_start_timeout),
            step_timeout: secs_var("MP_STEP_TIMEOUT").unwrap_or(default.step_timeout),
            poll_interval: millis_var("MP_POLL_INTERVAL_MS").unwrap_or(default.poll_interval),
            auth_timeout: secs_var("MP_AUTH_TIMEOUT").unwrap_or(default.auth_timeout),
            publish_timeout: secs_var("MP_PUBLISH_TIMEOUT").unwrap_or(default.publish_timeout),
            destinations_file: std::env::var("MP_DESTINATIONS_FILE").ok(),
        }
    }
}

fn secs_var(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_secs)
}

fn millis_var(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_millis)
}
