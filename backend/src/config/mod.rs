//! Dashboard configuration.
//!
//! Settings are read from a TOML file and can be overridden from the
//! environment. Every field has a default, so an empty file (or no file at
//! all) yields a working configuration.
//!
//! ```toml
//! [upstream]
//! endpoint = "https://counter.example/grouped"
//! refresh_interval_secs = 30
//!
//! [devices]
//! inside = "Kamerotski"
//! outside = "Henk"
//! excluded = ["Buttin", "Buttout"]
//! net_movement = "difference"
//!
//! [display]
//! timezone = "Europe/Brussels"
//! bucket_minutes = 5
//! ```

pub mod festival;

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub use festival::{FestivalCalendar, FestivalEdition, FestivalHours, HoursPair};

use crate::error::ConfigError;
use crate::services::aggregator::{CounterRoles, NetMovementMode};

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub devices: DeviceSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub festival: FestivalCalendar,
}

/// Where and how often to poll the counting API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Device roles and exclusions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Counter whose deltas count people going in.
    #[serde(default = "default_inside_device")]
    pub inside: String,
    /// Counter whose deltas count people going out.
    #[serde(default = "default_outside_device")]
    pub outside: String,
    /// Devices dropped at ingestion.
    #[serde(default = "default_excluded_devices")]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub net_movement: NetMovementMode,
    /// Only events strictly after this instant feed the directional totals.
    #[serde(default)]
    pub counting_since: Option<DateTime<FixedOffset>>,
}

/// Derived-series sizes and presentation timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: u32,
    #[serde(default = "default_timeline_points")]
    pub timeline_points: usize,
    #[serde(default = "default_table_rows")]
    pub table_rows: usize,
    #[serde(default = "default_delta_points")]
    pub delta_points: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_notification_ttl_secs")]
    pub notification_ttl_secs: u64,
}

/// HTTP bind address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_endpoint() -> String {
    "https://aff.reytech.be/grouped".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_inside_device() -> String {
    "Kamerotski".to_string()
}

fn default_outside_device() -> String {
    "Henk".to_string()
}

fn default_excluded_devices() -> Vec<String> {
    vec!["Buttin".to_string(), "Buttout".to_string()]
}

fn default_timezone() -> String {
    "Europe/Brussels".to_string()
}

fn default_bucket_minutes() -> u32 {
    5
}

fn default_timeline_points() -> usize {
    288
}

fn default_table_rows() -> usize {
    50
}

fn default_delta_points() -> usize {
    20
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_notification_ttl_secs() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            inside: default_inside_device(),
            outside: default_outside_device(),
            excluded: default_excluded_devices(),
            net_movement: NetMovementMode::default(),
            counting_since: None,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            bucket_minutes: default_bucket_minutes(),
            timeline_points: default_timeline_points(),
            table_rows: default_table_rows(),
            delta_points: default_delta_points(),
            debounce_ms: default_debounce_ms(),
            notification_ttl_secs: default_notification_ttl_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DashboardConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `counter.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("counter.toml"),
            PathBuf::from("backend/counter.toml"),
            PathBuf::from("../counter.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Resolve configuration the way the server does: `COUNTER_CONFIG` if set,
    /// otherwise the default location, otherwise built-in defaults; then
    /// environment overrides and validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("COUNTER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::from_default_location() {
                Ok(config) => config,
                Err(ConfigError::NotFound) => {
                    log::info!("No counter.toml found, using built-in defaults");
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// # Environment Variables
    /// - `COUNTER_ENDPOINT`: upstream API URL
    /// - `COUNTER_TIMEZONE`: IANA timezone for local dates and hours
    /// - `COUNTER_REFRESH_SECS`: auto-refresh interval in seconds
    /// - `HOST`: server host
    /// - `PORT`: server port
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(endpoint) = env::var("COUNTER_ENDPOINT") {
            self.upstream.endpoint = endpoint;
        }
        if let Ok(timezone) = env::var("COUNTER_TIMEZONE") {
            self.display.timezone = timezone;
        }
        if let Ok(secs) = env::var("COUNTER_REFRESH_SECS") {
            self.upstream.refresh_interval_secs = secs.parse().map_err(|_| {
                ConfigError::invalid(
                    "upstream.refresh_interval_secs",
                    format!("COUNTER_REFRESH_SECS must be a number, got '{}'", secs),
                )
            })?;
        }
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::invalid("server.port", format!("PORT must be a valid port number, got '{}'", port))
            })?;
        }
        Ok(())
    }

    /// Reject values the dashboard cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;
        if self.display.bucket_minutes == 0 || self.display.bucket_minutes > 24 * 60 {
            return Err(ConfigError::invalid(
                "display.bucket_minutes",
                "must be between 1 and 1440",
            ));
        }
        if self.upstream.refresh_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "upstream.refresh_interval_secs",
                "must be at least 1",
            ));
        }
        if self.devices.inside == self.devices.outside {
            return Err(ConfigError::invalid(
                "devices.outside",
                "inside and outside counters must differ",
            ));
        }
        for edition in self.festival.editions() {
            if edition.saturday < edition.friday {
                return Err(ConfigError::invalid(
                    "festival.editions",
                    format!("edition {} ends before it starts", edition.year),
                ));
            }
        }
        Ok(())
    }

    /// The configured timezone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.display
            .timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::invalid("display.timezone", e.to_string()))
    }

    pub fn excluded_devices(&self) -> HashSet<String> {
        self.devices.excluded.iter().cloned().collect()
    }

    pub fn counter_roles(&self) -> CounterRoles {
        CounterRoles {
            inside: self.devices.inside.clone(),
            outside: self.devices.outside.clone(),
            net_movement: self.devices.net_movement,
            counting_since: self.devices.counting_since,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.upstream.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_secs)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.display.debounce_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.display.notification_ttl_secs)
    }
}
