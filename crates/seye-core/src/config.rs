//! Configuration loading and typed config structures for the S-EYE feed.
//!
//! The canonical configuration lives in `seye-config.yaml` at the project
//! root. Every field has a default, so an empty (or absent) file yields
//! the stock simulation: 5 to 10 tracks over central India, one tick per
//! second, bouncing inside the `[8, 32] x [68, 88]` box.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `seye-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeyeConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Tick timing and track population parameters.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Spawn area and bounce box.
    #[serde(default)]
    pub region: RegionConfig,

    /// Subscriber fan-out settings.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Stateless analysis endpoint settings.
    #[serde(default)]
    pub intel: IntelConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SeyeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `PORT` overrides `server.port`
    /// - `SEYE_HOST` overrides `server.host`
    /// - `SEYE_SEED` overrides `simulation.seed`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without env overrides.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Values that fail to parse are ignored and the YAML value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = lookup("SEYE_HOST") {
            self.server.host = host;
        }
        if let Some(seed) = lookup("SEYE_SEED").and_then(|v| v.parse().ok()) {
            self.simulation.seed = Some(seed);
        }
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(invalid("simulation.tick_interval_ms must be at least 1"));
        }
        if sim.min_tracks == 0 || sim.min_tracks > sim.max_tracks {
            return Err(invalid(
                "simulation.min_tracks must be at least 1 and not exceed max_tracks",
            ));
        }
        if !(0.0..=1.0).contains(&sim.friendly_ratio) {
            return Err(invalid("simulation.friendly_ratio must be within [0, 1]"));
        }
        if !(sim.min_speed > 0.0 && sim.min_speed <= sim.max_speed && sim.max_speed.is_finite())
        {
            return Err(invalid(
                "simulation speeds must be finite, positive, and min_speed <= max_speed",
            ));
        }
        if !sim.course_jitter_deg.is_finite() || sim.course_jitter_deg < 0.0 {
            return Err(invalid("simulation.course_jitter_deg must be non-negative"));
        }
        self.region.spawn.check("region.spawn")?;
        self.region.bounds.check("region.bounds")?;
        if self.broadcast.subscriber_queue == 0 {
            return Err(invalid("broadcast.subscriber_queue must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Tick timing and track population parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationSettings {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Random seed. `None` seeds from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Fewest tracks created by one seeding.
    #[serde(default = "default_min_tracks")]
    pub min_tracks: usize,

    /// Most tracks created by one seeding.
    #[serde(default = "default_max_tracks")]
    pub max_tracks: usize,

    /// Probability that a seeded track is friendly.
    #[serde(default = "default_friendly_ratio")]
    pub friendly_ratio: f64,

    /// Slowest seeded speed, degrees per tick.
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,

    /// Fastest seeded speed, degrees per tick.
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,

    /// Full width of the random course correction, in degrees.
    #[serde(default = "default_course_jitter_deg")]
    pub course_jitter_deg: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
            min_tracks: default_min_tracks(),
            max_tracks: default_max_tracks(),
            friendly_ratio: default_friendly_ratio(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            course_jitter_deg: default_course_jitter_deg(),
        }
    }
}

/// Axis-aligned latitude/longitude box, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl GeoBox {
    /// Create a box from its edges.
    pub const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Whether `lat` lies within `[min_lat, max_lat]`.
    pub fn contains_lat(&self, lat: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat)
    }

    /// Whether `lng` lies within `[min_lng, max_lng]`.
    pub fn contains_lng(&self, lng: f64) -> bool {
        (self.min_lng..=self.max_lng).contains(&lng)
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        let lat_ok = (-90.0..=90.0).contains(&self.min_lat)
            && (-90.0..=90.0).contains(&self.max_lat)
            && self.min_lat < self.max_lat;
        let lng_ok = (-180.0..=180.0).contains(&self.min_lng)
            && (-180.0..=180.0).contains(&self.max_lng)
            && self.min_lng < self.max_lng;
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                reason: format!(
                    "{name} must lie within lat [-90, 90], lng [-180, 180] with min < max"
                ),
            })
        }
    }
}

/// Spawn area and bounce box.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionConfig {
    /// Area in which seeded tracks appear.
    #[serde(default = "default_spawn_box")]
    pub spawn: GeoBox,

    /// Tracks leaving this box have their heading reflected.
    #[serde(default = "default_bounds_box")]
    pub bounds: GeoBox,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            spawn: default_spawn_box(),
            bounds: default_bounds_box(),
        }
    }
}

/// Subscriber fan-out settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    /// Frames buffered per subscriber before deliveries to it start failing.
    #[serde(default = "default_subscriber_queue")]
    pub subscriber_queue: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            subscriber_queue: default_subscriber_queue(),
        }
    }
}

/// Stateless analysis endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntelConfig {
    /// Artificial processing delay of `GET /api/analyze`.
    #[serde(default = "default_analyze_delay_ms")]
    pub analyze_delay_ms: u64,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            analyze_delay_ms: default_analyze_delay_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_min_tracks() -> usize {
    5
}

const fn default_max_tracks() -> usize {
    10
}

const fn default_friendly_ratio() -> f64 {
    0.7
}

const fn default_min_speed() -> f64 {
    0.05
}

const fn default_max_speed() -> f64 {
    0.10
}

const fn default_course_jitter_deg() -> f64 {
    10.0
}

const fn default_spawn_box() -> GeoBox {
    GeoBox::new(15.0, 25.0, 75.0, 85.0)
}

const fn default_bounds_box() -> GeoBox {
    GeoBox::new(8.0, 32.0, 68.0, 88.0)
}

const fn default_subscriber_queue() -> usize {
    16
}

const fn default_analyze_delay_ms() -> u64 {
    1500
}

fn default_log_level() -> String {
    "info".to_owned()
}
