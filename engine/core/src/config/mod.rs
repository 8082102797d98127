//! TOML Configuration File Support
//!
//! Centralized configuration loading for the engine, from a TOML file at
//! `~/.config/vision-bridge/engine.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/vision-bridge/engine.toml` (typically `~/.config/vision-bridge/engine.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [tap]
//! double_tap_delay_ms = 400
//! triple_tap_delay_ms = 400
//! policy = "deferred"
//!
//! [measurement]
//! retry_delay_ms = 100
//! max_attempts = 10
//!
//! [scroll]
//! edge_zone_px = 80
//! step_px = 60
//! interval_ms = 120
//!
//! [scrub]
//! swipe_threshold_px = 80
//! seek_step_ms = 5000
//! volume_step = 0.1
//!
//! [feedback]
//! speech_rate = 1.0
//!
//! [hit_test]
//! padding_px = 0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feedback::DEFAULT_SPEECH_RATE;
use crate::measurement::MeasurementConfig;
use crate::media::ScrubConfig;
use crate::scroll::ScrollFollowConfig;
use crate::tap::{TapConfig, TapPolicy};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Tap section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TapToml {
    /// Maximum gap between presses of one burst
    pub double_tap_delay_ms: Option<u64>,

    /// Trailing silence before a burst is classified
    pub triple_tap_delay_ms: Option<u64>,

    /// "deferred" or "immediate"
    pub policy: Option<TapPolicy>,
}

/// Measurement section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementToml {
    /// Delay between attempts on an unsettled layout
    pub retry_delay_ms: Option<u64>,

    /// Attempts before a region is given up on
    pub max_attempts: Option<u32>,
}

/// Scroll-follow section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollToml {
    /// Height of the top and bottom edge zones
    pub edge_zone_px: Option<f32>,

    /// Offset change per advance
    pub step_px: Option<f32>,

    /// Time between advances
    pub interval_ms: Option<u64>,
}

/// Media scrub section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubToml {
    /// Displacement before a swipe counts
    pub swipe_threshold_px: Option<f32>,

    /// Seek increment
    pub seek_step_ms: Option<u64>,

    /// Volume increment
    pub volume_step: Option<f32>,
}

/// Feedback section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackToml {
    /// Default speech rate
    pub speech_rate: Option<f32>,
}

/// Hit-test section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTestToml {
    /// Padding added around every region
    pub padding_px: Option<f32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Tap classification section
    pub tap: TapToml,

    /// Measurement retry section
    pub measurement: MeasurementToml,

    /// Scroll-follow section
    pub scroll: ScrollToml,

    /// Media scrub section
    pub scrub: ScrubToml,

    /// Feedback section
    pub feedback: FeedbackToml,

    /// Hit-test section
    pub hit_test: HitTestToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the engine
///
/// Consolidates all configuration from multiple sources and tracks where it
/// came from. Use [`load_config`] to load with proper priority handling.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Tap classification timing
    pub tap: TapConfig,

    /// Measurement retry bounds
    pub measurement: MeasurementConfig,

    /// Scroll-follow tuning
    pub scroll: ScrollFollowConfig,

    /// Media scrub tuning
    pub scrub: ScrubConfig,

    /// Default speech rate
    pub speech_rate: f32,

    /// Hit-box padding in every direction
    pub hit_padding: f32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tap: TapConfig::default(),
            measurement: MeasurementConfig::default(),
            scroll: ScrollFollowConfig::default(),
            scrub: ScrubConfig::default(),
            speech_rate: DEFAULT_SPEECH_RATE,
            hit_padding: 0.0,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tap configuration
    #[must_use]
    pub fn with_tap(mut self, tap: TapConfig) -> Self {
        self.tap = tap;
        self
    }

    /// Replace the measurement configuration
    #[must_use]
    pub fn with_measurement(mut self, measurement: MeasurementConfig) -> Self {
        self.measurement = measurement;
        self
    }

    /// Replace the scroll-follow configuration
    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollFollowConfig) -> Self {
        self.scroll = scroll;
        self
    }

    /// Replace the scrub configuration
    #[must_use]
    pub fn with_scrub(mut self, scrub: ScrubConfig) -> Self {
        self.scrub = scrub;
        self
    }

    /// Set the hit-box padding
    #[must_use]
    pub fn with_hit_padding(mut self, padding: f32) -> Self {
        self.hit_padding = padding;
        self
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject values the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delays = [
            ("tap.double_tap_delay_ms", self.tap.double_tap_delay),
            ("tap.triple_tap_delay_ms", self.tap.triple_tap_delay),
            ("measurement.retry_delay_ms", self.measurement.retry_delay),
            ("scroll.interval_ms", self.scroll.interval),
            ("scrub.seek_step_ms", self.scrub.seek_step),
        ];
        for (name, delay) in delays {
            if delay.is_zero() {
                return Err(ConfigError::ValidationError(format!("{name} must be positive")));
            }
        }
        if self.measurement.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "measurement.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.scrub.volume_step > 0.0 && self.scrub.volume_step <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "scrub.volume_step must be in (0, 1], got {}",
                self.scrub.volume_step
            )));
        }
        if self.speech_rate <= 0.0 {
            return Err(ConfigError::ValidationError(
                "feedback.speech_rate must be positive".to_string(),
            ));
        }
        if self.hit_padding < 0.0 {
            return Err(ConfigError::ValidationError(
                "hit_test.padding_px must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/vision-bridge/engine.toml` or
/// `~/.config/vision-bridge/engine.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vision-bridge").join("engine.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: EngineToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Environment overrides file values
    apply_env_config(&mut config);

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut EngineConfig, toml: &EngineToml) {
    // Tap
    if let Some(ms) = toml.tap.double_tap_delay_ms {
        config.tap.double_tap_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.tap.triple_tap_delay_ms {
        config.tap.triple_tap_delay = Duration::from_millis(ms);
    }
    if let Some(policy) = toml.tap.policy {
        config.tap.policy = policy;
    }

    // Measurement
    if let Some(ms) = toml.measurement.retry_delay_ms {
        config.measurement.retry_delay = Duration::from_millis(ms);
    }
    if let Some(attempts) = toml.measurement.max_attempts {
        config.measurement.max_attempts = attempts;
    }

    // Scroll-follow
    if let Some(zone) = toml.scroll.edge_zone_px {
        config.scroll.edge_zone = zone;
    }
    if let Some(step) = toml.scroll.step_px {
        config.scroll.step = step;
    }
    if let Some(ms) = toml.scroll.interval_ms {
        config.scroll.interval = Duration::from_millis(ms);
    }

    // Scrub
    if let Some(threshold) = toml.scrub.swipe_threshold_px {
        config.scrub.swipe_threshold = threshold;
    }
    if let Some(ms) = toml.scrub.seek_step_ms {
        config.scrub.seek_step = Duration::from_millis(ms);
    }
    if let Some(step) = toml.scrub.volume_step {
        config.scrub.volume_step = step;
    }

    // Feedback and hit-testing
    if let Some(rate) = toml.feedback.speech_rate {
        config.speech_rate = rate;
    }
    if let Some(padding) = toml.hit_test.padding_px {
        config.hit_padding = padding;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut EngineConfig) {
    if let Ok(delay) = std::env::var("VISION_BRIDGE_DOUBLE_TAP_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.tap.double_tap_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(delay) = std::env::var("VISION_BRIDGE_TRIPLE_TAP_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.tap.triple_tap_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(policy) = std::env::var("VISION_BRIDGE_TAP_POLICY") {
        match policy.to_lowercase().as_str() {
            "deferred" => {
                config.tap.policy = TapPolicy::Deferred;
                config.source = ConfigSource::Env;
            }
            "immediate" => {
                config.tap.policy = TapPolicy::Immediate;
                config.source = ConfigSource::Env;
            }
            other => tracing::warn!(value = other, "Ignoring unknown VISION_BRIDGE_TAP_POLICY"),
        }
    }
    if let Ok(delay) = std::env::var("VISION_BRIDGE_MEASURE_RETRY_MS") {
        if let Ok(ms) = delay.parse::<u64>() {
            config.measurement.retry_delay = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(attempts) = std::env::var("VISION_BRIDGE_MEASURE_ATTEMPTS") {
        if let Ok(n) = attempts.parse::<u32>() {
            config.measurement.max_attempts = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(rate) = std::env::var("VISION_BRIDGE_SPEECH_RATE") {
        if let Ok(r) = rate.parse::<f32>() {
            config.speech_rate = r;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(padding) = std::env::var("VISION_BRIDGE_HIT_PADDING") {
        if let Ok(p) = padding.parse::<f32>() {
            config.hit_padding = p;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.tap.double_tap_delay, Duration::from_millis(400));
        assert_eq!(config.tap.triple_tap_delay, Duration::from_millis(400));
        assert_eq!(config.tap.policy, TapPolicy::Deferred);
        assert_eq!(config.measurement.max_attempts, 10);
        assert_eq!(config.scrub.seek_step, Duration::from_secs(5));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("vision-bridge"));
            assert!(p.to_string_lossy().ends_with("engine.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_config(
            r#"
[tap]
double_tap_delay_ms = 450
triple_tap_delay_ms = 600
policy = "immediate"

[measurement]
retry_delay_ms = 250
max_attempts = 4

[scroll]
edge_zone_px = 100
step_px = 70
interval_ms = 200

[scrub]
swipe_threshold_px = 60
seek_step_ms = 10000
volume_step = 0.2
"#,
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.tap.double_tap_delay, Duration::from_millis(450));
        assert_eq!(config.tap.triple_tap_delay, Duration::from_millis(600));
        assert_eq!(config.tap.policy, TapPolicy::Immediate);
        assert_eq!(config.measurement.retry_delay, Duration::from_millis(250));
        assert_eq!(config.measurement.max_attempts, 4);
        assert!((config.scroll.edge_zone - 100.0).abs() < f32::EPSILON);
        assert_eq!(config.scroll.interval, Duration::from_millis(200));
        assert_eq!(config.scrub.seek_step, Duration::from_secs(10));
        assert!((config.scrub.volume_step - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_config(
            r"
[scrub]
seek_step_ms = 3000
",
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.scrub.seek_step, Duration::from_secs(3));
        // Untouched sections keep their defaults
        assert_eq!(config.scroll.interval, Duration::from_millis(120));
        assert!((config.scrub.swipe_threshold - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/vision-bridge/engine.toml");
        let config = load_config_from_path(Some(path)).unwrap();
        assert_eq!(config.config_file_path, None);
        assert_eq!(config.scroll.interval, Duration::from_millis(120));
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_config("[tap\ndouble_tap_delay_ms = ");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let file = write_config("[tap]\npolicy = \"eventually\"\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let file = write_config("[measurement]\nmax_attempts = 0\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let mut config = EngineConfig::default();
        config.scrub.volume_step = 1.5;
        assert!(config.validate().is_err());

        let config = EngineConfig::default()
            .with_tap(TapConfig::new().with_double_tap_delay(Duration::ZERO));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tap.double_tap_delay_ms"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[hit_test]\npadding_px = 5\n");

        std::env::set_var("VISION_BRIDGE_HIT_PADDING", "30");
        let config = load_config_from_path(Some(file.path().to_path_buf()));
        std::env::remove_var("VISION_BRIDGE_HIT_PADDING");

        let config = config.unwrap();
        assert!((config.hit_padding - 30.0).abs() < f32::EPSILON);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ValidationError("test error".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: test error");
    }
}
