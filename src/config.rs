use bevy::color::{Color, Srgba};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

const TRAIL_JSON: &str = include_str!("../assets/config/trail.json");

/// Environment variable naming a JSON file that replaces the embedded config
pub const CONFIG_ENV_VAR: &str = "CURSOR_TRAIL_CONFIG";

const DEFAULT_PALETTE: [&str; 5] = ["#9d4edd", "#00d4ff", "#39ff14", "#ff6b35", "#ff006e"];

/// Error types for loading trail configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidPalette(String),
    EmptyPalette,
    InvalidCapacity(usize),
    InvalidProbability(f64),
    InvalidTiming { fade_delay_ms: u64, lifetime_ms: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config JSON: {}", e),
            ConfigError::InvalidPalette(hex) => write!(f, "Palette entry {:?} is not a hex color", hex),
            ConfigError::EmptyPalette => write!(f, "Palette must contain at least one color"),
            ConfigError::InvalidCapacity(n) => write!(f, "Capacity must be at least 1 (got {})", n),
            ConfigError::InvalidProbability(p) => {
                write!(f, "Spawn probability must be within 0..=1 (got {})", p)
            }
            ConfigError::InvalidTiming {
                fade_delay_ms,
                lifetime_ms,
            } => write!(
                f,
                "Fade delay ({} ms) must be shorter than the lifetime ({} ms)",
                fade_delay_ms, lifetime_ms
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// On-disk shape; every field is optional so overrides can be partial
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TrailJson {
    capacity: usize,
    spawn_probability: f64,
    marker_size: f32,
    opacity: f32,
    fade_delay_ms: u64,
    lifetime_ms: u64,
    transition_ms: u64,
    drift_range: f32,
    layer: f32,
    palette: Vec<String>,
}

impl Default for TrailJson {
    fn default() -> Self {
        TrailJson {
            capacity: 30,
            spawn_probability: 0.15,
            marker_size: 8.0,
            opacity: 0.7,
            fade_delay_ms: 10,
            lifetime_ms: 1000,
            transition_ms: 1000,
            drift_range: 50.0,
            layer: 100.0,
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Tunables for the cursor trail
#[derive(Debug, Clone, PartialEq)]
pub struct TrailConfig {
    /// Maximum number of live markers
    pub capacity: usize,
    /// Chance that a single pointer move spawns a marker
    pub spawn_probability: f64,
    /// Marker edge length in logical pixels
    pub marker_size: f32,
    /// Opacity right after attaching
    pub opacity: f32,
    /// Delay between attaching and starting the fade
    pub fade_delay: Duration,
    /// Time from spawn until the marker is removed
    pub lifetime: Duration,
    /// Length of the fade/drift transition
    pub transition: Duration,
    /// Maximum drift on each axis while fading
    pub drift_range: f32,
    /// Draw depth; above everything else in the scene
    pub layer: f32,
    pub palette: Vec<Color>,
}

impl Default for TrailConfig {
    fn default() -> Self {
        TrailConfig {
            capacity: 30,
            spawn_probability: 0.15,
            marker_size: 8.0,
            opacity: 0.7,
            fade_delay: Duration::from_millis(10),
            lifetime: Duration::from_millis(1000),
            transition: Duration::from_millis(1000),
            drift_range: 50.0,
            layer: 100.0,
            palette: vec![
                Color::srgb_u8(0x9d, 0x4e, 0xdd),
                Color::srgb_u8(0x00, 0xd4, 0xff),
                Color::srgb_u8(0x39, 0xff, 0x14),
                Color::srgb_u8(0xff, 0x6b, 0x35),
                Color::srgb_u8(0xff, 0x00, 0x6e),
            ],
        }
    }
}

impl TrailConfig {
    /// Load the config file named by [`CONFIG_ENV_VAR`], or the embedded one
    pub fn load() -> Result<Self, ConfigError> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
                log::info!("Reading trail config from {}", path);
                let json = std::fs::read_to_string(&path)?;
                return Self::from_json(&json);
            }
        }

        Self::from_json(TRAIL_JSON)
    }

    /// Parse and validate JSON config data
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: TrailJson = serde_json::from_str(json)?;

        if raw.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(raw.capacity));
        }
        if !(0.0..=1.0).contains(&raw.spawn_probability) {
            return Err(ConfigError::InvalidProbability(raw.spawn_probability));
        }
        if raw.fade_delay_ms >= raw.lifetime_ms {
            return Err(ConfigError::InvalidTiming {
                fade_delay_ms: raw.fade_delay_ms,
                lifetime_ms: raw.lifetime_ms,
            });
        }
        if raw.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let palette = raw
            .palette
            .iter()
            .map(|hex| {
                Srgba::hex(hex)
                    .map(Color::Srgba)
                    .map_err(|_| ConfigError::InvalidPalette(hex.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if raw.opacity > 1.0 || raw.opacity < 0.0 {
            log::warn!("Opacity {} outside 0..=1, clamping", raw.opacity);
        }

        Ok(TrailConfig {
            capacity: raw.capacity,
            spawn_probability: raw.spawn_probability,
            marker_size: raw.marker_size,
            opacity: raw.opacity.clamp(0.0, 1.0),
            fade_delay: Duration::from_millis(raw.fade_delay_ms),
            lifetime: Duration::from_millis(raw.lifetime_ms),
            transition: Duration::from_millis(raw.transition_ms),
            drift_range: raw.drift_range.abs(),
            layer: raw.layer,
            palette,
        })
    }
}
